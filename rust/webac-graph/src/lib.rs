#![warn(missing_docs)]

//! This crate describes the part of the repository that WebAC authorization
//! reads from: hierarchical [`ResourceId`]s, [`Resource`]s with their RDF
//! [`Triple`]s, and the [`ResourceGraph`] trait that fetches them.
//!
//! ```rust
//! use webac_graph::{Node, Resource, ResourceId, ResourceKind, Triple, RDF_TYPE};
//!
//! let id = ResourceId::from_path("/collection/item");
//! let resource = Resource::new(id.clone(), ResourceKind::Container)
//!     .contained_by(ResourceId::from_path("/collection"))
//!     .with_triples([Triple::new(
//!         Node::uri(id.as_str()),
//!         RDF_TYPE,
//!         Node::uri("http://example.org/Thing"),
//!     )]);
//!
//! assert_eq!(resource.container(), id.parent().as_ref());
//! assert_eq!(id.as_str(), "info:fedora/collection/item");
//! ```

mod error;
pub use error::*;

mod id;
pub use id::*;

mod triple;
pub use triple::*;

mod resource;
pub use resource::*;

mod graph;
pub use graph::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
