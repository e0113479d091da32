#![warn(missing_docs)]

//! This crate decides who may do what to the resources of a hierarchical,
//! RDF-described repository, following the W3C Web Access Control model.
//!
//! Access rules ([Authorization]s) live in ACL resources attached to the
//! resources they protect. The [EffectiveAclResolver] finds the ACL governing
//! a resource by walking up its containment hierarchy, and the
//! [RoleComputer] turns that ACL into a [RoleMap] of principal names to
//! access modes. A [PermissionRealm] evaluates a caller against the targets
//! of a request, and a [RequestGate] decides whether the resulting [Grants]
//! admit an HTTP request.
//!
//! ```rust
//! use std::sync::Arc;
//! use webac_auth::{Mode, Permission, PermissionRealm, Principals, RoleComputer, WebacConfig};
//! use webac_graph::{MemoryResourceGraph, Resource, ResourceId, ResourceKind};
//!
//! # fn main() -> Result<(), webac_auth::WebacAuthError> {
//! let graph = MemoryResourceGraph::default();
//! graph.insert(Resource::new(ResourceId::root(), ResourceKind::Container));
//!
//! // Without any ACL, everyone may read everything
//! let config = WebacConfig::default();
//! let roles = Arc::new(RoleComputer::from_config(graph, &config)?);
//! let realm = PermissionRealm::new(roles, Some("http://localhost/rest".into()));
//!
//! let read = Permission::of(Mode::Read, "http://localhost/rest/a");
//! assert!(realm.is_permitted(None, &Principals::anonymous(), &read)?);
//!
//! let write = Permission::of(Mode::Write, "http://localhost/rest/a");
//! assert!(!realm.is_permitted(None, &Principals::user("alice"), &write)?);
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod vocabulary;
pub use vocabulary::*;

mod config;
pub use config::*;

mod authorization;
pub use authorization::*;

mod triple_index;
pub use triple_index::*;

mod parser;
pub use parser::*;

mod resolver;
pub use resolver::*;

mod cache;
pub use cache::*;

mod group;
pub use group::*;

mod roles;
pub use roles::*;

mod permission;
pub use permission::*;

mod realm;
pub use realm::*;

mod request;
pub use request::*;

pub mod legacy;
