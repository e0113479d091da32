//! Hierarchical resource identifiers.
//!
//! A [`ResourceId`] is an internal URI of the form `info:fedora` (the root) or
//! `info:fedora/<segment>/<segment>...`. Containment follows the path: the
//! parent of `info:fedora/a/b` is `info:fedora/a`.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::WebacGraphError;

/// The URI prefix shared by every resource held in the repository.
pub const INTERNAL_PREFIX: &str = "info:fedora";

/// An immutable, hierarchical identifier of a repository resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// The identifier of the repository root.
    pub fn root() -> Self {
        Self(INTERNAL_PREFIX.to_owned())
    }

    /// Build an identifier from a repository path such as `/a/b`. Empty
    /// segments are ignored, so `/`, `` and `//` all name the root.
    pub fn from_path(path: &str) -> Self {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(Self::root(), |id, segment| id.child(segment))
    }

    /// Parse either the internal form (`info:fedora/a/b`) or a repository
    /// path (`/a/b`).
    pub fn parse(value: &str) -> Result<Self, WebacGraphError> {
        if value.contains('#') {
            return Err(WebacGraphError::InvalidIdentifier(format!(
                "Resource identifiers may not carry a fragment, but got \"{value}\""
            )));
        }

        if let Some(rest) = value.strip_prefix(INTERNAL_PREFIX) {
            if rest.is_empty() || rest.starts_with('/') {
                return Ok(Self::from_path(rest));
            }
        } else if value.starts_with('/') {
            return Ok(Self::from_path(value));
        }

        Err(WebacGraphError::InvalidIdentifier(format!(
            "Expected \"{INTERNAL_PREFIX}/...\" or \"/...\", but got \"{value}\""
        )))
    }

    /// The canonical internal URI of this identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The repository path of this identifier; `/` for the root.
    pub fn path(&self) -> &str {
        match &self.0[INTERNAL_PREFIX.len()..] {
            "" => "/",
            path => path,
        }
    }

    /// True for the repository root.
    pub fn is_root(&self) -> bool {
        self.0.len() == INTERNAL_PREFIX.len()
    }

    /// The identifier of a direct child named `segment`.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment.trim_matches('/')))
    }

    /// The identifier one level up, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.0
            .rfind('/')
            .map(|index| Self(self.0[..index].to_owned()))
    }

    /// Every ancestor of this identifier, nearest first and ending with the
    /// root. The root itself has no ancestors.
    pub fn ancestors(&self) -> impl Iterator<Item = ResourceId> {
        std::iter::successors(self.parent(), ResourceId::parent)
    }

    /// True when `other` is strictly below this identifier.
    pub fn is_ancestor_of(&self, other: &ResourceId) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }
}

impl FromStr for ResourceId {
    type Err = WebacGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = WebacGraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ResourceId::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a caller's in-flight transaction. Reads made on behalf of a
/// transaction observe its uncommitted writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    id: String,
}

impl Transaction {
    /// Wrap the identifier issued by the transaction manager.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The transaction identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}
