use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Mode;

/// The right to exercise one access mode on one resource URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    mode: String,
    resource: String,
}

impl Permission {
    /// Create a permission from a mode URI and a resource URI.
    pub fn new(mode: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            resource: resource.into(),
        }
    }

    /// Shorthand for a permission in one of the known [Mode]s.
    pub fn of(mode: Mode, resource: impl Into<String>) -> Self {
        Self::new(mode.uri(), resource)
    }

    /// The mode URI.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The resource URI.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// True when holding this permission grants `other`. Neither modes nor
    /// resources imply one another, so this is plain equality.
    pub fn implies(&self, other: &Permission) -> bool {
        self == other
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.mode, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::Permission;
    use crate::Mode;

    #[test]
    fn it_implies_only_an_identical_permission() {
        let read = Permission::of(Mode::Read, "http://localhost/rest/a");

        assert!(read.implies(&Permission::of(Mode::Read, "http://localhost/rest/a")));
        assert!(!read.implies(&Permission::of(Mode::Read, "http://localhost/rest/a/b")));
        assert!(!read.implies(&Permission::of(Mode::Write, "http://localhost/rest/a")));
        assert!(!Permission::of(Mode::Write, "http://localhost/rest/a").implies(&read));
    }
}
