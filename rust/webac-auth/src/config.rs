//! Configuration consumed by the authorization core.
//!
//! Configuration is plain data that may be read from JSON:
//!
//! ```json
//! {
//!   "userBaseUri": "http://example.org/users/",
//!   "groupBaseUri": "http://example.org/groups/",
//!   "baseUri": "http://localhost:8080/rest",
//!   "cache": { "capacity": 1024, "ttlSeconds": 300 }
//! }
//! ```
//!
//! When `defaultAuthorizations` is omitted, the root authorization lets every
//! caller read every resource.

use std::{collections::BTreeSet, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use webac_graph::ResourceId;

use crate::{Authorization, FOAF_AGENT, Mode, WebacAuthError};

const DEFAULT_CACHE_CAPACITY: usize = 512;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;

/// URI prefixes under which user and group agents live. Agents named by a URI
/// under one of these prefixes are also known by the remainder of the URI,
/// which is what upstream authentication reports as the principal name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBaseUris {
    /// Prefix of user agent URIs
    pub user: Option<String>,
    /// Prefix of group agent URIs
    pub group: Option<String>,
}

impl AgentBaseUris {
    /// The short name of `uri` with the user prefix (tried first) or the group
    /// prefix removed, if either applies.
    pub fn strip<'a>(&self, uri: &'a str) -> Option<&'a str> {
        [self.user.as_deref(), self.group.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|base| uri.strip_prefix(base))
    }
}

/// Sizing of the effective ACL cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of cached effective ACLs
    pub capacity: usize,
    /// Lifetime of a cached effective ACL; `None` keeps entries until evicted
    pub ttl_seconds: Option<u64>,
}

impl CacheConfig {
    /// The configured lifetime as a [Duration].
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_seconds: Some(DEFAULT_CACHE_TTL_SECONDS),
        }
    }
}

/// Everything the authorization core reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebacConfig {
    /// Prefix of user agent URIs
    pub user_base_uri: Option<String>,
    /// Prefix of group agent URIs
    pub group_base_uri: Option<String>,
    /// The HTTP URI at which the repository root is served
    pub base_uri: Option<String>,
    /// Authorizations that apply when no ACL exists anywhere in a resource's
    /// ancestry
    pub default_authorizations: Vec<Authorization>,
    /// Effective ACL cache sizing
    pub cache: CacheConfig,
}

impl Default for WebacConfig {
    fn default() -> Self {
        Self {
            user_base_uri: None,
            group_base_uri: None,
            base_uri: None,
            default_authorizations: vec![root_authorization()],
            cache: CacheConfig::default(),
        }
    }
}

impl WebacConfig {
    /// Read configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, WebacAuthError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WebacAuthError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The agent base URIs as one value.
    pub fn agent_base_uris(&self) -> AgentBaseUris {
        AgentBaseUris {
            user: self.user_base_uri.clone(),
            group: self.group_base_uri.clone(),
        }
    }
}

/// The built-in fallback policy: every agent may read the root and, through
/// inheritance, everything below it.
pub fn root_authorization() -> Authorization {
    let root = ResourceId::root().to_string();
    Authorization {
        agent_classes: BTreeSet::from([FOAF_AGENT.to_owned()]),
        modes: BTreeSet::from([Mode::Read.uri().to_owned()]),
        access_to: BTreeSet::from([root.clone()]),
        defaults: BTreeSet::from([root]),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;

    use super::{AgentBaseUris, WebacConfig, root_authorization};
    use crate::WebacAuthError;

    #[test]
    fn it_falls_back_to_the_root_authorization() -> Result<()> {
        let config = WebacConfig::from_json(r#"{ "baseUri": "http://localhost/rest" }"#)?;

        assert_eq!(config.default_authorizations, vec![root_authorization()]);
        assert_eq!(config.cache.capacity, 512);
        assert_eq!(config.base_uri.as_deref(), Some("http://localhost/rest"));

        Ok(())
    }

    #[test]
    fn it_loads_configuration_from_a_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "userBaseUri": "http://example.org/users/",
                "defaultAuthorizations": [],
                "cache": {{ "capacity": 8, "ttlSeconds": null }}
            }}"#
        )?;

        let config = WebacConfig::from_path(file.path())?;

        assert!(config.default_authorizations.is_empty());
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.cache.ttl(), None);
        assert_eq!(
            config.agent_base_uris().strip("http://example.org/users/alice"),
            Some("alice")
        );

        Ok(())
    }

    #[test]
    fn it_prefers_the_user_base_uri_when_stripping() {
        let uris = AgentBaseUris {
            user: Some("http://example.org/".into()),
            group: Some("http://example.org/groups/".into()),
        };

        assert_eq!(uris.strip("http://example.org/groups/staff"), Some("groups/staff"));
        assert_eq!(uris.strip("http://elsewhere.org/bob"), None);
    }

    #[test]
    fn it_reports_an_unreadable_file_as_configuration_error() -> Result<()> {
        let directory = tempfile::tempdir()?;

        let error = WebacConfig::from_path(directory.path().join("missing.json"));

        assert!(matches!(error, Err(WebacAuthError::Config(_))));

        Ok(())
    }

    #[test]
    fn it_reports_malformed_configuration() {
        assert!(WebacConfig::from_json("{ \"cache\": 3 }").is_err());
    }
}
