//! URIs of the WebAC, FOAF and vCard terms this crate interprets.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::WebacAuthError;

/// Namespace of the W3C Web Access Control vocabulary.
pub const WEBAC_NAMESPACE: &str = "http://www.w3.org/ns/auth/acl#";

/// `acl:Authorization`, the class of every access rule.
pub const WEBAC_AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
/// `acl:agent`
pub const WEBAC_AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
/// `acl:agentClass`
pub const WEBAC_AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
/// `acl:agentGroup`
pub const WEBAC_AGENT_GROUP: &str = "http://www.w3.org/ns/auth/acl#agentGroup";
/// `acl:mode`
pub const WEBAC_MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
/// `acl:accessTo`
pub const WEBAC_ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
/// `acl:accessToClass`
pub const WEBAC_ACCESS_TO_CLASS: &str = "http://www.w3.org/ns/auth/acl#accessToClass";
/// `acl:default`
pub const WEBAC_DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";

/// `acl:AuthenticatedAgent`, the class of every authenticated caller.
pub const WEBAC_AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";
/// `foaf:Agent`, the class of every caller.
pub const FOAF_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";

/// `vcard:Group`
pub const VCARD_GROUP: &str = "http://www.w3.org/2006/vcard/ns#Group";
/// `vcard:hasMember`
pub const VCARD_MEMBER: &str = "http://www.w3.org/2006/vcard/ns#hasMember";

/// True for the two agent classes that role maps carry as principals.
pub fn is_special_agent_class(value: &str) -> bool {
    value == FOAF_AGENT || value == WEBAC_AUTHENTICATED_AGENT
}

/// An access mode that an Authorization may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Mode {
    /// `acl:Read`
    Read,
    /// `acl:Write`
    Write,
    /// `acl:Append`
    Append,
    /// `acl:Control`
    Control,
}

impl Mode {
    /// The URI naming this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Mode::Read => "http://www.w3.org/ns/auth/acl#Read",
            Mode::Write => "http://www.w3.org/ns/auth/acl#Write",
            Mode::Append => "http://www.w3.org/ns/auth/acl#Append",
            Mode::Control => "http://www.w3.org/ns/auth/acl#Control",
        }
    }
}

impl FromStr for Mode {
    type Err = WebacAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Mode::Read, Mode::Write, Mode::Append, Mode::Control]
            .into_iter()
            .find(|mode| mode.uri() == s)
            .ok_or_else(|| WebacAuthError::Config(format!("Unknown access mode \"{s}\"")))
    }
}

impl TryFrom<String> for Mode {
    type Error = WebacAuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(value: Mode) -> Self {
        value.uri().to_owned()
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}
