use std::{convert::Infallible, str::FromStr};

use tracing::debug;

use crate::{Grants, Mode, Permission};

/// The HTTP method of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// Any other method
    Other(String),
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PUT" => Method::Put,
            "POST" => Method::Post,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            _ => Method::Other(s.to_owned()),
        })
    }
}

/// What the request target currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetState {
    /// Nothing exists at the target yet
    #[default]
    Missing,
    /// The target is an RDF source that can contain other resources
    Container,
    /// The target is binary content
    Binary,
}

/// The facts about one HTTP request that decide which permission it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    method: Method,
    target: String,
    acl_target: bool,
    state: TargetState,
    transaction_endpoint: bool,
    append_only_update: bool,
    descendants: Vec<String>,
}

impl AccessRequest {
    /// A request with `method` on the resource URI `target`.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            acl_target: false,
            state: TargetState::Missing,
            transaction_endpoint: false,
            append_only_update: false,
            descendants: Vec::new(),
        }
    }

    /// Mark the target as an ACL resource.
    pub fn on_acl(mut self) -> Self {
        self.acl_target = true;
        self
    }

    /// Record what currently exists at the target.
    pub fn with_state(mut self, state: TargetState) -> Self {
        self.state = state;
        self
    }

    /// Mark the request as addressed to the transaction endpoint.
    pub fn on_transaction_endpoint(mut self) -> Self {
        self.transaction_endpoint = true;
        self
    }

    /// Mark a `PATCH` body as a SPARQL update that deletes nothing.
    pub fn append_only_update(mut self) -> Self {
        self.append_only_update = true;
        self
    }

    /// Record the URIs of every resource below the target. A `DELETE`
    /// removes them too, so it needs `Write` on each.
    pub fn with_descendants<Descendants, Uri>(mut self, descendants: Descendants) -> Self
    where
        Descendants: IntoIterator<Item = Uri>,
        Uri: Into<String>,
    {
        self.descendants.extend(descendants.into_iter().map(Into::into));
        self
    }

    /// The HTTP method of the request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The resource URI the request addresses.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// True when the request removes the target together with everything
    /// below it.
    pub fn deletes_subtree(&self) -> bool {
        self.method == Method::Delete && !self.acl_target
    }

    /// The target followed by any recorded descendants: every resource the
    /// caller's grants must be evaluated on.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.target.as_str()).chain(self.descendants.iter().map(String::as_str))
    }
}

/// Decides whether a caller's [Grants] admit an HTTP request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestGate;

impl RequestGate {
    /// True when `grants` admit `request`.
    pub fn is_authorized(&self, grants: &Grants, request: &AccessRequest) -> bool {
        let holds = |mode: Mode| grants.is_permitted(&Permission::of(mode, request.target()));

        let authorized = match request.method {
            Method::Get | Method::Head | Method::Options => {
                holds(if request.acl_target { Mode::Control } else { Mode::Read })
            }
            Method::Put => {
                if request.acl_target {
                    holds(Mode::Control)
                } else if holds(Mode::Write) {
                    true
                } else {
                    request.state == TargetState::Missing && holds(Mode::Append)
                }
            }
            Method::Post => {
                if request.transaction_endpoint && grants.is_authenticated() {
                    true
                } else if holds(Mode::Write) {
                    true
                } else {
                    match request.state {
                        TargetState::Container => holds(Mode::Append),
                        TargetState::Binary | TargetState::Missing => false,
                    }
                }
            }
            Method::Patch => {
                if request.acl_target {
                    holds(Mode::Control)
                } else {
                    holds(Mode::Write) || (request.append_only_update && holds(Mode::Append))
                }
            }
            Method::Delete if request.acl_target => holds(Mode::Control),
            Method::Delete => {
                holds(Mode::Write)
                    && request.descendants.iter().all(|descendant| {
                        grants.is_permitted(&Permission::of(Mode::Write, descendant.as_str()))
                    })
            }
            Method::Other(_) => false,
        };

        debug!(
            method = ?request.method,
            target = request.target(),
            authorized,
            "Gated request"
        );

        authorized
    }
}
