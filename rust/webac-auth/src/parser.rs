use webac_graph::{Resource, Triple};

use crate::{
    AgentBaseUris, Authorization, TripleIndex, WEBAC_ACCESS_TO, WEBAC_ACCESS_TO_CLASS,
    WEBAC_AGENT, WEBAC_AGENT_CLASS, WEBAC_AGENT_GROUP, WEBAC_DEFAULT, WEBAC_MODE,
};

/// Builds [Authorization]s from the triples of an ACL resource.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationParser {
    base_uris: AgentBaseUris,
}

impl AuthorizationParser {
    /// Create a parser that derives agent short names from `base_uris`.
    pub fn new(base_uris: AgentBaseUris) -> Self {
        Self { base_uris }
    }

    /// The agent base URIs this parser strips.
    pub fn base_uris(&self) -> &AgentBaseUris {
        &self.base_uris
    }

    /// Parse every Authorization held by `acl`.
    pub fn parse(&self, acl: &Resource) -> Vec<Authorization> {
        self.parse_triples(acl.triples())
    }

    /// Parse every Authorization described by `triples`, in subject order.
    pub fn parse_triples(&self, triples: &[Triple]) -> Vec<Authorization> {
        let index = TripleIndex::build(triples, &self.base_uris);

        index
            .subjects()
            .map(|subject| Authorization {
                agents: index.values(subject, WEBAC_AGENT),
                agent_classes: index.values(subject, WEBAC_AGENT_CLASS),
                modes: index.values(subject, WEBAC_MODE),
                access_to: index.values(subject, WEBAC_ACCESS_TO),
                access_to_class: index.values(subject, WEBAC_ACCESS_TO_CLASS),
                agent_groups: index.values(subject, WEBAC_AGENT_GROUP),
                defaults: index.values(subject, WEBAC_DEFAULT),
            })
            .collect()
    }
}
