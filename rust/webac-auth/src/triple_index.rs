use std::collections::{BTreeMap, BTreeSet};

use webac_graph::{Node, Triple};

use crate::{AgentBaseUris, WEBAC_AGENT, WEBAC_AUTHORIZATION, WEBAC_NAMESPACE};

type PredicateValues = BTreeMap<String, BTreeSet<String>>;

/// The WebAC statements of an ACL graph grouped by Authorization subject and
/// then by predicate.
///
/// Only subjects typed `acl:Authorization` are indexed, and only predicates in
/// the WebAC namespace are kept for them. Objects are reduced to strings: URIs
/// and literals by value, blank nodes not at all. An `acl:agent` URI found
/// under one of the agent base URIs is indexed twice, once as written and once
/// by its short name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleIndex {
    subjects: BTreeMap<Node, PredicateValues>,
}

impl TripleIndex {
    /// Index `triples`, deriving agent short names from `base_uris`.
    pub fn build(triples: &[Triple], base_uris: &AgentBaseUris) -> Self {
        let authorizations: BTreeSet<&Node> = triples
            .iter()
            .filter(|triple| triple.is_type(WEBAC_AUTHORIZATION))
            .map(|triple| &triple.subject)
            .collect();

        let mut subjects: BTreeMap<Node, PredicateValues> = authorizations
            .iter()
            .map(|subject| ((*subject).clone(), PredicateValues::new()))
            .collect();

        for triple in triples {
            if !triple.predicate.starts_with(WEBAC_NAMESPACE) {
                continue;
            }
            let Some(predicates) = subjects.get_mut(&triple.subject) else {
                continue;
            };
            let Some(value) = triple.object.lexical() else {
                continue;
            };

            let values = predicates.entry(triple.predicate.clone()).or_default();
            values.insert(value.to_owned());

            if triple.predicate == WEBAC_AGENT {
                if let Some(short_name) = triple.object.as_uri().and_then(|uri| base_uris.strip(uri)) {
                    values.insert(short_name.to_owned());
                }
            }
        }

        Self { subjects }
    }

    /// The indexed Authorization subjects, in order.
    pub fn subjects(&self) -> impl Iterator<Item = &Node> {
        self.subjects.keys()
    }

    /// The values recorded for `predicate` on `subject`.
    pub fn values(&self, subject: &Node, predicate: &str) -> BTreeSet<String> {
        self.subjects
            .get(subject)
            .and_then(|predicates| predicates.get(predicate))
            .cloned()
            .unwrap_or_default()
    }

    /// The number of indexed Authorization subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// True when the graph holds no Authorization subjects.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
