#![allow(dead_code)]

use std::collections::BTreeSet;

use webac_auth::{
    Mode, RoleMap, WEBAC_ACCESS_TO, WEBAC_AGENT, WEBAC_AGENT_GROUP, WEBAC_AUTHORIZATION,
    WEBAC_DEFAULT, WEBAC_MODE,
};
use webac_graph::{MemoryResourceGraph, Node, RDF_TYPE, Resource, ResourceId, ResourceKind, Triple};

/// A rule in an ACL graph, written out as triples by [Rule::triples].
pub struct Rule {
    name: String,
    agents: Vec<String>,
    groups: Vec<String>,
    modes: Vec<Mode>,
    access_to: Vec<String>,
    default: bool,
}

impl Rule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            agents: Vec::new(),
            groups: Vec::new(),
            modes: Vec::new(),
            access_to: Vec::new(),
            default: false,
        }
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.agents.push(agent.to_owned());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.groups.push(group.to_owned());
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.modes.push(mode);
        self
    }

    pub fn access_to(mut self, path: &str) -> Self {
        self.access_to.push(ResourceId::from_path(path).to_string());
        self
    }

    pub fn inherited(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn triples(&self, acl: &ResourceId) -> Vec<Triple> {
        let subject = Node::uri(format!("{acl}#{}", self.name));
        let mut triples = vec![Triple::new(
            subject.clone(),
            RDF_TYPE,
            Node::uri(WEBAC_AUTHORIZATION),
        )];
        for agent in &self.agents {
            triples.push(Triple::new(subject.clone(), WEBAC_AGENT, Node::literal(agent)));
        }
        for group in &self.groups {
            triples.push(Triple::new(subject.clone(), WEBAC_AGENT_GROUP, Node::uri(group)));
        }
        for mode in &self.modes {
            triples.push(Triple::new(subject.clone(), WEBAC_MODE, Node::uri(mode.uri())));
        }
        for target in &self.access_to {
            triples.push(Triple::new(subject.clone(), WEBAC_ACCESS_TO, Node::uri(target)));
            if self.default {
                triples.push(Triple::new(subject.clone(), WEBAC_DEFAULT, Node::uri(target)));
            }
        }
        triples
    }
}

/// Store a container at `path`, contained by its parent, with an ACL holding
/// `rules` when any are given.
pub fn container(graph: &MemoryResourceGraph, path: &str, rules: &[Rule]) -> ResourceId {
    let id = ResourceId::from_path(path);
    let mut resource = Resource::new(id.clone(), ResourceKind::Container);
    if let Some(parent) = id.parent() {
        resource = resource.contained_by(parent);
    }
    if !rules.is_empty() {
        let acl = id.child("fcr:acl");
        let triples = rules.iter().flat_map(|rule| rule.triples(&acl));
        graph.insert(
            Resource::new(acl.clone(), ResourceKind::Acl { controlled: id.clone() })
                .with_triples(triples),
        );
        resource = resource.with_acl(acl);
    }
    graph.insert(resource);
    id
}

pub fn modes(modes: &[Mode]) -> BTreeSet<String> {
    modes.iter().map(|mode| mode.uri().to_owned()).collect()
}

pub fn roles(entries: &[(&str, &[Mode])]) -> RoleMap {
    entries
        .iter()
        .map(|(principal, granted)| (principal.to_string(), modes(granted)))
        .collect()
}
