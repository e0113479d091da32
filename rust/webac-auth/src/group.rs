use tracing::{info, trace};
use webac_graph::{INTERNAL_PREFIX, ResourceGraph, ResourceId, Transaction, WebacGraphError};

use crate::{AgentBaseUris, FOAF_AGENT, VCARD_GROUP, VCARD_MEMBER, WebacAuthError};

/// Expands `acl:agentGroup` references into the agents they name.
///
/// A reference is the URI of a repository resource, optionally with a
/// fragment selecting one group among several described by that resource. The
/// group must be typed `vcard:Group`; its `vcard:hasMember` objects are its
/// agents. `foaf:Agent` passes through unchanged and references outside the
/// repository are ignored.
pub struct AgentGroupResolver<G> {
    graph: G,
    base_uris: AgentBaseUris,
}

impl<G> AgentGroupResolver<G>
where
    G: ResourceGraph,
{
    /// Create a resolver that reads groups from `graph`.
    pub fn new(graph: G, base_uris: AgentBaseUris) -> Self {
        Self { graph, base_uris }
    }

    /// The agents named by every group in `groups`. Member URIs under an agent
    /// base URI are listed both in full and by their short name.
    pub fn resolve<'a, Groups>(
        &self,
        transaction: Option<&Transaction>,
        groups: Groups,
    ) -> Result<Vec<String>, WebacAuthError>
    where
        Groups: IntoIterator<Item = &'a str>,
    {
        let mut members = Vec::new();

        for group in groups {
            if group == FOAF_AGENT {
                members.push(group.to_owned());
                continue;
            }

            if !group.starts_with(INTERNAL_PREFIX) {
                info!(group, "Ignoring agent group outside the repository");
                continue;
            }

            self.members_of(transaction, group, &mut members)?;
        }

        Ok(members)
    }

    fn members_of(
        &self,
        transaction: Option<&Transaction>,
        group: &str,
        members: &mut Vec<String>,
    ) -> Result<(), WebacAuthError> {
        let (location, fragment) = match group.split_once('#') {
            Some((location, fragment)) => (location, Some(fragment)),
            None => (group, None),
        };

        let Ok(id) = ResourceId::parse(location) else {
            info!(group, "Ignoring malformed agent group reference");
            return Ok(());
        };

        let resource = match self.graph.resource(transaction, &id) {
            Ok(resource) => resource,
            Err(WebacGraphError::NotFound(_)) => {
                return Err(WebacAuthError::GroupNotFound(group.to_owned()));
            }
            Err(error) => return Err(error.into()),
        };

        let suffix = fragment.map(|fragment| format!("#{fragment}"));
        let triples: Vec<_> = resource
            .triples()
            .iter()
            .filter(|triple| match &suffix {
                Some(suffix) => triple
                    .subject
                    .as_uri()
                    .is_some_and(|subject| subject.ends_with(suffix.as_str())),
                None => true,
            })
            .collect();

        if !triples.iter().any(|triple| triple.is_type(VCARD_GROUP)) {
            trace!(group, "Agent group is not typed as a group");
            return Ok(());
        }

        for triple in triples {
            if triple.predicate != VCARD_MEMBER {
                continue;
            }
            let Some(member) = triple.object.lexical() else {
                continue;
            };
            members.push(member.to_owned());
            if let Some(short_name) = triple.object.as_uri().and_then(|uri| self.base_uris.strip(uri)) {
                members.push(short_name.to_owned());
            }
        }

        Ok(())
    }
}
