use std::{collections::HashSet, sync::Arc};

use tracing::{debug, trace, warn};
use webac_graph::{Resource, ResourceGraph, ResourceId, Transaction, WebacGraphError};

use crate::{Authorization, AuthorizationParser, WebacAuthError};

/// The ACL that governs a resource: the resource whose attached ACL supplied
/// the rules, and the rules that apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveAcl {
    resource: Arc<Resource>,
    authorizations: Arc<[Authorization]>,
}

impl EffectiveAcl {
    /// Pair a governing resource with the Authorizations it contributes.
    pub fn new(resource: Resource, authorizations: Vec<Authorization>) -> Self {
        Self {
            resource: Arc::new(resource),
            authorizations: authorizations.into(),
        }
    }

    /// The resource whose ACL supplied the Authorizations.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The Authorizations that apply.
    pub fn authorizations(&self) -> &[Authorization] {
        &self.authorizations
    }
}

/// Walks up the containment hierarchy to find the [EffectiveAcl] of a
/// resource.
///
/// The resource's own ACL contributes all of its Authorizations. An ACL found
/// on an ancestor contributes only its default Authorizations. An ACL that
/// contributes nothing is passed over. Binary descriptions and time maps
/// without a container continue the walk at the resource they describe.
pub struct EffectiveAclResolver<G> {
    graph: G,
    parser: AuthorizationParser,
}

impl<G> EffectiveAclResolver<G>
where
    G: ResourceGraph,
{
    /// Create a resolver that reads from `graph` and parses ACLs with
    /// `parser`.
    pub fn new(graph: G, parser: AuthorizationParser) -> Self {
        Self { graph, parser }
    }

    /// Find the effective ACL of `resource`, or `None` when no ACL in its
    /// ancestry applies.
    pub fn resolve(
        &self,
        transaction: Option<&Transaction>,
        resource: &Resource,
    ) -> Result<Option<EffectiveAcl>, WebacAuthError> {
        let mut current = resource.clone();
        let mut inherited = false;
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(current.id().clone()) {
                warn!(
                    resource = %resource.id(),
                    revisited = %current.id(),
                    "Containment cycle while resolving effective ACL"
                );
                return Ok(None);
            }

            trace!(resource = %current.id(), inherited, "Looking for an ACL");

            if let Some(acl) = current.acl() {
                let authorizations = self.authorizations(transaction, acl, inherited)?;
                if !authorizations.is_empty() {
                    debug!(
                        resource = %resource.id(),
                        governed_by = %current.id(),
                        count = authorizations.len(),
                        "Found effective ACL"
                    );
                    return Ok(Some(EffectiveAcl::new(current, authorizations)));
                }
            }

            let Some(next) = next_in_walk(&current) else {
                debug!(resource = %resource.id(), "No effective ACL");
                return Ok(None);
            };

            current = self.graph.resource(transaction, &next)?;
            inherited = true;
        }
    }

    fn authorizations(
        &self,
        transaction: Option<&Transaction>,
        acl: &ResourceId,
        inherited: bool,
    ) -> Result<Vec<Authorization>, WebacAuthError> {
        let acl = match self.graph.resource(transaction, acl) {
            Ok(acl) => acl,
            Err(WebacGraphError::NotFound(_)) => {
                trace!(acl = %acl, "Attached ACL is missing");
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };

        Ok(self
            .parser
            .parse(&acl)
            .into_iter()
            .filter(|authorization| !inherited || authorization.is_default())
            .collect())
    }
}

fn next_in_walk(resource: &Resource) -> Option<ResourceId> {
    if let Some(container) = resource.container() {
        return Some(container.clone());
    }

    let described = resource.described_resource();
    (resource.has_described_resource() && described != resource.id()).then(|| described.clone())
}
