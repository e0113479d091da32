use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;
use tracing::debug;
use webac_graph::{
    Resource, ResourceGraph, ResourceId, ResourceKind, Transaction, WebacGraphError,
};

use crate::{
    AgentBaseUris, AgentGroupResolver, Authorization, AuthorizationParser, EffectiveAcl,
    EffectiveAclCache, EffectiveAclResolver, WebacAuthError, WebacConfig, is_special_agent_class,
};

/// Principal name to granted mode URIs, for one resource.
pub type RoleMap = BTreeMap<String, BTreeSet<String>>;

/// Computes which principals hold which access modes on a resource.
///
/// The effective ACL of the resource is resolved through a shared
/// [EffectiveAclCache] (reads inside a [Transaction] bypass it). Without an
/// effective ACL the configured default Authorizations apply. An
/// Authorization applies when it names the resource (or, for the default
/// Authorizations, one of its ancestors) in `accessTo`, or one of its types in
/// `accessToClass`.
pub struct RoleComputer<G> {
    graph: G,
    cache: EffectiveAclCache,
    base_uris: RwLock<AgentBaseUris>,
    default_authorizations: Vec<Authorization>,
}

impl<G> RoleComputer<G>
where
    G: ResourceGraph,
{
    /// Create a role computer reading from `graph` and caching effective ACLs
    /// in `cache`.
    pub fn new(graph: G, cache: EffectiveAclCache, config: &WebacConfig) -> Self {
        Self {
            graph,
            cache,
            base_uris: RwLock::new(config.agent_base_uris()),
            default_authorizations: config.default_authorizations.clone(),
        }
    }

    /// Create a role computer with a cache sized by `config`.
    pub fn from_config(graph: G, config: &WebacConfig) -> Result<Self, WebacAuthError> {
        Ok(Self::new(graph, EffectiveAclCache::new(&config.cache)?, config))
    }

    /// The resource graph roles are computed from.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// The shared effective ACL cache.
    pub fn cache(&self) -> &EffectiveAclCache {
        &self.cache
    }

    /// Replace the agent base URIs. Cached ACLs carry short names derived
    /// from the old ones, so the cache is emptied.
    pub fn set_agent_base_uris(&self, base_uris: AgentBaseUris) {
        *self.base_uris.write() = base_uris;
        self.cache.invalidate_all();
    }

    /// The resource at `id`, or its nearest ancestor that exists.
    pub fn nearest_existing(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Resource, WebacAuthError> {
        let mut candidate = id.clone();
        loop {
            match self.graph.resource(transaction, &candidate) {
                Ok(resource) => return Ok(resource),
                Err(WebacGraphError::NotFound(missing)) => match candidate.parent() {
                    Some(parent) => candidate = parent,
                    None => return Err(WebacGraphError::NotFound(missing).into()),
                },
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// The effective ACL of `resource`.
    pub fn effective_acl(
        &self,
        transaction: Option<&Transaction>,
        resource: &Resource,
    ) -> Result<Option<EffectiveAcl>, WebacAuthError> {
        // The parser must read the base URIs inside `compute`, after the
        // cache has noted its generation.
        let resolver = || {
            EffectiveAclResolver::new(
                &self.graph,
                AuthorizationParser::new(self.base_uris.read().clone()),
            )
        };

        match transaction {
            Some(_) => resolver().resolve(transaction, resource),
            None => self
                .cache
                .get(resource.id(), || resolver().resolve(None, resource)),
        }
    }

    /// Compute the roles held on the resource at `id`.
    pub fn compute_roles(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<RoleMap, WebacAuthError> {
        let resource = self.graph.resource(transaction, id)?;
        self.compute_roles_for(transaction, &resource)
    }

    /// Compute the roles held on `resource`.
    pub fn compute_roles_for(
        &self,
        transaction: Option<&Transaction>,
        resource: &Resource,
    ) -> Result<RoleMap, WebacAuthError> {
        let effective = self.effective_acl(transaction, resource)?;

        let own_id = match resource.kind() {
            ResourceKind::BinaryDescription { described } => described,
            _ => resource.id(),
        };
        let mut target_paths = BTreeSet::from([own_id.to_string()]);
        let mut target_types: BTreeSet<&str> =
            resource.types().iter().map(String::as_str).collect();

        let authorizations = match &effective {
            Some(effective) => {
                let governing = effective.resource();
                if governing.id() != resource.id() {
                    target_paths.insert(governing.id().to_string());
                    target_types.extend(governing.types().iter().map(String::as_str));
                }
                effective.authorizations()
            }
            None => {
                target_paths.extend(resource.id().ancestors().map(|id| id.to_string()));
                self.default_authorizations.as_slice()
            }
        };

        let groups = AgentGroupResolver::new(&self.graph, self.base_uris.read().clone());
        let mut roles = RoleMap::new();

        for authorization in authorizations.iter().filter(|authorization| {
            authorization.grants_access_to(target_paths.iter().map(String::as_str))
                || authorization.grants_access_to_class(target_types.iter().copied())
        }) {
            let members = groups.resolve(
                transaction,
                authorization.agent_groups.iter().map(String::as_str),
            )?;
            let agents = authorization.agents.iter().cloned().chain(members);
            let classes = authorization
                .agent_classes
                .iter()
                .filter(|class| is_special_agent_class(class))
                .cloned();

            for principal in agents.chain(classes) {
                roles
                    .entry(principal)
                    .or_default()
                    .extend(authorization.modes.iter().cloned());
            }
        }

        debug!(resource = %resource.id(), ?roles, "Computed roles");

        Ok(roles)
    }
}
