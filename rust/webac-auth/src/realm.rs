use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, warn};
use webac_graph::{INTERNAL_PREFIX, ResourceGraph, ResourceId, Transaction};

use crate::{
    AccessRequest, FOAF_AGENT, Permission, RequestGate, RoleComputer, WEBAC_AUTHENTICATED_AGENT,
    WebacAuthError,
};

/// A role the servlet container assigns to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerRole {
    /// Repository administrators, who bypass WebAC
    Admin,
    /// Ordinary repository users
    User,
}

/// Who is making a request, as reported by upstream authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principals {
    user: Option<String>,
    delegates: Vec<String>,
    headers: Vec<String>,
    roles: BTreeSet<ContainerRole>,
}

impl Principals {
    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated caller known as `name`.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a principal an administrator acts on behalf of.
    pub fn delegating_to(mut self, name: impl Into<String>) -> Self {
        self.delegates.push(name.into());
        self
    }

    /// Add a principal asserted by a trusted request header.
    pub fn with_header_principal(mut self, name: impl Into<String>) -> Self {
        self.headers.push(name.into());
        self
    }

    /// Add a container role.
    pub fn with_role(mut self, role: ContainerRole) -> Self {
        self.roles.insert(role);
        self
    }

    /// The authenticated user name.
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// True when the caller holds `role`.
    pub fn has_role(&self, role: ContainerRole) -> bool {
        self.roles.contains(&role)
    }
}

/// What a caller may do: everything when `admin` is set, otherwise exactly
/// the listed permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    admin: bool,
    authenticated: bool,
    roles: BTreeSet<ContainerRole>,
    permissions: BTreeSet<Permission>,
}

impl Grants {
    /// True when the caller bypasses WebAC.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// True when the caller authenticated as a user or acts for a delegate.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// True when the caller holds `role`.
    pub fn has_role(&self, role: ContainerRole) -> bool {
        self.roles.contains(&role)
    }

    /// The permissions granted across all targets.
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// True when the caller may exercise `permission`.
    pub fn is_permitted(&self, permission: &Permission) -> bool {
        self.admin
            || self
                .permissions
                .iter()
                .any(|granted| granted.implies(permission))
    }
}

/// Collects the permissions a caller holds on the targets of one request.
///
/// An administrator bypasses WebAC unless acting for exactly one delegate, in
/// which case the delegate's name is evaluated instead. Every caller is
/// evaluated as `foaf:Agent`, and callers with a user or delegate name also
/// as `acl:AuthenticatedAgent`.
pub struct PermissionRealm<G> {
    roles: Arc<RoleComputer<G>>,
    base_uri: Option<String>,
}

impl<G> PermissionRealm<G>
where
    G: ResourceGraph,
{
    /// Create a realm over `roles`. Targets under `base_uri` are mapped to
    /// resource identifiers by path.
    pub fn new(roles: Arc<RoleComputer<G>>, base_uri: Option<String>) -> Self {
        Self { roles, base_uri }
    }

    /// Map a request target onto the resource it names.
    pub fn resource_id(&self, target: &str) -> Result<ResourceId, WebacAuthError> {
        let target = target
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        if target.starts_with(INTERNAL_PREFIX) {
            return ResourceId::parse(target)
                .map_err(|_| WebacAuthError::InvalidTarget(target.to_owned()));
        }

        let path = self
            .base_uri
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .and_then(|base| target.strip_prefix(base))
            .filter(|path| path.is_empty() || path.starts_with('/'));

        match path {
            Some(path) => Ok(ResourceId::from_path(path)),
            None => Err(WebacAuthError::InvalidTarget(target.to_owned())),
        }
    }

    /// The principal names the caller is evaluated as, or `None` for an
    /// administrator who bypasses WebAC.
    pub fn principal_names(
        &self,
        principals: &Principals,
    ) -> Result<Option<Vec<String>>, WebacAuthError> {
        let admin = principals.has_role(ContainerRole::Admin);
        let mut names = Vec::new();

        let acting_as = if admin {
            match principals.delegates.as_slice() {
                [] => return Ok(None),
                [delegate] => Some(delegate.clone()),
                delegates => {
                    warn!(count = delegates.len(), "Administrator presented several delegates");
                    return Err(WebacAuthError::TooManyDelegates(delegates.len()));
                }
            }
        } else {
            principals.user.clone()
        };

        if let Some(name) = acting_as {
            names.push(name);
            names.push(WEBAC_AUTHENTICATED_AGENT.to_owned());
        }
        names.extend(principals.headers.iter().cloned());
        names.push(FOAF_AGENT.to_owned());

        Ok(Some(names))
    }

    /// Evaluate what `principals` may do on `targets`.
    pub fn grants<'a, Targets>(
        &self,
        transaction: Option<&Transaction>,
        principals: &Principals,
        targets: Targets,
    ) -> Result<Grants, WebacAuthError>
    where
        Targets: IntoIterator<Item = &'a str>,
    {
        let roles = principals.roles.clone();

        let Some(names) = self.principal_names(principals)? else {
            debug!("Administrator bypasses WebAC");
            return Ok(Grants {
                admin: true,
                authenticated: true,
                roles,
                permissions: BTreeSet::new(),
            });
        };

        let authenticated = names.iter().any(|name| name == WEBAC_AUTHENTICATED_AGENT);
        let mut permissions = BTreeSet::new();

        for target in targets {
            let id = self.resource_id(target)?;
            let resource = self.roles.nearest_existing(transaction, &id)?;
            let role_map = self.roles.compute_roles_for(transaction, &resource)?;

            for modes in names.iter().filter_map(|name| role_map.get(name)) {
                permissions.extend(modes.iter().map(|mode| Permission::new(mode, target)));
            }
        }

        debug!(?names, ?permissions, "Evaluated grants");

        Ok(Grants {
            admin: false,
            authenticated,
            roles,
            permissions,
        })
    }

    /// The URIs of every resource below `target`, spelled relative to
    /// `target` itself.
    pub fn descendant_targets(
        &self,
        transaction: Option<&Transaction>,
        target: &str,
    ) -> Result<Vec<String>, WebacAuthError> {
        let id = self.resource_id(target)?;
        let prefix = target
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        let mut descendants = Vec::new();
        let mut pending = self.roles.graph().children(transaction, &id)?;
        while let Some(child) = pending.pop() {
            if let Some(suffix) = child.as_str().strip_prefix(id.as_str()) {
                descendants.push(format!("{prefix}{suffix}"));
            }
            pending.extend(self.roles.graph().children(transaction, &child)?);
        }

        Ok(descendants)
    }

    /// Decide whether `principals` may make `request`. A `DELETE` is
    /// evaluated on every resource below its target as well.
    pub fn authorize(
        &self,
        transaction: Option<&Transaction>,
        principals: &Principals,
        request: &AccessRequest,
    ) -> Result<bool, WebacAuthError> {
        let request = if request.deletes_subtree() {
            let descendants = self.descendant_targets(transaction, request.target())?;
            request.clone().with_descendants(descendants)
        } else {
            request.clone()
        };

        let grants = self.grants(transaction, principals, request.targets())?;
        Ok(RequestGate.is_authorized(&grants, &request))
    }

    /// True when `principals` hold `permission`, evaluated on its resource.
    pub fn is_permitted(
        &self,
        transaction: Option<&Transaction>,
        principals: &Principals,
        permission: &Permission,
    ) -> Result<bool, WebacAuthError> {
        let grants = self.grants(transaction, principals, [permission.resource()])?;
        let permitted = grants.is_permitted(permission);
        debug!(%permission, permitted, "Checked permission");
        Ok(permitted)
    }
}
