//! Authorization of low-level storage actions.
//!
//! Storage operations are expressed as named actions (`read`, `add_node`,
//! `remove`, ...). Each action needs one access [Mode]. Removing a node
//! removes its whole subtree, so a sole `remove` is only granted when the
//! caller may remove every descendant too.

use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, info};
use webac_graph::{ResourceGraph, ResourceId, Transaction};

use crate::{Mode, RoleComputer, RoleMap, WebacAuthError};

/// Read a node or property.
pub const ACTION_READ: &str = "read";
/// Add a child node.
pub const ACTION_ADD_NODE: &str = "add_node";
/// Set a property.
pub const ACTION_SET_PROPERTY: &str = "set_property";
/// Remove a node or property.
pub const ACTION_REMOVE: &str = "remove";
/// Remove the children of a node. Checked per child via [ACTION_REMOVE].
pub const ACTION_REMOVE_CHILD_NODES: &str = "remove_child_nodes";
/// Read access control.
pub const ACTION_READ_ACCESS_CONTROL: &str = "read_access_control";
/// Modify access control.
pub const ACTION_MODIFY_ACCESS_CONTROL: &str = "modify_access_control";

/// The mode an action requires, or `None` for an unknown action.
pub fn action_mode(action: &str) -> Option<Mode> {
    match action {
        ACTION_READ => Some(Mode::Read),
        ACTION_ADD_NODE | ACTION_SET_PROPERTY | ACTION_REMOVE | ACTION_REMOVE_CHILD_NODES => {
            Some(Mode::Write)
        }
        ACTION_READ_ACCESS_CONTROL | ACTION_MODIFY_ACCESS_CONTROL => Some(Mode::Control),
        _ => None,
    }
}

/// True when `granted` mode URIs cover every action in `actions`.
/// `remove_child_nodes` is always covered.
pub fn roles_have_permission(granted: &BTreeSet<String>, actions: &[&str]) -> bool {
    actions.iter().all(|action| {
        if *action == ACTION_REMOVE_CHILD_NODES {
            return true;
        }
        action_mode(action).is_some_and(|mode| granted.contains(mode.uri()))
    })
}

/// The union of the modes `roles` grants to any of `principals`.
pub fn resolve_user_roles<'a, Principals>(roles: &RoleMap, principals: Principals) -> BTreeSet<String>
where
    Principals: IntoIterator<Item = &'a str>,
{
    principals
        .into_iter()
        .filter_map(|principal| roles.get(principal))
        .flatten()
        .cloned()
        .collect()
}

/// Checks storage actions against the modes a caller holds.
pub struct LegacyActionDelegate<G> {
    roles: Arc<RoleComputer<G>>,
}

impl<G> LegacyActionDelegate<G>
where
    G: ResourceGraph,
{
    /// Create a delegate that computes descendant roles with `roles`.
    pub fn new(roles: Arc<RoleComputer<G>>) -> Self {
        Self { roles }
    }

    /// The modes `principals` hold on `path`, evaluated on its nearest
    /// existing ancestor when nothing exists there.
    pub fn granted_modes(
        &self,
        transaction: Option<&Transaction>,
        path: &ResourceId,
        principals: &[&str],
    ) -> Result<BTreeSet<String>, WebacAuthError> {
        let resource = self.roles.nearest_existing(transaction, path)?;
        let roles = self.roles.compute_roles_for(transaction, &resource)?;
        Ok(resolve_user_roles(&roles, principals.iter().copied()))
    }

    /// True when a caller holding `granted` on `path` may perform `actions`
    /// there. A sole `remove` also requires `remove` on every descendant,
    /// evaluated for `principals`.
    pub fn has_permission(
        &self,
        transaction: Option<&Transaction>,
        path: &ResourceId,
        actions: &[&str],
        granted: &BTreeSet<String>,
        principals: &[&str],
    ) -> Result<bool, WebacAuthError> {
        if !roles_have_permission(granted, actions) {
            debug!(path = %path, ?actions, "Denied storage actions");
            return Ok(false);
        }

        if actions != [ACTION_REMOVE] {
            return Ok(true);
        }

        self.can_remove_descendants(transaction, path, granted, principals)
    }

    fn can_remove_descendants(
        &self,
        transaction: Option<&Transaction>,
        path: &ResourceId,
        inherited: &BTreeSet<String>,
        principals: &[&str],
    ) -> Result<bool, WebacAuthError> {
        for child in self.roles.graph().children(transaction, path)? {
            let roles = self.roles.compute_roles(transaction, &child)?;
            let granted = if roles.is_empty() {
                inherited.clone()
            } else {
                resolve_user_roles(&roles, principals.iter().copied())
            };

            if !roles_have_permission(&granted, &[ACTION_REMOVE]) {
                info!(parent = %path, child = %child, "Removal denied");
                return Ok(false);
            }

            if !self.can_remove_descendants(transaction, &child, &granted, principals)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
