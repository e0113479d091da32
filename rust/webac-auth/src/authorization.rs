use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One WebAC rule: the `modes` it grants, to whom (`agents`, `agent_classes`,
/// `agent_groups`) and over what (`access_to`, `access_to_class`). A rule with
/// any `defaults` value also applies to the descendants of the resource whose
/// ACL holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Authorization {
    /// Agent URIs and bare account names
    pub agents: BTreeSet<String>,
    /// Agent class URIs such as `foaf:Agent`
    pub agent_classes: BTreeSet<String>,
    /// Mode URIs
    pub modes: BTreeSet<String>,
    /// Resource identifiers the rule protects
    pub access_to: BTreeSet<String>,
    /// RDF classes whose instances the rule protects
    pub access_to_class: BTreeSet<String>,
    /// Agent group references, expanded at role computation time
    pub agent_groups: BTreeSet<String>,
    /// Non-empty when the rule is inherited by descendants
    pub defaults: BTreeSet<String>,
}

impl Authorization {
    /// True when this rule applies to descendants of its resource.
    pub fn is_default(&self) -> bool {
        !self.defaults.is_empty()
    }

    /// True when `access_to` names any of `targets`.
    pub fn grants_access_to<'a, Targets>(&self, targets: Targets) -> bool
    where
        Targets: IntoIterator<Item = &'a str>,
    {
        targets
            .into_iter()
            .any(|target| self.access_to.contains(target))
    }

    /// True when `access_to_class` names any of `classes`.
    pub fn grants_access_to_class<'a, Classes>(&self, classes: Classes) -> bool
    where
        Classes: IntoIterator<Item = &'a str>,
    {
        classes
            .into_iter()
            .any(|class| self.access_to_class.contains(class))
    }
}
