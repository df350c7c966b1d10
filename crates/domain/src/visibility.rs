//! Workspace visibility reconciliation as pure state transitions.
//!
//! A [`VisibilityPlan`] holds the stored public workspaces next to a working
//! copy. Passes rewrite the working copy in a fixed order and the caller
//! persists only the records whose planned state differs from what is
//! stored. Every pass sets whole state instead of patching it, so running a
//! cycle twice on the same inputs plans no changes the second time.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    AccessPolicy, HierarchyPlacement, RoleName, WorkspaceLabel, WorkspaceName, WorkspaceRecord,
};

/// Planned role lists and flags for the public workspaces of a site.
#[derive(Debug, Clone)]
pub struct VisibilityPlan {
    stored: BTreeMap<WorkspaceName, WorkspaceRecord>,
    planned: BTreeMap<WorkspaceName, WorkspaceRecord>,
}

impl VisibilityPlan {
    /// Starts a plan from the stored workspaces. Private pages are ignored.
    #[must_use]
    pub fn new(workspaces: impl IntoIterator<Item = WorkspaceRecord>) -> Self {
        let stored: BTreeMap<WorkspaceName, WorkspaceRecord> = workspaces
            .into_iter()
            .filter(WorkspaceRecord::is_public)
            .map(|workspace| (workspace.name().clone(), workspace))
            .collect();
        let planned = stored.clone();

        Self { stored, planned }
    }

    /// Runs one full cycle.
    ///
    /// Order: role ownership over `universe`, unmanaged lockdown, hidden-flag
    /// reset, hierarchy placement for `selected`, then the home page. Later
    /// passes overwrite earlier ones for the same workspace.
    pub fn apply_cycle(
        &mut self,
        policy: &AccessPolicy,
        universe: &BTreeSet<RoleName>,
        selected: &BTreeSet<RoleName>,
    ) {
        self.apply_role_ownership(policy, universe);
        self.lock_unmanaged(policy);
        self.reset_hidden_flags(policy);
        self.apply_hierarchy(policy, selected);
        self.hide_home(policy);
    }

    /// Gives every mapped workspace exactly its gating role.
    ///
    /// A workspace whose role is never assigned to anyone stays invisible
    /// without further treatment. Extra links (Electricity follows Scope 2)
    /// are applied after the direct mappings.
    pub fn apply_role_ownership(&mut self, policy: &AccessPolicy, roles: &BTreeSet<RoleName>) {
        for role in roles.iter().chain(policy.always_allowed_roles()) {
            if let Some(label) = policy.workspace_for_role(role) {
                let granted = policy.granted([role.clone()].into());
                self.for_label(label, |workspace| workspace.grant(granted.clone()));
            }
        }

        for (role, label) in policy.extra_workspaces() {
            let granted = policy.granted([role.clone()].into());
            self.for_label(label, |workspace| workspace.grant(granted.clone()));
        }
    }

    /// Locks public workspaces that sit in a managed module but carry a label
    /// the policy does not curate.
    pub fn lock_unmanaged(&mut self, policy: &AccessPolicy) {
        let managed_labels = policy.managed_labels();
        for workspace in self.planned.values_mut() {
            let in_managed_module = workspace
                .module()
                .is_some_and(|module| policy.managed_modules().contains(module));
            if in_managed_module && !managed_labels.contains(workspace.label()) {
                workspace.lock();
            }
        }
    }

    /// Clears the global hidden flag on curated workspaces; roles alone gate them.
    pub fn reset_hidden_flags(&mut self, policy: &AccessPolicy) {
        for label in policy.hidden_flag_labels() {
            self.for_label(&label, WorkspaceRecord::reveal);
        }
    }

    /// Grants or locks every workspace inside the scope hierarchy according
    /// to the selected roles.
    pub fn apply_hierarchy(&mut self, policy: &AccessPolicy, selected: &BTreeSet<RoleName>) {
        for workspace in self.planned.values_mut() {
            let placement =
                policy.placement(workspace.label(), workspace.parent_page(), selected);
            match placement {
                HierarchyPlacement::Outside => {}
                HierarchyPlacement::Grant(roles) => workspace.grant(roles),
                HierarchyPlacement::Lock => workspace.lock(),
            }
        }
    }

    /// Hides the home workspace for everyone.
    pub fn hide_home(&mut self, policy: &AccessPolicy) {
        self.for_label(policy.home_label(), WorkspaceRecord::hide_globally);
    }

    /// Returns the planned state of a workspace.
    #[must_use]
    pub fn planned(&self, name: &WorkspaceName) -> Option<&WorkspaceRecord> {
        self.planned.get(name)
    }

    /// Returns the planned state of the first workspace labelled `label`.
    #[must_use]
    pub fn planned_by_label(&self, label: &WorkspaceLabel) -> Option<&WorkspaceRecord> {
        self.planned
            .values()
            .find(|workspace| workspace.label() == label)
    }

    /// Iterates over every planned workspace in name order.
    pub fn workspaces(&self) -> impl Iterator<Item = &WorkspaceRecord> {
        self.planned.values()
    }

    /// Returns planned records that differ from their stored state.
    #[must_use]
    pub fn changes(&self) -> Vec<&WorkspaceRecord> {
        self.planned
            .iter()
            .filter(|(name, planned)| self.stored.get(*name) != Some(*planned))
            .map(|(_, planned)| planned)
            .collect()
    }

    fn for_label(&mut self, label: &WorkspaceLabel, mut apply: impl FnMut(&mut WorkspaceRecord)) {
        self.planned
            .values_mut()
            .filter(|workspace| workspace.label() == label)
            .for_each(|workspace| apply(workspace));
    }
}

/// Returns the private pages that expose hierarchy content the selection no
/// longer reaches.
///
/// Private pages bypass role gating, so locking is not enough; callers
/// delete what this returns. Only pages whose parent is a hierarchy root are
/// considered, and a page that repeats its parent's label is left alone.
#[must_use]
pub fn private_pages_to_remove<'a>(
    policy: &AccessPolicy,
    selected: &BTreeSet<RoleName>,
    pages: &'a [WorkspaceRecord],
) -> Vec<&'a WorkspaceRecord> {
    pages
        .iter()
        .filter(|page| !page.is_public())
        .filter(|page| {
            let Some(parent) = page.parent_page() else {
                return false;
            };
            policy.is_hierarchy_root(parent)
                && page.label() != parent
                && policy.placement(page.label(), Some(parent), selected)
                    == HierarchyPlacement::Lock
        })
        .collect()
}

#[cfg(test)]
mod tests;
