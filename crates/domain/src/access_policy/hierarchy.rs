use std::collections::BTreeSet;

use crate::{RoleName, WorkspaceLabel};

use super::{AccessPolicy, HierarchyBranch};

/// Where a workspace lands in the scope hierarchy for a role selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyPlacement {
    /// Neither the page nor its parent is a hierarchy root.
    Outside,
    /// The page is reachable and gets exactly these roles.
    Grant(BTreeSet<RoleName>),
    /// The page sits in the hierarchy but nothing selected reaches it.
    Lock,
}

impl AccessPolicy {
    /// Returns whether `label` is a scope root or a second-level branch.
    #[must_use]
    pub fn is_hierarchy_root(&self, label: &WorkspaceLabel) -> bool {
        self.hierarchy_roots.contains(label) || self.branch_for(label).is_some()
    }

    /// Returns the branch whose page carries `label`.
    #[must_use]
    pub fn branch_for(&self, label: &WorkspaceLabel) -> Option<&HierarchyBranch> {
        self.branches.iter().find(|branch| &branch.label == label)
    }

    /// Places a page labelled `label` under `parent` for the `selected` roles.
    ///
    /// Rules, first match wins:
    /// 1. a branch page is granted its branch roles when the branch role is selected;
    /// 2. a page mapped to a selected role, or an extra workspace, is granted
    ///    the roles that own it;
    /// 3. a child of a selected branch is granted the branch roles;
    /// 4. anything else in the hierarchy is locked.
    ///
    /// Granted role sets always include the always-allowed roles.
    #[must_use]
    pub fn placement(
        &self,
        label: &WorkspaceLabel,
        parent: Option<&WorkspaceLabel>,
        selected: &BTreeSet<RoleName>,
    ) -> HierarchyPlacement {
        let under_root = parent.is_some_and(|parent| self.is_hierarchy_root(parent));
        if !under_root && !self.is_hierarchy_root(label) {
            return HierarchyPlacement::Outside;
        }

        if let Some(branch) = self.branch_for(label) {
            return self.branch_placement(branch, selected);
        }

        let owners = self.roles_for_label(label, selected);
        if !owners.is_empty() {
            return HierarchyPlacement::Grant(self.granted(owners));
        }

        match parent.and_then(|parent| self.branch_for(parent)) {
            Some(branch) => self.branch_placement(branch, selected),
            None => HierarchyPlacement::Lock,
        }
    }

    fn branch_placement(
        &self,
        branch: &HierarchyBranch,
        selected: &BTreeSet<RoleName>,
    ) -> HierarchyPlacement {
        if selected.contains(&branch.role) {
            HierarchyPlacement::Grant(self.granted(branch.granted_roles()))
        } else {
            HierarchyPlacement::Lock
        }
    }
}
