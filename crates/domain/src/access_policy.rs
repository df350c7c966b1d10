//! Configuration that maps onboarding selections to roles, workspaces and modules.
//!
//! The policy is plain data. It is built once (from the built-in tables or a
//! JSON file) and passed into the reconciler, so tests can swap in fixture
//! tables without touching global state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{DocTypeName, ModuleName, RoleName, ScopeSelections, SelectionKey, WorkspaceLabel};

mod defaults;
mod extension;
mod hierarchy;
mod validation;

pub use extension::{PolicySummary, RoleProfile, ScopeMapping};
pub use hierarchy::HierarchyPlacement;
pub use validation::PolicyValidationReport;

/// Second-level hierarchy node that sits below a scope root, e.g. `Upstream`.
///
/// Pages under a branch are granted to the branch role together with its
/// parent scope role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyBranch {
    /// Workspace label of the branch page.
    pub label: WorkspaceLabel,
    /// Role that unlocks the branch.
    pub role: RoleName,
    /// Scope role that owns the branch.
    pub parent_role: RoleName,
}

impl HierarchyBranch {
    /// Returns the role set granted on the branch and its children.
    #[must_use]
    pub fn granted_roles(&self) -> BTreeSet<RoleName> {
        [self.parent_role.clone(), self.role.clone()].into()
    }
}

/// Versioned access configuration.
///
/// Field names in the serialized form follow the workspace access
/// configuration file used by the onboarding app. Every key is optional and
/// falls back to the built-in tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    version: u32,
    #[serde(rename = "role_mappings")]
    roles_by_selection: BTreeMap<SelectionKey, RoleName>,
    #[serde(rename = "workspace_mappings")]
    workspace_by_role: BTreeMap<RoleName, WorkspaceLabel>,
    #[serde(rename = "extra_workspace_mappings")]
    extra_workspaces_by_role: BTreeMap<RoleName, BTreeSet<WorkspaceLabel>>,
    #[serde(rename = "module_mappings")]
    modules_by_role: BTreeMap<RoleName, BTreeSet<ModuleName>>,
    readonly_doctypes: BTreeSet<DocTypeName>,
    always_allowed_roles: BTreeSet<RoleName>,
    managed_modules: BTreeSet<ModuleName>,
    hierarchy_roots: BTreeSet<WorkspaceLabel>,
    branches: Vec<HierarchyBranch>,
    home_label: WorkspaceLabel,
    user_role_hierarchy: BTreeMap<RoleName, RoleProfile>,
}

impl AccessPolicy {
    /// Returns a policy with no mappings, hierarchy or managed modules.
    ///
    /// Useful as a starting point for fixture policies.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: 1,
            roles_by_selection: BTreeMap::new(),
            workspace_by_role: BTreeMap::new(),
            extra_workspaces_by_role: BTreeMap::new(),
            modules_by_role: BTreeMap::new(),
            readonly_doctypes: BTreeSet::new(),
            always_allowed_roles: BTreeSet::new(),
            managed_modules: BTreeSet::new(),
            hierarchy_roots: BTreeSet::new(),
            branches: Vec::new(),
            home_label: WorkspaceLabel::from_static("Home"),
            user_role_hierarchy: BTreeMap::new(),
        }
    }

    /// Maps a checkbox to a role and the role to its workspace.
    #[must_use]
    pub fn with_role_mapping(
        mut self,
        key: SelectionKey,
        role: RoleName,
        workspace: WorkspaceLabel,
    ) -> Self {
        self.roles_by_selection.insert(key, role.clone());
        self.workspace_by_role.insert(role, workspace);
        self
    }

    /// Adds modules unblocked by `role`.
    #[must_use]
    pub fn with_modules(
        mut self,
        role: RoleName,
        modules: impl IntoIterator<Item = ModuleName>,
    ) -> Self {
        self.modules_by_role.entry(role).or_default().extend(modules);
        self
    }

    /// Links an additional workspace to `role`.
    #[must_use]
    pub fn with_extra_workspace(mut self, role: RoleName, workspace: WorkspaceLabel) -> Self {
        self.extra_workspaces_by_role
            .entry(role)
            .or_default()
            .insert(workspace);
        self
    }

    /// Adds roles that every granted workspace keeps.
    #[must_use]
    pub fn with_always_allowed(mut self, roles: impl IntoIterator<Item = RoleName>) -> Self {
        self.always_allowed_roles.extend(roles);
        self
    }

    /// Adds reference doctypes that selected roles may read.
    #[must_use]
    pub fn with_readonly_doctypes(
        mut self,
        doctypes: impl IntoIterator<Item = DocTypeName>,
    ) -> Self {
        self.readonly_doctypes.extend(doctypes);
        self
    }

    /// Adds modules whose unmapped public workspaces are locked.
    #[must_use]
    pub fn with_managed_modules(mut self, modules: impl IntoIterator<Item = ModuleName>) -> Self {
        self.managed_modules.extend(modules);
        self
    }

    /// Adds top-level hierarchy roots.
    #[must_use]
    pub fn with_hierarchy_roots(mut self, roots: impl IntoIterator<Item = WorkspaceLabel>) -> Self {
        self.hierarchy_roots.extend(roots);
        self
    }

    /// Adds a second-level hierarchy branch.
    #[must_use]
    pub fn with_branch(mut self, branch: HierarchyBranch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Returns the configuration version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns every role a selection can produce.
    #[must_use]
    pub fn role_universe(&self) -> BTreeSet<RoleName> {
        self.roles_by_selection.values().cloned().collect()
    }

    /// Derives the access roles for a set of checkboxes.
    ///
    /// Each checkbox maps to its role on its own; a ticked child does not
    /// imply its parent and a ticked parent does not imply any child.
    #[must_use]
    pub fn derive_roles(&self, selections: &ScopeSelections) -> BTreeSet<RoleName> {
        self.roles_by_selection
            .iter()
            .filter(|(key, _)| selections.is_selected(**key))
            .map(|(_, role)| role.clone())
            .collect()
    }

    /// Returns the role mapped to a checkbox.
    #[must_use]
    pub fn role_for_selection(&self, key: SelectionKey) -> Option<&RoleName> {
        self.roles_by_selection.get(&key)
    }

    /// Returns the workspace mapped to a role.
    #[must_use]
    pub fn workspace_for_role(&self, role: &RoleName) -> Option<&WorkspaceLabel> {
        self.workspace_by_role.get(role)
    }

    /// Iterates over `(role, extra workspace)` links.
    pub fn extra_workspaces(&self) -> impl Iterator<Item = (&RoleName, &WorkspaceLabel)> {
        self.extra_workspaces_by_role
            .iter()
            .flat_map(|(role, labels)| labels.iter().map(move |label| (role, label)))
    }

    /// Returns roles kept on every granted workspace.
    #[must_use]
    pub fn always_allowed_roles(&self) -> &BTreeSet<RoleName> {
        &self.always_allowed_roles
    }

    /// Returns the reference doctypes granted read access.
    #[must_use]
    pub fn readonly_doctypes(&self) -> &BTreeSet<DocTypeName> {
        &self.readonly_doctypes
    }

    /// Returns modules whose unmapped workspaces are locked.
    #[must_use]
    pub fn managed_modules(&self) -> &BTreeSet<ModuleName> {
        &self.managed_modules
    }

    /// Returns the label of the always-hidden home workspace.
    #[must_use]
    pub fn home_label(&self) -> &WorkspaceLabel {
        &self.home_label
    }

    /// Returns the second-level hierarchy branches.
    #[must_use]
    pub fn branches(&self) -> &[HierarchyBranch] {
        &self.branches
    }

    /// Resolves configured modules for a set of roles.
    #[must_use]
    pub fn modules_for_roles(&self, roles: &BTreeSet<RoleName>) -> BTreeSet<ModuleName> {
        roles
            .iter()
            .filter_map(|role| self.modules_by_role.get(role))
            .flatten()
            .cloned()
            .collect()
    }

    /// Returns the workspace labels reachable from `roles` plus every extra
    /// workspace.
    ///
    /// Extra workspaces stay allowed whatever is selected; their owning role
    /// still gates who sees them.
    #[must_use]
    pub fn allowed_labels(&self, roles: &BTreeSet<RoleName>) -> BTreeSet<WorkspaceLabel> {
        let mut labels: BTreeSet<WorkspaceLabel> = roles
            .iter()
            .filter_map(|role| self.workspace_by_role.get(role))
            .cloned()
            .collect();
        labels.extend(self.extra_workspaces().map(|(_, label)| label.clone()));
        labels
    }

    /// Returns the roles that own `label`: selected roles mapped to it and
    /// every role linked to it as an extra workspace.
    #[must_use]
    pub fn roles_for_label(
        &self,
        label: &WorkspaceLabel,
        roles: &BTreeSet<RoleName>,
    ) -> BTreeSet<RoleName> {
        let mut owners: BTreeSet<RoleName> = roles
            .iter()
            .filter(|role| self.workspace_by_role.get(*role) == Some(label))
            .cloned()
            .collect();
        owners.extend(
            self.extra_workspaces()
                .filter(|(_, extra)| *extra == label)
                .map(|(role, _)| role.clone()),
        );
        owners
    }

    /// Returns every label the policy curates: mapped, extra and hierarchy roots.
    #[must_use]
    pub fn managed_labels(&self) -> BTreeSet<WorkspaceLabel> {
        let mut labels: BTreeSet<WorkspaceLabel> =
            self.workspace_by_role.values().cloned().collect();
        labels.extend(self.hierarchy_roots.iter().cloned());
        labels.extend(
            self.extra_workspaces_by_role
                .values()
                .flat_map(|extras| extras.iter().cloned()),
        );
        labels
    }

    /// Returns the labels whose global hidden flag is cleared every cycle.
    #[must_use]
    pub fn hidden_flag_labels(&self) -> BTreeSet<WorkspaceLabel> {
        self.workspace_by_role
            .values()
            .filter(|label| *label != &self.home_label)
            .cloned()
            .collect()
    }

    /// Returns the role list a granted workspace carries: `roles` plus the
    /// always-allowed roles.
    #[must_use]
    pub fn granted(&self, mut roles: BTreeSet<RoleName>) -> BTreeSet<RoleName> {
        roles.extend(self.always_allowed_roles.iter().cloned());
        roles
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        defaults::built_in()
    }
}
