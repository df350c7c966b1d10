use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{ModuleName, RoleName, SelectionKey, WorkspaceLabel};

use super::AccessPolicy;

/// Administrative role listed in the user role hierarchy.
///
/// Hierarchy roles are not derived from onboarding selections; they are
/// catalogued so operators can see and extend them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    /// Rank in the hierarchy, 1 being the highest.
    pub level: u32,
    /// Human readable purpose of the role.
    pub description: String,
    /// Whether holders may manage other users of their company.
    pub can_manage_users: bool,
    /// Scopes granted to holders by default; `all` means every scope.
    pub default_scopes: Vec<String>,
}

impl RoleProfile {
    /// Creates a profile without default scopes.
    #[must_use]
    pub fn new(level: u32, description: impl Into<String>, can_manage_users: bool) -> Self {
        Self {
            level,
            description: description.into(),
            can_manage_users,
            default_scopes: Vec::new(),
        }
    }

    /// Replaces the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.default_scopes = scopes.into_iter().collect();
        self
    }
}

/// One checkbox wired to a role, its workspace and the modules it unblocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeMapping {
    /// Onboarding checkbox that triggers the role.
    pub key: SelectionKey,
    /// Role assigned when the checkbox is ticked.
    pub role: RoleName,
    /// Workspace gated by the role.
    pub workspace: WorkspaceLabel,
    /// Modules unblocked by the role; empty keeps the existing entry.
    pub modules: BTreeSet<ModuleName>,
}

/// Table sizes of a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicySummary {
    /// Roles in the user role hierarchy.
    pub total_roles: usize,
    /// Checkbox to role mappings.
    pub total_form_mappings: usize,
    /// Role to workspace mappings.
    pub total_workspace_mappings: usize,
    /// Roles with module mappings.
    pub total_module_mappings: usize,
}

impl AccessPolicy {
    /// Wires a checkbox to a role and the role to its workspace.
    ///
    /// Replaces whatever the checkbox and role mapped to before and returns
    /// the role the checkbox previously produced. Modules replace the role's
    /// module entry only when some are given. Callers validate the result
    /// before persisting it.
    pub fn add_scope_mapping(&mut self, mapping: ScopeMapping) -> Option<RoleName> {
        let ScopeMapping {
            key,
            role,
            workspace,
            modules,
        } = mapping;

        let previous = self.roles_by_selection.insert(key, role.clone());
        if !modules.is_empty() {
            self.modules_by_role.insert(role.clone(), modules);
        }
        self.workspace_by_role.insert(role, workspace);
        previous
    }

    /// Adds or replaces a hierarchy role, returning the replaced profile.
    pub fn add_role_profile(
        &mut self,
        role: RoleName,
        profile: RoleProfile,
    ) -> Option<RoleProfile> {
        self.user_role_hierarchy.insert(role, profile)
    }

    /// Builder form of [`AccessPolicy::add_role_profile`].
    #[must_use]
    pub fn with_role_profile(mut self, role: RoleName, profile: RoleProfile) -> Self {
        self.add_role_profile(role, profile);
        self
    }

    /// Returns the user role hierarchy.
    #[must_use]
    pub fn role_hierarchy(&self) -> &BTreeMap<RoleName, RoleProfile> {
        &self.user_role_hierarchy
    }

    /// Returns the checkbox to role table.
    #[must_use]
    pub fn role_mappings(&self) -> &BTreeMap<SelectionKey, RoleName> {
        &self.roles_by_selection
    }

    /// Returns the role to workspace table.
    #[must_use]
    pub fn workspace_mappings(&self) -> &BTreeMap<RoleName, WorkspaceLabel> {
        &self.workspace_by_role
    }

    /// Returns the role to modules table.
    #[must_use]
    pub fn module_mappings(&self) -> &BTreeMap<RoleName, BTreeSet<ModuleName>> {
        &self.modules_by_role
    }

    /// Counts the entries of the editable tables.
    #[must_use]
    pub fn summary(&self) -> PolicySummary {
        PolicySummary {
            total_roles: self.user_role_hierarchy.len(),
            total_form_mappings: self.roles_by_selection.len(),
            total_workspace_mappings: self.workspace_by_role.len(),
            total_module_mappings: self.modules_by_role.len(),
        }
    }
}
