use std::collections::{BTreeMap, BTreeSet};

use crate::{RoleName, WorkspaceLabel};

use super::{AccessPolicy, PolicySummary};

/// Findings from checking an access policy for consistency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyValidationReport {
    /// Problems that make reconciliation ambiguous or wrong.
    pub errors: Vec<String>,
    /// Suspicious entries that reconciliation tolerates.
    pub warnings: Vec<String>,
    /// Sizes of the checked tables.
    pub summary: PolicySummary,
}

impl PolicyValidationReport {
    /// Returns whether no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl AccessPolicy {
    /// Checks the policy tables against each other.
    #[must_use]
    pub fn validate(&self) -> PolicyValidationReport {
        let mut report = PolicyValidationReport {
            summary: self.summary(),
            ..PolicyValidationReport::default()
        };
        let universe = self.role_universe();
        let known = |role: &RoleName| {
            universe.contains(role) || self.always_allowed_roles.contains(role)
        };

        for (key, role) in &self.roles_by_selection {
            if !self.workspace_by_role.contains_key(role) {
                report.errors.push(format!(
                    "role '{role}' (from selection '{}') has no workspace mapping",
                    key.as_str()
                ));
            }
        }

        let mut owners: BTreeMap<&WorkspaceLabel, BTreeSet<&RoleName>> = BTreeMap::new();
        for (role, label) in &self.workspace_by_role {
            owners.entry(label).or_default().insert(role);
        }
        for (label, roles) in owners.iter().filter(|(_, roles)| roles.len() > 1) {
            let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
            report.errors.push(format!(
                "workspace '{label}' is mapped by several roles: {}",
                names.join(", ")
            ));
        }

        for branch in &self.branches {
            if self.workspace_by_role.get(&branch.role) != Some(&branch.label) {
                report.errors.push(format!(
                    "branch '{}' is not the workspace mapped to its role '{}'",
                    branch.label, branch.role
                ));
            }
        }

        for role in self.workspace_by_role.keys().filter(|role| !known(*role)) {
            report
                .warnings
                .push(format!("workspace mapping references unknown role '{role}'"));
        }
        for role in self.modules_by_role.keys().filter(|role| !known(*role)) {
            report
                .warnings
                .push(format!("module mapping references unknown role '{role}'"));
        }
        for role in self.extra_workspaces_by_role.keys().filter(|role| !known(*role)) {
            report
                .warnings
                .push(format!("extra workspace mapping references unknown role '{role}'"));
        }

        for (role, profile) in &self.user_role_hierarchy {
            if profile.level == 0 {
                report
                    .errors
                    .push(format!("hierarchy role '{role}' has level 0; levels start at 1"));
            }
            if universe.contains(role) {
                report.warnings.push(format!(
                    "hierarchy role '{role}' is also derived from onboarding selections"
                ));
            }
        }

        if self.managed_labels().contains(&self.home_label) {
            report.warnings.push(format!(
                "home workspace '{}' is also a managed label and will stay hidden",
                self.home_label
            ));
        }

        report
    }
}
