//! User records as seen by access reconciliation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{CompanyName, ModuleName, RoleName, UserId};

/// User account with its role list and module block-list.
///
/// Identity fields are owned by user management; reconciliation only touches
/// `roles` and `blocked_modules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    name: UserId,
    company: CompanyName,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    roles: Vec<RoleName>,
    #[serde(default)]
    blocked_modules: Vec<ModuleName>,
}

fn enabled_by_default() -> bool {
    true
}

/// Scope-role changes applied to one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    /// Roles appended to the user.
    pub added: BTreeSet<RoleName>,
    /// Roles removed from the user.
    pub removed: BTreeSet<RoleName>,
}

impl RoleDelta {
    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl UserRecord {
    /// Creates an enabled user without roles or blocked modules.
    #[must_use]
    pub fn new(name: UserId, company: CompanyName) -> Self {
        Self {
            name,
            company,
            enabled: true,
            roles: Vec::new(),
            blocked_modules: Vec::new(),
        }
    }

    /// Returns a copy with the given roles.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleName>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Returns a copy with the given blocked modules.
    #[must_use]
    pub fn with_blocked_modules(mut self, modules: impl IntoIterator<Item = ModuleName>) -> Self {
        self.blocked_modules = modules.into_iter().collect();
        self
    }

    /// Returns a copy with the given enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the user key.
    #[must_use]
    pub fn name(&self) -> &UserId {
        &self.name
    }

    /// Returns the owning company.
    #[must_use]
    pub fn company(&self) -> &CompanyName {
        &self.company
    }

    /// Returns whether the account is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns assigned roles in stored order.
    #[must_use]
    pub fn roles(&self) -> &[RoleName] {
        &self.roles
    }

    /// Returns blocked modules in stored order.
    #[must_use]
    pub fn blocked_modules(&self) -> &[ModuleName] {
        &self.blocked_modules
    }

    /// Returns whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }

    /// Returns the assigned roles as a set.
    #[must_use]
    pub fn role_set(&self) -> BTreeSet<RoleName> {
        self.roles.iter().cloned().collect()
    }

    /// Makes the managed roles held by this user equal `desired`.
    ///
    /// Only roles inside `managed` are ever removed. Roles outside it keep
    /// their position. Removals happen before additions and additions are
    /// appended in name order.
    pub fn reconcile_scope_roles(
        &mut self,
        managed: &BTreeSet<RoleName>,
        desired: &BTreeSet<RoleName>,
    ) -> RoleDelta {
        let current: BTreeSet<RoleName> = self
            .roles
            .iter()
            .filter(|role| managed.contains(*role))
            .cloned()
            .collect();

        let removed: BTreeSet<RoleName> = current.difference(desired).cloned().collect();
        if !removed.is_empty() {
            self.roles.retain(|role| !removed.contains(role));
        }

        let held = self.role_set();
        let added: BTreeSet<RoleName> = desired.difference(&held).cloned().collect();
        self.roles.extend(added.iter().cloned());

        RoleDelta { added, removed }
    }

    /// Removes every module in `modules` from the block-list and returns the
    /// modules that were actually unblocked. Other blocked modules stay.
    pub fn unblock_modules(&mut self, modules: &BTreeSet<ModuleName>) -> BTreeSet<ModuleName> {
        let unblocked: BTreeSet<ModuleName> = self
            .blocked_modules
            .iter()
            .filter(|module| modules.contains(*module))
            .cloned()
            .collect();
        if !unblocked.is_empty() {
            self.blocked_modules
                .retain(|module| !modules.contains(module));
        }
        unblocked
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::UserRecord;
    use crate::{CompanyName, ModuleName, RoleName, UserId};

    fn role(value: &str) -> RoleName {
        RoleName::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn module(value: &str) -> ModuleName {
        ModuleName::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn user() -> UserRecord {
        UserRecord::new(
            UserId::new("ops@acme.test").unwrap_or_else(|_| unreachable!()),
            CompanyName::new("Acme").unwrap_or_else(|_| unreachable!()),
        )
    }

    #[test]
    fn reconcile_revokes_obsolete_and_keeps_foreign_roles() {
        let managed: BTreeSet<RoleName> =
            [role("Scope 1 Access"), role("Scope 2 Access")].into();
        let desired: BTreeSet<RoleName> = [role("Scope 2 Access")].into();
        let mut user = user().with_roles([role("Super Admin"), role("Scope 1 Access")]);

        let delta = user.reconcile_scope_roles(&managed, &desired);

        assert_eq!(delta.removed, [role("Scope 1 Access")].into());
        assert_eq!(delta.added, [role("Scope 2 Access")].into());
        assert_eq!(user.roles(), &[role("Super Admin"), role("Scope 2 Access")]);
    }

    #[test]
    fn reconcile_is_a_no_op_when_already_converged() {
        let managed: BTreeSet<RoleName> = [role("Scope 1 Access")].into();
        let desired = managed.clone();
        let mut user = user().with_roles([role("Scope 1 Access")]);

        assert!(user.reconcile_scope_roles(&managed, &desired).is_empty());
    }

    #[test]
    fn unblock_only_lifts_requested_modules() {
        let mut user = user().with_blocked_modules([module("Scope 1"), module("HR")]);

        let unblocked = user.unblock_modules(&[module("Scope 1"), module("Setup")].into());

        assert_eq!(unblocked, [module("Scope 1")].into());
        assert_eq!(user.blocked_modules(), &[module("HR")]);
    }
}
