//! Workspace pages and their visibility state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ModuleName, RoleName, UserId, UserRecord, WorkspaceLabel, WorkspaceName};

/// Navigable workspace page.
///
/// Visibility is decided by three pieces of state: the global `is_hidden`
/// flag, the `locked` flag, and the role list. A locked workspace carries no
/// roles and is shown to nobody. An unlocked workspace with an empty role
/// list is shown to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    name: WorkspaceName,
    label: WorkspaceLabel,
    #[serde(default)]
    parent_page: Option<WorkspaceLabel>,
    #[serde(default)]
    module: Option<ModuleName>,
    public: bool,
    #[serde(default)]
    for_user: Option<UserId>,
    #[serde(default)]
    roles: BTreeSet<RoleName>,
    #[serde(default)]
    is_hidden: bool,
    #[serde(default)]
    locked: bool,
}

impl WorkspaceRecord {
    /// Creates a public workspace without roles.
    #[must_use]
    pub fn public(name: WorkspaceName, label: WorkspaceLabel) -> Self {
        Self {
            name,
            label,
            parent_page: None,
            module: None,
            public: true,
            for_user: None,
            roles: BTreeSet::new(),
            is_hidden: false,
            locked: false,
        }
    }

    /// Creates a private workspace owned by `owner`.
    #[must_use]
    pub fn private(name: WorkspaceName, label: WorkspaceLabel, owner: UserId) -> Self {
        Self {
            public: false,
            for_user: Some(owner),
            ..Self::public(name, label)
        }
    }

    /// Returns a copy placed under `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: WorkspaceLabel) -> Self {
        self.parent_page = Some(parent);
        self
    }

    /// Returns a copy tagged with `module`.
    #[must_use]
    pub fn with_module(mut self, module: ModuleName) -> Self {
        self.module = Some(module);
        self
    }

    /// Returns a copy with the given role list.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleName>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Returns a copy with the given global hidden flag.
    #[must_use]
    pub fn with_hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = is_hidden;
        self
    }

    /// Returns the storage key.
    #[must_use]
    pub fn name(&self) -> &WorkspaceName {
        &self.name
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &WorkspaceLabel {
        &self.label
    }

    /// Returns the parent page label, if any.
    #[must_use]
    pub fn parent_page(&self) -> Option<&WorkspaceLabel> {
        self.parent_page.as_ref()
    }

    /// Returns the module tag, if any.
    #[must_use]
    pub fn module(&self) -> Option<&ModuleName> {
        self.module.as_ref()
    }

    /// Returns whether the workspace is shared with all users.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Returns the owner of a private workspace.
    #[must_use]
    pub fn for_user(&self) -> Option<&UserId> {
        self.for_user.as_ref()
    }

    /// Returns the gating roles.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<RoleName> {
        &self.roles
    }

    /// Returns the global hidden flag.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Returns whether the workspace is locked away from every user.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Replaces the role list and unlocks the workspace.
    pub fn grant(&mut self, roles: BTreeSet<RoleName>) {
        self.roles = roles;
        self.locked = false;
    }

    /// Clears the role list and locks the workspace.
    pub fn lock(&mut self) {
        self.roles.clear();
        self.locked = true;
    }

    /// Clears the role list and sets the global hidden flag.
    pub fn hide_globally(&mut self) {
        self.roles.clear();
        self.is_hidden = true;
    }

    /// Clears the global hidden flag.
    pub fn reveal(&mut self) {
        self.is_hidden = false;
    }

    /// Returns whether `user` can see this workspace.
    #[must_use]
    pub fn is_visible_to(&self, user: &UserRecord) -> bool {
        if self.is_hidden || self.locked || !user.enabled() {
            return false;
        }
        if let Some(owner) = &self.for_user {
            return owner == user.name();
        }

        self.roles.is_empty() || user.roles().iter().any(|role| self.roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::WorkspaceRecord;
    use crate::{CompanyName, RoleName, UserId, UserRecord, WorkspaceLabel, WorkspaceName};

    fn role(value: &str) -> RoleName {
        RoleName::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn workspace(label: &str) -> WorkspaceRecord {
        WorkspaceRecord::public(
            WorkspaceName::new(label).unwrap_or_else(|_| unreachable!()),
            WorkspaceLabel::new(label).unwrap_or_else(|_| unreachable!()),
        )
    }

    fn user(roles: &[&str]) -> UserRecord {
        UserRecord::new(
            UserId::new("a@acme.test").unwrap_or_else(|_| unreachable!()),
            CompanyName::new("Acme").unwrap_or_else(|_| unreachable!()),
        )
        .with_roles(roles.iter().map(|value| role(value)))
    }

    #[test]
    fn role_gated_workspace_requires_matching_role() {
        let page = workspace("Scope 1").with_roles([role("Scope 1 Access")]);

        assert!(page.is_visible_to(&user(&["Scope 1 Access"])));
        assert!(!page.is_visible_to(&user(&["Scope 2 Access"])));
    }

    #[test]
    fn locked_workspace_is_invisible_to_everyone() {
        let mut page = workspace("Legacy").with_roles([role("Scope 1 Access")]);
        page.lock();

        assert!(page.roles().is_empty());
        assert!(!page.is_visible_to(&user(&["Scope 1 Access"])));
        assert!(!page.is_visible_to(&user(&[])));
    }

    #[test]
    fn grant_unlocks_and_replaces_roles() {
        let mut page = workspace("Upstream");
        page.lock();
        page.grant([role("Scope 3 Access")].into());

        assert!(!page.is_locked());
        assert!(page.is_visible_to(&user(&["Scope 3 Access"])));
    }

    #[test]
    fn private_page_is_visible_only_to_owner() {
        let page = WorkspaceRecord::private(
            WorkspaceName::new("Notes-a").unwrap_or_else(|_| unreachable!()),
            WorkspaceLabel::new("Notes").unwrap_or_else(|_| unreachable!()),
            UserId::new("a@acme.test").unwrap_or_else(|_| unreachable!()),
        );
        let stranger = UserRecord::new(
            UserId::new("b@acme.test").unwrap_or_else(|_| unreachable!()),
            CompanyName::new("Acme").unwrap_or_else(|_| unreachable!()),
        );

        assert!(page.is_visible_to(&user(&[])));
        assert!(!page.is_visible_to(&stranger));
    }

    #[test]
    fn hidden_flag_wins_over_empty_roles() {
        let mut home = workspace("Home");
        home.hide_globally();

        assert!(!home.is_visible_to(&user(&[])));
    }
}
