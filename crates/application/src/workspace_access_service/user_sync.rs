use super::*;

impl WorkspaceAccessService {
    /// Makes the scope roles held by `user` equal `selected`.
    ///
    /// Roles outside the policy's role universe are never touched.
    pub fn sync_user_scope_roles(
        &self,
        user: &mut UserRecord,
        selected: &BTreeSet<RoleName>,
    ) -> RoleDelta {
        user.reconcile_scope_roles(&self.policy.role_universe(), selected)
    }

    /// Lifts the blocks on `modules` for `user` and returns the lifted ones.
    pub fn unblock_modules_for_user(
        &self,
        user: &mut UserRecord,
        modules: &BTreeSet<ModuleName>,
    ) -> BTreeSet<ModuleName> {
        user.unblock_modules(modules)
    }

    /// Resolves the modules a selected role set unlocks.
    ///
    /// Configured module mappings are joined with the module tag of each
    /// selected role's mapped public workspace, so a workspace moved to
    /// another module still opens for its role.
    pub fn resolve_modules<'a>(
        &self,
        selected: &BTreeSet<RoleName>,
        workspaces: impl IntoIterator<Item = &'a WorkspaceRecord>,
    ) -> BTreeSet<ModuleName> {
        let mut modules = self.policy.modules_for_roles(selected);
        let mapped_labels: BTreeSet<_> = selected
            .iter()
            .filter_map(|role| self.policy.workspace_for_role(role))
            .collect();

        modules.extend(
            workspaces
                .into_iter()
                .filter(|workspace| {
                    workspace.is_public() && mapped_labels.contains(workspace.label())
                })
                .filter_map(|workspace| workspace.module().cloned()),
        );
        modules
    }

    pub(super) async fn apply_user_access(
        &self,
        mut user: UserRecord,
        selected: &BTreeSet<RoleName>,
        modules: &BTreeSet<ModuleName>,
        report: &mut AccessSyncReport,
    ) {
        let delta = self.sync_user_scope_roles(&mut user, selected);
        let unblocked = self.unblock_modules_for_user(&mut user, modules);
        if delta.is_empty() && unblocked.is_empty() {
            return;
        }

        let name = user.name().clone();
        match self.user_repository.save_user(user).await {
            Ok(()) => {
                debug!(
                    user = %name,
                    added = delta.added.len(),
                    revoked = delta.removed.len(),
                    unblocked = unblocked.len(),
                    "updated user access"
                );
                report.role_assignments_added += delta.added.len();
                report.role_assignments_revoked += delta.removed.len();
                report.modules_unblocked += unblocked.len();
                report.users_updated.push(name);
            }
            Err(error) => {
                warn!(user = %name, error = %error, "failed to save user access");
                report.record_failure(SyncStage::Users, &name, &error);
            }
        }
    }
}
