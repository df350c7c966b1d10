use super::*;

impl WorkspaceAccessService {
    /// Runs the visibility cycle over all public workspaces and saves the
    /// workspaces whose state changed.
    ///
    /// `universe` drives role ownership and `selected` drives hierarchy
    /// placement. Returns the plan so callers can read the final state
    /// without reloading it.
    pub async fn reconcile_workspaces(
        &self,
        universe: &BTreeSet<RoleName>,
        selected: &BTreeSet<RoleName>,
        report: &mut AccessSyncReport,
    ) -> AppResult<VisibilityPlan> {
        let stored = self.workspace_repository.list_public_workspaces().await?;
        let mut plan = VisibilityPlan::new(stored);
        plan.apply_cycle(&self.policy, universe, selected);

        for workspace in plan.changes() {
            match self
                .workspace_repository
                .save_workspace(workspace.clone())
                .await
            {
                Ok(()) => {
                    debug!(
                        workspace = %workspace.name(),
                        roles = workspace.roles().len(),
                        locked = workspace.is_locked(),
                        hidden = workspace.is_hidden(),
                        "saved workspace visibility"
                    );
                    report.workspaces_updated.push(workspace.name().clone());
                }
                Err(error) => {
                    warn!(
                        workspace = %workspace.name(),
                        error = %error,
                        "failed to save workspace visibility"
                    );
                    report.record_failure(SyncStage::Workspaces, workspace.name(), &error);
                }
            }
        }

        Ok(plan)
    }

    /// Deletes private pages of `users` that expose hierarchy content
    /// outside `selected`.
    ///
    /// Private pages are visible to their owner whatever the role list says,
    /// so removal is the only way to withdraw them.
    pub async fn cleanup_private_pages(
        &self,
        users: &[UserRecord],
        selected: &BTreeSet<RoleName>,
        report: &mut AccessSyncReport,
    ) -> AppResult<()> {
        for user in users {
            let pages = self
                .workspace_repository
                .list_private_workspaces(user.name())
                .await?;

            for page in private_pages_to_remove(&self.policy, selected, &pages) {
                match self.workspace_repository.delete_workspace(page.name()).await {
                    Ok(()) => {
                        info!(
                            user = %user.name(),
                            workspace = %page.name(),
                            "deleted private page outside selection"
                        );
                        report.private_pages_deleted.push(page.name().clone());
                    }
                    Err(error) => {
                        warn!(
                            user = %user.name(),
                            workspace = %page.name(),
                            error = %error,
                            "failed to delete private page"
                        );
                        report.record_failure(SyncStage::PrivatePages, page.name(), &error);
                    }
                }
            }
        }

        Ok(())
    }
}
