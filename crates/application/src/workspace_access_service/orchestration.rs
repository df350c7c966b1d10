use super::*;

impl WorkspaceAccessService {
    /// Reconciles all access state of one company with its latest approved
    /// onboarding selection.
    ///
    /// A missing record or a selection that maps to no role is a no-op;
    /// existing access is left alone rather than wiped.
    pub async fn assign_roles_for_company(
        &self,
        company: &CompanyName,
    ) -> AppResult<AccessSyncOutcome> {
        let Some(record) = self
            .selection_repository
            .latest_approved_selection(company)
            .await?
            .filter(SelectionRecord::is_approved)
        else {
            info!(company = %company, "no approved onboarding selection; skipping access sync");
            return Ok(AccessSyncOutcome::Skipped(SkipReason::NoApprovedSelection));
        };

        let selected = self.policy.derive_roles(record.selections());
        if selected.is_empty() {
            info!(company = %company, "onboarding selection maps to no role; skipping access sync");
            return Ok(AccessSyncOutcome::Skipped(SkipReason::EmptySelection));
        }

        let universe = self.policy.role_universe();
        let mut report = AccessSyncReport::new(selected.clone());

        self.provision_roles(&universe, &mut report).await?;
        let plan = self
            .reconcile_workspaces(&universe, &selected, &mut report)
            .await?;

        let users = self.user_repository.list_enabled_users(company).await?;
        self.cleanup_private_pages(&users, &selected, &mut report)
            .await?;
        self.grant_read_permissions(&selected, &mut report).await;

        let modules = self.resolve_modules(&selected, plan.workspaces());
        for user in users {
            self.apply_user_access(user, &selected, &modules, &mut report)
                .await;
        }

        info!(
            company = %company,
            selected_roles = report.selected_roles.len(),
            roles_created = report.roles_created.len(),
            workspaces_updated = report.workspaces_updated.len(),
            private_pages_deleted = report.private_pages_deleted.len(),
            permissions_created = report.permissions_created.len(),
            users_updated = report.users_updated.len(),
            failures = report.failures.len(),
            "access sync applied"
        );

        Ok(AccessSyncOutcome::Applied(report))
    }

    /// Lifecycle hook for an onboarding record reaching `Approved`.
    ///
    /// Never fails; sync errors are logged so the approval itself stands.
    pub async fn on_selection_approved(&self, record: &SelectionRecord) {
        if !record.is_approved() {
            debug!(
                company = %record.company_name(),
                status = record.status().as_str(),
                "onboarding record not approved; access sync not triggered"
            );
            return;
        }

        if let Err(error) = self.assign_roles_for_company(record.company_name()).await {
            error!(
                company = %record.company_name(),
                error = %error,
                "access sync after onboarding approval failed"
            );
        }
    }

    /// Lifecycle hook for a user created under a company.
    ///
    /// Never fails; sync errors are logged so user creation itself stands.
    pub async fn on_user_created(&self, user: &UserRecord) {
        if let Err(error) = self.assign_roles_for_company(user.company()).await {
            error!(
                company = %user.company(),
                user = %user.name(),
                error = %error,
                "access sync after user creation failed"
            );
        }
    }

    /// Re-stamps the base state of every managed workspace.
    ///
    /// Treats the whole role universe as selected: provisions every role,
    /// runs the visibility cycle and grants read permissions to every role.
    /// Users are not touched.
    pub async fn resync_all_workspaces(&self) -> AppResult<AccessSyncReport> {
        let universe = self.policy.role_universe();
        let mut report = AccessSyncReport::new(universe.clone());

        self.provision_roles(&universe, &mut report).await?;
        self.reconcile_workspaces(&universe, &universe, &mut report)
            .await?;
        self.grant_read_permissions(&universe, &mut report).await;

        info!(
            roles_created = report.roles_created.len(),
            workspaces_updated = report.workspaces_updated.len(),
            permissions_created = report.permissions_created.len(),
            failures = report.failures.len(),
            "workspace resync finished"
        );

        Ok(report)
    }

    /// Runs [`Self::assign_roles_for_company`] for every company with an
    /// approved selection, in company-name order.
    ///
    /// A company whose cycle fails is reported as [`AccessSyncOutcome::Failed`]
    /// and the remaining companies still run.
    pub async fn resync_all_companies(&self) -> AppResult<Vec<(CompanyName, AccessSyncOutcome)>> {
        let companies: BTreeSet<CompanyName> = self
            .selection_repository
            .list_companies_with_approved_selection()
            .await?
            .into_iter()
            .collect();

        let mut outcomes = Vec::with_capacity(companies.len());
        for company in companies {
            let outcome = match self.assign_roles_for_company(&company).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(company = %company, error = %error, "company access sync failed");
                    AccessSyncOutcome::Failed(error.to_string())
                }
            };
            outcomes.push((company, outcome));
        }

        Ok(outcomes)
    }
}
