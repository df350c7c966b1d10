use super::*;

impl WorkspaceAccessService {
    /// Creates every role in `roles` that does not exist yet, with desk access.
    ///
    /// Store errors abort the cycle: later passes attach these roles to
    /// workspaces and users.
    pub async fn provision_roles(
        &self,
        roles: &BTreeSet<RoleName>,
        report: &mut AccessSyncReport,
    ) -> AppResult<()> {
        for role in roles {
            if self.role_repository.role_exists(role).await? {
                continue;
            }

            self.role_repository
                .create_role(RoleDefinition::with_desk_access(role.clone()))
                .await?;
            debug!(role = %role, "created access role");
            report.roles_created.push(role.clone());
        }

        Ok(())
    }

    /// Ensures each role in `roles`, and every always-allowed role, can read
    /// every reference doctype.
    ///
    /// Additive only; existing entries are never changed or removed. Roles
    /// missing from the store are skipped. A failing entry is recorded and
    /// the remaining entries are still tried.
    pub async fn grant_read_permissions(
        &self,
        roles: &BTreeSet<RoleName>,
        report: &mut AccessSyncReport,
    ) {
        let mut grantees = roles.clone();
        grantees.extend(self.policy.always_allowed_roles().iter().cloned());

        for role in &grantees {
            match self.role_repository.role_exists(role).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(role = %role, "role does not exist; read grants skipped");
                    continue;
                }
                Err(error) => {
                    warn!(role = %role, error = %error, "failed to look up role");
                    report.record_failure(SyncStage::ReadPermissions, role, &error);
                    continue;
                }
            }

            for doctype in self.policy.readonly_doctypes() {
                let permission = DocPermission::read_only(doctype.clone(), role.clone());
                let result = match self
                    .permission_repository
                    .permission_exists(doctype, role, permission.permlevel)
                    .await
                {
                    Ok(true) => continue,
                    Ok(false) => self.permission_repository.create_permission(permission).await,
                    Err(error) => Err(error),
                };

                match result {
                    Ok(()) => {
                        debug!(doctype = %doctype, role = %role, "granted read permission");
                        report
                            .permissions_created
                            .push((doctype.clone(), role.clone()));
                    }
                    Err(error) => {
                        warn!(
                            doctype = %doctype,
                            role = %role,
                            error = %error,
                            "failed to grant read permission"
                        );
                        report.record_failure(
                            SyncStage::ReadPermissions,
                            format!("{doctype}/{role}"),
                            &error,
                        );
                    }
                }
            }
        }
    }
}
