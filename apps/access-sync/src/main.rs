//! Climoro workspace access reconciliation runner.

#![forbid(unsafe_code)]

mod config;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use climoro_application::{AccessSyncOutcome, AccessSyncReport, WorkspaceAccessService};
use climoro_core::{AppError, AppResult};
use climoro_domain::{AccessPolicy, CompanyName, RoleName, WorkspaceLabel};
use climoro_infrastructure::{
    InMemoryAccessStore, load_access_policy, read_site_snapshot, write_access_policy,
    write_site_snapshot,
};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{SyncConfig, SyncMode};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = SyncConfig::load()?;
    let policy = load_access_policy(config.policy_path.as_deref()).await?;

    info!(
        mode = config.mode.as_str(),
        policy_version = policy.version(),
        managed_roles = policy.role_universe().len(),
        dry_run = config.dry_run,
        "climoro-access-sync started"
    );

    match &config.mode {
        SyncMode::Validate => validate_policy(&policy),
        SyncMode::Show => {
            show_policy(&policy);
            Ok(())
        }
        SyncMode::AddMapping(_) | SyncMode::AddRole { .. } => edit_policy(&config, policy).await,
        SyncMode::Company(_) | SyncMode::All | SyncMode::Workspaces => {
            sync_site(&config, policy).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn build_access_service(
    policy: AccessPolicy,
    store: Arc<InMemoryAccessStore>,
) -> WorkspaceAccessService {
    WorkspaceAccessService::new(
        Arc::new(policy),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
    )
}

async fn open_store(path: &Path) -> AppResult<Arc<InMemoryAccessStore>> {
    let snapshot = read_site_snapshot(path).await?;
    Ok(Arc::new(InMemoryAccessStore::from_snapshot(snapshot)?))
}

async fn save_store(
    config: &SyncConfig,
    path: &Path,
    store: &InMemoryAccessStore,
) -> AppResult<()> {
    if config.dry_run {
        info!(path = %path.display(), "dry run, site snapshot left unchanged");
        return Ok(());
    }

    write_site_snapshot(path, &store.snapshot().await).await?;
    info!(path = %path.display(), "site snapshot written");
    Ok(())
}

fn validate_policy(policy: &AccessPolicy) -> AppResult<()> {
    let report = policy.validate();
    if !report.is_valid() {
        return Err(AppError::Validation(format!(
            "access policy is inconsistent: {}",
            report.errors.join("; ")
        )));
    }

    info!(
        warnings = report.warnings.len(),
        hierarchy_roles = report.summary.total_roles,
        form_mappings = report.summary.total_form_mappings,
        workspace_mappings = report.summary.total_workspace_mappings,
        module_mappings = report.summary.total_module_mappings,
        "access policy is valid"
    );
    Ok(())
}

fn show_policy(policy: &AccessPolicy) {
    for (key, role) in policy.role_mappings() {
        let modules: Vec<&str> = policy
            .module_mappings()
            .get(role)
            .into_iter()
            .flatten()
            .map(|module| module.as_str())
            .collect();
        info!(
            field = key.as_str(),
            role = %role,
            workspace = policy.workspace_for_role(role).map_or("-", WorkspaceLabel::as_str),
            modules = %modules.join(", "),
            "scope mapping"
        );
    }

    for (role, label) in policy.extra_workspaces() {
        info!(role = %role, workspace = %label, "extra workspace");
    }

    for (role, profile) in policy.role_hierarchy() {
        info!(
            role = %role,
            level = profile.level,
            description = %profile.description,
            can_manage_users = profile.can_manage_users,
            default_scopes = %profile.default_scopes.join(", "),
            "hierarchy role"
        );
    }
}

async fn edit_policy(config: &SyncConfig, mut policy: AccessPolicy) -> AppResult<()> {
    let policy_path = config.policy_path.as_deref().ok_or_else(|| {
        AppError::Validation("CLIMORO_ACCESS_POLICY is required to edit the policy".to_owned())
    })?;

    let role = match &config.mode {
        SyncMode::AddMapping(mapping) => {
            let previous = policy.add_scope_mapping(mapping.clone());
            info!(
                field = mapping.key.as_str(),
                role = %mapping.role,
                workspace = %mapping.workspace,
                modules = mapping.modules.len(),
                previous_role = previous.as_ref().map_or("-", RoleName::as_str),
                "scope mapping added"
            );
            mapping.role.clone()
        }
        SyncMode::AddRole { role, profile } => {
            let replaced = policy.add_role_profile(role.clone(), profile.clone());
            info!(
                role = %role,
                level = profile.level,
                replaced = replaced.is_some(),
                "hierarchy role added"
            );
            role.clone()
        }
        _ => return Ok(()),
    };

    validate_policy(&policy)?;
    if config.dry_run {
        info!(path = %policy_path.display(), "dry run, access policy left unchanged");
    } else {
        write_access_policy(policy_path, &policy).await?;
        info!(path = %policy_path.display(), "access policy written");
    }

    let Some(snapshot_path) = config.snapshot_path.as_deref() else {
        return Ok(());
    };
    let store = open_store(snapshot_path).await?;
    let service = build_access_service(policy, store.clone());
    let roles = BTreeSet::from([role]);
    let mut report = AccessSyncReport::new(roles.clone());
    service.provision_roles(&roles, &mut report).await?;
    info!(roles_created = report.roles_created.len(), "site roles provisioned");

    save_store(config, snapshot_path, &store).await
}

async fn sync_site(config: &SyncConfig, policy: AccessPolicy) -> AppResult<()> {
    let snapshot_path = config.snapshot_path()?;
    let store = open_store(snapshot_path).await?;
    let service = build_access_service(policy, store.clone());

    let failed_companies = run_mode(&service, &config.mode).await?;
    save_store(config, snapshot_path, &store).await?;

    if failed_companies > 0 {
        return Err(AppError::Internal(format!(
            "access sync failed for {failed_companies} companies"
        )));
    }

    Ok(())
}

async fn run_mode(service: &WorkspaceAccessService, mode: &SyncMode) -> AppResult<usize> {
    match mode {
        SyncMode::Company(company) => {
            let outcome = service.assign_roles_for_company(company).await?;
            log_outcome(company, &outcome);
            Ok(0)
        }
        SyncMode::All => {
            let outcomes = service.resync_all_companies().await?;
            let mut failed = 0;
            for (company, outcome) in &outcomes {
                log_outcome(company, outcome);
                if matches!(outcome, AccessSyncOutcome::Failed(_)) {
                    failed += 1;
                }
            }
            info!(
                companies = outcomes.len(),
                failed,
                "company access resync finished"
            );
            Ok(failed)
        }
        SyncMode::Workspaces => {
            let report = service.resync_all_workspaces().await?;
            log_report("workspace base state resynced", None, &report);
            Ok(0)
        }
        _ => Ok(0),
    }
}

fn log_outcome(company: &CompanyName, outcome: &AccessSyncOutcome) {
    match outcome {
        AccessSyncOutcome::Skipped(reason) => {
            info!(company = %company, reason = reason.as_str(), "access sync skipped");
        }
        AccessSyncOutcome::Applied(report) => {
            log_report("access sync applied", Some(company), report);
        }
        AccessSyncOutcome::Failed(message) => {
            error!(company = %company, error = %message, "access sync failed");
        }
    }
}

fn log_report(message: &str, company: Option<&CompanyName>, report: &AccessSyncReport) {
    let company = company.map(CompanyName::as_str).unwrap_or("*");
    info!(
        company = company,
        selected_roles = report.selected_roles.len(),
        roles_created = report.roles_created.len(),
        workspaces_updated = report.workspaces_updated.len(),
        private_pages_deleted = report.private_pages_deleted.len(),
        permissions_created = report.permissions_created.len(),
        users_updated = report.users_updated.len(),
        role_assignments_added = report.role_assignments_added,
        role_assignments_revoked = report.role_assignments_revoked,
        modules_unblocked = report.modules_unblocked,
        "{message}"
    );

    for failure in &report.failures {
        warn!(
            company = company,
            stage = %failure.stage,
            subject = %failure.subject,
            error = %failure.message,
            "access sync item failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use climoro_core::AppError;
    use climoro_domain::{AccessPolicy, CompanyName, RoleName, RoleProfile};
    use climoro_infrastructure::{InMemoryAccessStore, SiteSnapshot};

    use super::{build_access_service, run_mode, validate_policy};
    use crate::config::SyncMode;

    #[test]
    fn validate_mode_fails_on_policy_errors() {
        assert!(validate_policy(&AccessPolicy::default()).is_ok());

        let broken = AccessPolicy::default().with_role_profile(
            RoleName::from_static("Auditor"),
            RoleProfile::new(0, "Read-only auditor", false),
        );

        assert!(matches!(
            validate_policy(&broken),
            Err(AppError::Validation(message)) if message.contains("Auditor")
        ));
    }

    #[tokio::test]
    async fn single_company_run_reports_no_failed_companies() {
        let store = Arc::new(
            InMemoryAccessStore::from_snapshot(SiteSnapshot::default())
                .unwrap_or_else(|_| unreachable!()),
        );
        let service = build_access_service(AccessPolicy::default(), store);
        let mode = SyncMode::Company(CompanyName::from_static("Acme"));

        assert!(matches!(run_mode(&service, &mode).await, Ok(0)));
    }
}
