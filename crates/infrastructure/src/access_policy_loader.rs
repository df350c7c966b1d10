use std::path::Path;

use climoro_core::{AppError, AppResult};
use climoro_domain::AccessPolicy;
use tracing::{debug, warn};

/// Loads the access policy from a JSON file.
///
/// Without a path the built-in policy is returned. Keys missing from the file
/// fall back to the built-in tables. An unreadable or malformed file is an
/// error, as is a policy that fails validation. Validation warnings are
/// logged here and nowhere else.
pub async fn load_access_policy(path: Option<&Path>) -> AppResult<AccessPolicy> {
    let Some(path) = path else {
        return checked(AccessPolicy::default(), "built-in");
    };

    let raw = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to read access policy '{}': {error}",
            path.display()
        ))
    })?;
    let policy: AccessPolicy = serde_json::from_str(&raw).map_err(|error| {
        AppError::Validation(format!(
            "invalid access policy '{}': {error}",
            path.display()
        ))
    })?;

    checked(policy, &path.display().to_string())
}

fn checked(policy: AccessPolicy, source: &str) -> AppResult<AccessPolicy> {
    let report = policy.validate();
    for warning in &report.warnings {
        warn!(source = source, warning = %warning, "access policy warning");
    }
    if !report.is_valid() {
        return Err(AppError::Validation(format!(
            "access policy '{source}' is inconsistent: {}",
            report.errors.join("; ")
        )));
    }

    debug!(
        source = source,
        version = policy.version(),
        roles = policy.role_universe().len(),
        "loaded access policy"
    );

    Ok(policy)
}

/// Validates a policy and writes it as pretty-printed JSON.
///
/// A policy with validation errors is refused and the file is left as it
/// was. Missing parent directories are created.
pub async fn write_access_policy(path: &Path, policy: &AccessPolicy) -> AppResult<()> {
    let report = policy.validate();
    if !report.is_valid() {
        return Err(AppError::Validation(format!(
            "refusing to write inconsistent access policy '{}': {}",
            path.display(),
            report.errors.join("; ")
        )));
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to create access policy directory '{}': {error}",
                parent.display()
            ))
        })?;
    }

    let raw = serde_json::to_string_pretty(policy).map_err(|error| {
        AppError::Internal(format!("failed to serialize access policy: {error}"))
    })?;
    tokio::fs::write(path, raw).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to write access policy '{}': {error}",
            path.display()
        ))
    })?;

    debug!(
        path = %path.display(),
        version = policy.version(),
        form_mappings = report.summary.total_form_mappings,
        hierarchy_roles = report.summary.total_roles,
        "wrote access policy"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use climoro_core::AppError;
    use climoro_domain::{
        AccessPolicy, ModuleName, RoleName, RoleProfile, ScopeMapping, SelectionKey,
        WorkspaceLabel,
    };

    use super::{load_access_policy, write_access_policy};

    async fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "climoro-policy-{}-{name}.json",
            std::process::id()
        ));
        let written = tokio::fs::write(&path, contents).await;
        assert!(written.is_ok());
        path
    }

    #[tokio::test]
    async fn missing_path_yields_built_in_policy() {
        let policy = load_access_policy(None).await;

        assert!(policy.is_ok());
        assert_eq!(
            policy.unwrap_or_else(|_| unreachable!()),
            AccessPolicy::default()
        );
    }

    #[tokio::test]
    async fn file_overrides_only_present_keys() {
        let path = write_temp(
            "override",
            r#"{ "version": 2, "always_allowed_roles": ["System Manager"] }"#,
        )
        .await;

        let policy = load_access_policy(Some(&path))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(policy.version(), 2);
        assert!(
            policy
                .always_allowed_roles()
                .contains(&RoleName::from_static("System Manager"))
        );
        assert_eq!(
            policy.role_for_selection(SelectionKey::Scope2),
            Some(&RoleName::from_static("Scope 2 Access"))
        );
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn malformed_file_is_a_validation_error() {
        let path = write_temp("malformed", r#"{ "role_mappings": [ }"#).await;

        let result = load_access_policy(Some(&path)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn inconsistent_policy_is_rejected() {
        let path = write_temp(
            "inconsistent",
            r#"{
                "role_mappings": {
                    "scopes_to_report_scope1": "A",
                    "scopes_to_report_scope2": "B"
                },
                "workspace_mappings": { "A": "Shared", "B": "Shared" }
            }"#,
        )
        .await;

        let result = load_access_policy(Some(&path)).await;

        assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("Shared")));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let path = std::env::temp_dir().join("climoro-policy-does-not-exist.json");

        assert!(load_access_policy(Some(&path)).await.is_err());
    }

    #[tokio::test]
    async fn extended_policy_round_trips_through_file() {
        let path = std::env::temp_dir()
            .join(format!("climoro-policy-{}-written", std::process::id()))
            .join("workspace_access_config.json");
        let mut policy = AccessPolicy::default().with_role_profile(
            RoleName::from_static("Quality Manager"),
            RoleProfile::new(2, "Quality assurance and compliance oversight", false),
        );
        policy.add_scope_mapping(ScopeMapping {
            key: SelectionKey::Other,
            role: RoleName::from_static("Reduction Biochar Access"),
            workspace: WorkspaceLabel::from_static("Biochar"),
            modules: [ModuleName::from_static("Reduction Factor")].into(),
        });

        let written = write_access_policy(&path, &policy).await;
        let loaded = load_access_policy(Some(&path)).await;
        if let Some(parent) = path.parent() {
            let _ = tokio::fs::remove_dir_all(parent).await;
        }

        assert!(written.is_ok());
        let loaded = loaded.unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded, policy);
        assert!(
            loaded
                .role_hierarchy()
                .contains_key(&RoleName::from_static("Quality Manager"))
        );
    }

    #[tokio::test]
    async fn inconsistent_policy_is_not_written() {
        let path = std::env::temp_dir().join(format!(
            "climoro-policy-{}-refused.json",
            std::process::id()
        ));
        let mut policy = AccessPolicy::default();
        policy.add_scope_mapping(ScopeMapping {
            key: SelectionKey::Other,
            role: RoleName::from_static("Reduction Biochar Access"),
            workspace: WorkspaceLabel::from_static("Solar"),
            modules: Default::default(),
        });

        let result = write_access_policy(&path, &policy).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(tokio::fs::metadata(&path).await.is_err());
    }
}
