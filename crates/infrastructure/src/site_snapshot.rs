use std::path::Path;

use climoro_core::{AppError, AppResult};
use climoro_domain::{DocPermission, RoleDefinition, SelectionRecord, UserRecord, WorkspaceRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Serialized state of every record access reconciliation reads or writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSnapshot {
    /// Onboarding selection records of all statuses.
    pub selections: Vec<SelectionRecord>,
    /// Existing role entities.
    pub roles: Vec<RoleDefinition>,
    /// User accounts.
    pub users: Vec<UserRecord>,
    /// Public and private workspaces.
    pub workspaces: Vec<WorkspaceRecord>,
    /// Per-doctype permission entries.
    pub doc_permissions: Vec<DocPermission>,
}

/// Reads a JSON site snapshot.
pub async fn read_site_snapshot(path: &Path) -> AppResult<SiteSnapshot> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to read site snapshot '{}': {error}",
            path.display()
        ))
    })?;
    let snapshot: SiteSnapshot = serde_json::from_str(&raw).map_err(|error| {
        AppError::Validation(format!(
            "invalid site snapshot '{}': {error}",
            path.display()
        ))
    })?;

    debug!(
        path = %path.display(),
        selections = snapshot.selections.len(),
        users = snapshot.users.len(),
        workspaces = snapshot.workspaces.len(),
        "loaded site snapshot"
    );

    Ok(snapshot)
}

/// Writes a site snapshot as pretty-printed JSON, replacing the file.
pub async fn write_site_snapshot(path: &Path, snapshot: &SiteSnapshot) -> AppResult<()> {
    let raw = serde_json::to_string_pretty(snapshot).map_err(|error| {
        AppError::Internal(format!("failed to serialize site snapshot: {error}"))
    })?;

    tokio::fs::write(path, raw).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to write site snapshot '{}': {error}",
            path.display()
        ))
    })
}
