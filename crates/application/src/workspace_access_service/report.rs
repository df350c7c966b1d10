use std::collections::BTreeSet;
use std::fmt;

use climoro_core::AppError;
use climoro_domain::{DocTypeName, RoleName, UserId, WorkspaceName};

/// Reconciliation step a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Saving a reconciled workspace.
    Workspaces,
    /// Deleting a private page.
    PrivatePages,
    /// Creating a read-only doctype permission.
    ReadPermissions,
    /// Saving a user's roles and module block-list.
    Users,
}

impl SyncStage {
    /// Returns a stable label for logs and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspaces => "workspaces",
            Self::PrivatePages => "private_pages",
            Self::ReadPermissions => "read_permissions",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item that could not be written during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Step that failed.
    pub stage: SyncStage,
    /// Record the step was writing, e.g. a workspace or user name.
    pub subject: String,
    /// Error reported by the store.
    pub message: String,
}

/// What one reconciliation cycle changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSyncReport {
    /// Roles the cycle treated as selected.
    pub selected_roles: BTreeSet<RoleName>,
    /// Roles that did not exist and were created.
    pub roles_created: Vec<RoleName>,
    /// Public workspaces whose stored state changed.
    pub workspaces_updated: Vec<WorkspaceName>,
    /// Private pages removed.
    pub private_pages_deleted: Vec<WorkspaceName>,
    /// Read-only permission entries created.
    pub permissions_created: Vec<(DocTypeName, RoleName)>,
    /// Users whose roles or block-list changed.
    pub users_updated: Vec<UserId>,
    /// Scope-role assignments added across all users.
    pub role_assignments_added: usize,
    /// Scope-role assignments revoked across all users.
    pub role_assignments_revoked: usize,
    /// Module blocks lifted across all users.
    pub modules_unblocked: usize,
    /// Items that failed and were skipped.
    pub failures: Vec<SyncFailure>,
}

impl AccessSyncReport {
    /// Starts an empty report for a selected role set.
    #[must_use]
    pub fn new(selected_roles: BTreeSet<RoleName>) -> Self {
        Self {
            selected_roles,
            ..Self::default()
        }
    }

    /// Returns whether every item was written.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns whether the cycle wrote nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.roles_created.is_empty()
            && self.workspaces_updated.is_empty()
            && self.private_pages_deleted.is_empty()
            && self.permissions_created.is_empty()
            && self.users_updated.is_empty()
    }

    pub(super) fn record_failure(
        &mut self,
        stage: SyncStage,
        subject: impl fmt::Display,
        error: &AppError,
    ) {
        self.failures.push(SyncFailure {
            stage,
            subject: subject.to_string(),
            message: error.to_string(),
        });
    }
}

/// Why a company cycle did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The company has no approved onboarding record.
    NoApprovedSelection,
    /// The approved record ticks no mapped checkbox.
    EmptySelection,
}

impl SkipReason {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoApprovedSelection => "no_approved_selection",
            Self::EmptySelection => "empty_selection",
        }
    }
}

/// Result of reconciling one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSyncOutcome {
    /// Nothing was read beyond the selection and nothing was written.
    Skipped(SkipReason),
    /// The cycle ran; the report lists what changed.
    Applied(AccessSyncReport),
    /// The cycle aborted on a store error. Only produced by bulk resyncs.
    Failed(String),
}

impl AccessSyncOutcome {
    /// Returns the report of an applied cycle.
    #[must_use]
    pub fn report(&self) -> Option<&AccessSyncReport> {
        match self {
            Self::Applied(report) => Some(report),
            Self::Skipped(_) | Self::Failed(_) => None,
        }
    }
}
