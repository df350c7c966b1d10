use std::collections::BTreeSet;
use std::sync::Arc;

use climoro_core::AppResult;
use climoro_domain::{
    AccessPolicy, CompanyName, DocPermission, ModuleName, RoleDefinition, RoleDelta, RoleName,
    SelectionRecord, UserRecord, VisibilityPlan, WorkspaceRecord, private_pages_to_remove,
};
use tracing::{debug, error, info, warn};

use crate::access_ports::{
    DocPermissionRepository, RoleRepository, SelectionRepository, UserRepository,
    WorkspaceRepository,
};

mod orchestration;
mod provisioning;
mod report;
mod user_sync;
mod visibility;

pub use report::{AccessSyncOutcome, AccessSyncReport, SkipReason, SyncFailure, SyncStage};

/// Reconciles roles, module blocks, workspace visibility and read grants
/// with each company's approved onboarding selections.
#[derive(Clone)]
pub struct WorkspaceAccessService {
    policy: Arc<AccessPolicy>,
    selection_repository: Arc<dyn SelectionRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserRepository>,
    workspace_repository: Arc<dyn WorkspaceRepository>,
    permission_repository: Arc<dyn DocPermissionRepository>,
}

impl WorkspaceAccessService {
    /// Creates a workspace access service.
    #[must_use]
    pub fn new(
        policy: Arc<AccessPolicy>,
        selection_repository: Arc<dyn SelectionRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserRepository>,
        workspace_repository: Arc<dyn WorkspaceRepository>,
        permission_repository: Arc<dyn DocPermissionRepository>,
    ) -> Self {
        Self {
            policy,
            selection_repository,
            role_repository,
            user_repository,
            workspace_repository,
            permission_repository,
        }
    }

    /// Returns the policy this service reconciles against.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }
}
