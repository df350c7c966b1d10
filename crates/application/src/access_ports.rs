use async_trait::async_trait;
use climoro_core::AppResult;
use climoro_domain::{
    CompanyName, DocPermission, DocTypeName, RoleDefinition, RoleName, SelectionRecord, UserId,
    UserRecord, WorkspaceName, WorkspaceRecord,
};

/// Read port for finalized onboarding selections.
#[async_trait]
pub trait SelectionRepository: Send + Sync {
    /// Returns the most recently modified approved record for a company.
    async fn latest_approved_selection(
        &self,
        company: &CompanyName,
    ) -> AppResult<Option<SelectionRecord>>;

    /// Lists companies that have at least one approved record.
    async fn list_companies_with_approved_selection(&self) -> AppResult<Vec<CompanyName>>;
}

/// Repository port for role entities.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Returns whether a role with this name exists.
    async fn role_exists(&self, role: &RoleName) -> AppResult<bool>;

    /// Creates one role.
    async fn create_role(&self, role: RoleDefinition) -> AppResult<()>;
}

/// Repository port for user role lists and module block-lists.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists enabled users belonging to a company.
    async fn list_enabled_users(&self, company: &CompanyName) -> AppResult<Vec<UserRecord>>;

    /// Persists the role list and block-list of one user.
    async fn save_user(&self, user: UserRecord) -> AppResult<()>;
}

/// Repository port for workspace pages.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Lists every public workspace.
    async fn list_public_workspaces(&self) -> AppResult<Vec<WorkspaceRecord>>;

    /// Lists private workspaces owned by one user.
    async fn list_private_workspaces(&self, owner: &UserId) -> AppResult<Vec<WorkspaceRecord>>;

    /// Persists role list and flags of an existing workspace.
    async fn save_workspace(&self, workspace: WorkspaceRecord) -> AppResult<()>;

    /// Deletes one workspace.
    async fn delete_workspace(&self, name: &WorkspaceName) -> AppResult<()>;
}

/// Repository port for per-doctype permission entries.
#[async_trait]
pub trait DocPermissionRepository: Send + Sync {
    /// Returns whether `role` already has an entry on `doctype` at `permlevel`.
    async fn permission_exists(
        &self,
        doctype: &DocTypeName,
        role: &RoleName,
        permlevel: u8,
    ) -> AppResult<bool>;

    /// Creates one permission entry.
    async fn create_permission(&self, permission: DocPermission) -> AppResult<()>;
}
