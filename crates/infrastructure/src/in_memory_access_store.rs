use std::collections::BTreeMap;

use async_trait::async_trait;
use climoro_application::{
    DocPermissionRepository, RoleRepository, SelectionRepository, UserRepository,
    WorkspaceRepository,
};
use climoro_core::{AppError, AppResult};
use climoro_domain::{
    CompanyName, DocPermission, DocTypeName, RoleDefinition, RoleName, SelectionRecord, UserId,
    UserRecord, WorkspaceName, WorkspaceRecord,
};
use tokio::sync::RwLock;

use crate::SiteSnapshot;

type PermissionKey = (DocTypeName, RoleName, u8);

/// In-memory store implementing every access reconciliation port.
///
/// Loaded from and written back to a [`SiteSnapshot`].
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    selections: RwLock<Vec<SelectionRecord>>,
    roles: RwLock<BTreeMap<RoleName, RoleDefinition>>,
    users: RwLock<BTreeMap<UserId, UserRecord>>,
    workspaces: RwLock<BTreeMap<WorkspaceName, WorkspaceRecord>>,
    permissions: RwLock<BTreeMap<PermissionKey, DocPermission>>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot, rejecting duplicate keys.
    pub fn from_snapshot(snapshot: SiteSnapshot) -> AppResult<Self> {
        let roles = index_unique(snapshot.roles, "role", |role| role.name.clone())?;
        let users = index_unique(snapshot.users, "user", |user| user.name().clone())?;
        let workspaces = index_unique(snapshot.workspaces, "workspace", |workspace| {
            workspace.name().clone()
        })?;
        let permissions = index_unique(snapshot.doc_permissions, "doc permission", |permission| {
            permission_key(permission)
        })?;

        Ok(Self {
            selections: RwLock::new(snapshot.selections),
            roles: RwLock::new(roles),
            users: RwLock::new(users),
            workspaces: RwLock::new(workspaces),
            permissions: RwLock::new(permissions),
        })
    }

    /// Captures the current state, every collection sorted by key.
    pub async fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            selections: self.selections.read().await.clone(),
            roles: self.roles.read().await.values().cloned().collect(),
            users: self.users.read().await.values().cloned().collect(),
            workspaces: self.workspaces.read().await.values().cloned().collect(),
            doc_permissions: self.permissions.read().await.values().cloned().collect(),
        }
    }
}

fn permission_key(permission: &DocPermission) -> PermissionKey {
    (
        permission.doctype.clone(),
        permission.role.clone(),
        permission.permlevel,
    )
}

fn index_unique<K, V>(
    values: Vec<V>,
    kind: &str,
    key_of: impl Fn(&V) -> K,
) -> AppResult<BTreeMap<K, V>>
where
    K: Ord + std::fmt::Debug,
{
    let mut indexed = BTreeMap::new();
    for value in values {
        let key = key_of(&value);
        if indexed.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "duplicate {kind} {key:?} in site snapshot"
            )));
        }
        indexed.insert(key, value);
    }

    Ok(indexed)
}

#[async_trait]
impl SelectionRepository for InMemoryAccessStore {
    async fn latest_approved_selection(
        &self,
        company: &CompanyName,
    ) -> AppResult<Option<SelectionRecord>> {
        Ok(self
            .selections
            .read()
            .await
            .iter()
            .filter(|record| record.company_name() == company && record.is_approved())
            .max_by_key(|record| record.modified())
            .cloned())
    }

    async fn list_companies_with_approved_selection(&self) -> AppResult<Vec<CompanyName>> {
        let mut companies: Vec<CompanyName> = self
            .selections
            .read()
            .await
            .iter()
            .filter(|record| record.is_approved())
            .map(|record| record.company_name().clone())
            .collect();
        companies.sort();
        companies.dedup();

        Ok(companies)
    }
}

#[async_trait]
impl RoleRepository for InMemoryAccessStore {
    async fn role_exists(&self, role: &RoleName) -> AppResult<bool> {
        Ok(self.roles.read().await.contains_key(role))
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        roles.insert(role.name.clone(), role);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryAccessStore {
    async fn list_enabled_users(&self, company: &CompanyName) -> AppResult<Vec<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.enabled() && user.company() == company)
            .cloned()
            .collect())
    }

    async fn save_user(&self, user: UserRecord) -> AppResult<()> {
        let mut users = self.users.write().await;
        let Some(stored) = users.get_mut(user.name()) else {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.name()
            )));
        };

        *stored = user;
        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryAccessStore {
    async fn list_public_workspaces(&self) -> AppResult<Vec<WorkspaceRecord>> {
        Ok(self
            .workspaces
            .read()
            .await
            .values()
            .filter(|workspace| workspace.is_public())
            .cloned()
            .collect())
    }

    async fn list_private_workspaces(&self, owner: &UserId) -> AppResult<Vec<WorkspaceRecord>> {
        Ok(self
            .workspaces
            .read()
            .await
            .values()
            .filter(|workspace| !workspace.is_public() && workspace.for_user() == Some(owner))
            .cloned()
            .collect())
    }

    async fn save_workspace(&self, workspace: WorkspaceRecord) -> AppResult<()> {
        let mut workspaces = self.workspaces.write().await;
        let Some(stored) = workspaces.get_mut(workspace.name()) else {
            return Err(AppError::NotFound(format!(
                "workspace '{}' does not exist",
                workspace.name()
            )));
        };

        *stored = workspace;
        Ok(())
    }

    async fn delete_workspace(&self, name: &WorkspaceName) -> AppResult<()> {
        self.workspaces
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("workspace '{name}' does not exist")))
    }
}

#[async_trait]
impl DocPermissionRepository for InMemoryAccessStore {
    async fn permission_exists(
        &self,
        doctype: &DocTypeName,
        role: &RoleName,
        permlevel: u8,
    ) -> AppResult<bool> {
        Ok(self
            .permissions
            .read()
            .await
            .contains_key(&(doctype.clone(), role.clone(), permlevel)))
    }

    async fn create_permission(&self, permission: DocPermission) -> AppResult<()> {
        let key = permission_key(&permission);
        let mut permissions = self.permissions.write().await;
        if permissions.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "permission for role '{}' on '{}' at level {} already exists",
                key.1, key.0, key.2
            )));
        }

        permissions.insert(key, permission);
        Ok(())
    }
}
