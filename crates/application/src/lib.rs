//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod workspace_access_service;

pub use access_ports::{
    DocPermissionRepository, RoleRepository, SelectionRepository, UserRepository,
    WorkspaceRepository,
};
pub use workspace_access_service::{
    AccessSyncOutcome, AccessSyncReport, SkipReason, SyncFailure, SyncStage,
    WorkspaceAccessService,
};
