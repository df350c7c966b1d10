//! Domain model for onboarding-driven access reconciliation.

#![forbid(unsafe_code)]

mod access_policy;
mod names;
mod permission;
mod selection;
mod user;
mod visibility;
mod workspace;

pub use access_policy::{
    AccessPolicy, HierarchyBranch, HierarchyPlacement, PolicySummary, PolicyValidationReport,
    RoleProfile, ScopeMapping,
};
pub use names::{
    CompanyName, DocTypeName, ModuleName, RoleName, UserId, WorkspaceLabel, WorkspaceName,
};
pub use permission::{DocPermission, RoleDefinition};
pub use selection::{OnboardingStatus, ScopeSelections, SelectionKey, SelectionRecord};
pub use user::{RoleDelta, UserRecord};
pub use visibility::{VisibilityPlan, private_pages_to_remove};
pub use workspace::WorkspaceRecord;
