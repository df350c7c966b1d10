use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use climoro_core::{AppError, AppResult};
use climoro_domain::{
    CompanyName, ModuleName, RoleName, RoleProfile, ScopeMapping, SelectionKey, WorkspaceLabel,
};

/// What one run of the binary does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMode {
    /// One company's latest approved selection.
    Company(CompanyName),
    /// Every company with an approved selection.
    All,
    /// Workspace base state for the whole role universe.
    Workspaces,
    /// Only check the access policy.
    Validate,
    /// Log the policy's mappings and role hierarchy.
    Show,
    /// Wire a checkbox to a role, workspace and modules, then save the policy.
    AddMapping(ScopeMapping),
    /// Add a role to the user role hierarchy, then save the policy.
    AddRole {
        /// Role to add.
        role: RoleName,
        /// Hierarchy entry of the role.
        profile: RoleProfile,
    },
}

impl SyncMode {
    fn parse(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        match value.trim() {
            "company" => {
                let company = lookup("CLIMORO_SYNC_COMPANY").ok_or_else(|| {
                    AppError::Validation(
                        "CLIMORO_SYNC_COMPANY is required when CLIMORO_SYNC_MODE is 'company'"
                            .to_owned(),
                    )
                })?;
                Ok(Self::Company(CompanyName::new(company)?))
            }
            "all" => Ok(Self::All),
            "workspaces" => Ok(Self::Workspaces),
            "validate" => Ok(Self::Validate),
            "show" => Ok(Self::Show),
            "add-mapping" => Ok(Self::AddMapping(ScopeMapping {
                key: SelectionKey::from_str(&required(lookup, "CLIMORO_MAPPING_FIELD")?)?,
                role: RoleName::new(required(lookup, "CLIMORO_MAPPING_ROLE")?)?,
                workspace: WorkspaceLabel::new(required(lookup, "CLIMORO_MAPPING_WORKSPACE")?)?,
                modules: parse_list(lookup("CLIMORO_MAPPING_MODULES"))
                    .into_iter()
                    .map(ModuleName::new)
                    .collect::<AppResult<BTreeSet<_>>>()?,
            })),
            "add-role" => {
                let level = required(lookup, "CLIMORO_ROLE_LEVEL")?;
                let level = level.parse::<u32>().map_err(|error| {
                    AppError::Validation(format!(
                        "invalid CLIMORO_ROLE_LEVEL value '{level}': {error}"
                    ))
                })?;
                let can_manage_users = match lookup("CLIMORO_ROLE_CAN_MANAGE_USERS") {
                    Some(value) => parse_bool("CLIMORO_ROLE_CAN_MANAGE_USERS", &value)?,
                    None => false,
                };

                Ok(Self::AddRole {
                    role: RoleName::new(required(lookup, "CLIMORO_ROLE_NAME")?)?,
                    profile: RoleProfile::new(
                        level,
                        required(lookup, "CLIMORO_ROLE_DESCRIPTION")?,
                        can_manage_users,
                    )
                    .with_default_scopes(parse_list(lookup("CLIMORO_ROLE_DEFAULT_SCOPES"))),
                })
            }
            other => Err(AppError::Validation(format!(
                "invalid CLIMORO_SYNC_MODE value '{other}': expected company, all, workspaces, \
                 validate, show, add-mapping or add-role"
            ))),
        }
    }

    /// Returns a stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company(_) => "company",
            Self::All => "all",
            Self::Workspaces => "workspaces",
            Self::Validate => "validate",
            Self::Show => "show",
            Self::AddMapping(_) => "add-mapping",
            Self::AddRole { .. } => "add-role",
        }
    }

    /// Returns whether the mode reconciles site state from the snapshot.
    pub fn syncs_site(&self) -> bool {
        matches!(self, Self::Company(_) | Self::All | Self::Workspaces)
    }

    /// Returns whether the mode rewrites the policy file.
    pub fn edits_policy(&self) -> bool {
        matches!(self, Self::AddMapping(_) | Self::AddRole { .. })
    }
}

/// Environment configuration of the access sync binary.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub snapshot_path: Option<PathBuf>,
    pub policy_path: Option<PathBuf>,
    pub mode: SyncMode,
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(optional_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mode = SyncMode::parse(
            lookup("CLIMORO_SYNC_MODE")
                .unwrap_or_else(|| "all".to_owned())
                .as_str(),
            &lookup,
        )?;

        let snapshot_path = if mode.syncs_site() {
            Some(required(&lookup, "CLIMORO_SITE_SNAPSHOT")?)
        } else {
            lookup("CLIMORO_SITE_SNAPSHOT")
        };
        let policy_path = if mode.edits_policy() {
            Some(required(&lookup, "CLIMORO_ACCESS_POLICY")?)
        } else {
            lookup("CLIMORO_ACCESS_POLICY")
        };
        let dry_run = match lookup("CLIMORO_SYNC_DRY_RUN") {
            Some(value) => parse_bool("CLIMORO_SYNC_DRY_RUN", &value)?,
            None => false,
        };

        Ok(Self {
            snapshot_path: snapshot_path.map(PathBuf::from),
            policy_path: policy_path.map(PathBuf::from),
            mode,
            dry_run,
        })
    }

    /// Returns the site snapshot path, which sync modes require.
    pub fn snapshot_path(&self) -> AppResult<&Path> {
        self.snapshot_path
            .as_deref()
            .ok_or_else(|| AppError::Validation("CLIMORO_SITE_SNAPSHOT is required".to_owned()))
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid {name} value '{value}': expected true or false"
        ))),
    }
}
