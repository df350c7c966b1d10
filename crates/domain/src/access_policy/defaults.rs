use std::collections::{BTreeMap, BTreeSet};

use crate::{DocTypeName, ModuleName, RoleName, SelectionKey, WorkspaceLabel};

use super::{AccessPolicy, HierarchyBranch, RoleProfile};

const ROLE_MAPPINGS: &[(SelectionKey, &str, &str)] = &[
    (SelectionKey::Scope1, "Scope 1 Access", "Scope 1"),
    (SelectionKey::Scope2, "Scope 2 Access", "Scope 2"),
    (SelectionKey::Scope3, "Scope 3 Access", "Scope 3"),
    (SelectionKey::Reductions, "Reduction Factor Access", "Reduction Factor"),
    (SelectionKey::Upstream, "Scope 3 Upstream Access", "Upstream"),
    (SelectionKey::Downstream, "Scope 3 Downstream Access", "Downstream"),
    (SelectionKey::Stationary, "Scope 1 Stationary Access", "Stationary Emissions"),
    (SelectionKey::Mobile, "Scope 1 Mobile Access", "Mobile Combustion"),
    (SelectionKey::Fugitive, "Scope 1 Fugitives Access", "Fugitives"),
    (SelectionKey::Process, "Scope 1 Process Access", "Process"),
    (
        SelectionKey::EnergyEfficiency,
        "Reduction Energy Efficiency Access",
        "Energy Efficiency",
    ),
    (SelectionKey::RenewableEnergy, "Reduction Solar Access", "Solar"),
    (
        SelectionKey::ProcessOptimization,
        "Reduction Process Optimization Access",
        "Process Optimization",
    ),
    (SelectionKey::WasteManagement, "Reduction Waste Manage Access", "Waste Manage"),
    (
        SelectionKey::Transportation,
        "Reduction Transportation Access",
        "Transportation-Upstream",
    ),
    (SelectionKey::Other, "Reduction Methane Recovery Access", "Methane Recovery"),
];

// Scope workspaces live under "Setup" while the sidebar also checks the
// dedicated scope module defs, so both are unblocked.
const MODULE_MAPPINGS: &[(&str, &[&str])] = &[
    ("Scope 1 Access", &["Scope 1", "Setup"]),
    ("Scope 2 Access", &["Scope 2", "Setup"]),
    ("Scope 3 Access", &["Scope 3", "Setup"]),
    ("Reduction Factor Access", &["Reduction Factor", "Setup"]),
    ("Scope 3 Upstream Access", &["climoro onboarding"]),
    ("Scope 3 Downstream Access", &["climoro onboarding"]),
];

const EXTRA_WORKSPACE_MAPPINGS: &[(&str, &str)] = &[("Scope 2 Access", "Electricity")];

const READONLY_DOCTYPES: &[&str] = &[
    "Emission Factor Master",
    "Fugitive Simple",
    "Fugitive Screening",
    "Fugitive Scale Base",
    "GWP Reference",
];

const MANAGED_MODULES: &[&str] = &[
    "Scope 1",
    "Scope 2",
    "Scope 3",
    "Reduction Factor",
    "climoro onboarding",
];

const HIERARCHY_ROOTS: &[&str] = &["Scope 1", "Scope 2", "Scope 3", "Reduction Factor"];

const BRANCHES: &[(&str, &str, &str)] = &[
    ("Upstream", "Scope 3 Upstream Access", "Scope 3 Access"),
    ("Downstream", "Scope 3 Downstream Access", "Scope 3 Access"),
];

const ROLE_HIERARCHY: &[(&str, u32, &str, bool, &[&str])] = &[
    (
        "Super Admin",
        1,
        "Highest level access - company administrator",
        true,
        &["all"],
    ),
    ("Unit Manager", 2, "Unit-level management access", false, &[]),
    ("Data Analyst", 3, "Data analysis and reporting access", false, &[]),
];

pub(super) fn built_in() -> AccessPolicy {
    let mut roles_by_selection = BTreeMap::new();
    let mut workspace_by_role = BTreeMap::new();
    for (key, role, label) in ROLE_MAPPINGS {
        roles_by_selection.insert(*key, RoleName::from_static(*role));
        workspace_by_role.insert(RoleName::from_static(*role), WorkspaceLabel::from_static(*label));
    }

    let modules_by_role = MODULE_MAPPINGS
        .iter()
        .map(|(role, modules)| {
            (
                RoleName::from_static(*role),
                modules
                    .iter()
                    .map(|module| ModuleName::from_static(*module))
                    .collect::<BTreeSet<_>>(),
            )
        })
        .collect();

    let mut extra_workspaces_by_role: BTreeMap<RoleName, BTreeSet<WorkspaceLabel>> =
        BTreeMap::new();
    for (role, label) in EXTRA_WORKSPACE_MAPPINGS {
        extra_workspaces_by_role
            .entry(RoleName::from_static(*role))
            .or_default()
            .insert(WorkspaceLabel::from_static(*label));
    }

    AccessPolicy {
        version: 1,
        roles_by_selection,
        workspace_by_role,
        extra_workspaces_by_role,
        modules_by_role,
        readonly_doctypes: READONLY_DOCTYPES
            .iter()
            .map(|doctype| DocTypeName::from_static(*doctype))
            .collect(),
        always_allowed_roles: BTreeSet::new(),
        managed_modules: MANAGED_MODULES
            .iter()
            .map(|module| ModuleName::from_static(*module))
            .collect(),
        hierarchy_roots: HIERARCHY_ROOTS
            .iter()
            .map(|label| WorkspaceLabel::from_static(*label))
            .collect(),
        branches: BRANCHES
            .iter()
            .map(|(label, role, parent_role)| HierarchyBranch {
                label: WorkspaceLabel::from_static(*label),
                role: RoleName::from_static(*role),
                parent_role: RoleName::from_static(*parent_role),
            })
            .collect(),
        home_label: WorkspaceLabel::from_static("Home"),
        user_role_hierarchy: ROLE_HIERARCHY
            .iter()
            .map(|(role, level, description, can_manage_users, scopes)| {
                (
                    RoleName::from_static(*role),
                    RoleProfile::new(*level, *description, *can_manage_users)
                        .with_default_scopes(scopes.iter().map(|scope| (*scope).to_owned())),
                )
            })
            .collect(),
    }
}
