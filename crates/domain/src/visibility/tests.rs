use std::collections::BTreeSet;

use proptest::prelude::*;

use super::{VisibilityPlan, private_pages_to_remove};
use crate::{
    AccessPolicy, CompanyName, ModuleName, RoleName, ScopeSelections, SelectionKey, UserId,
    UserRecord, WorkspaceLabel, WorkspaceName, WorkspaceRecord,
};

fn role(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn roles(values: &[&str]) -> BTreeSet<RoleName> {
    values.iter().map(|value| role(value)).collect()
}

fn label(value: &str) -> WorkspaceLabel {
    WorkspaceLabel::new(value).unwrap_or_else(|_| unreachable!())
}

fn module(value: &str) -> ModuleName {
    ModuleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn page(name: &str, parent: Option<&str>, module_name: Option<&str>) -> WorkspaceRecord {
    let mut record = WorkspaceRecord::public(
        WorkspaceName::new(name).unwrap_or_else(|_| unreachable!()),
        label(name),
    );
    if let Some(parent) = parent {
        record = record.with_parent(label(parent));
    }
    if let Some(module_name) = module_name {
        record = record.with_module(module(module_name));
    }
    record
}

fn private_page(name: &str, page_label: &str, parent: &str) -> WorkspaceRecord {
    WorkspaceRecord::private(
        WorkspaceName::new(name).unwrap_or_else(|_| unreachable!()),
        label(page_label),
        UserId::new("owner@acme.test").unwrap_or_else(|_| unreachable!()),
    )
    .with_parent(label(parent))
}

fn site() -> Vec<WorkspaceRecord> {
    vec![
        page("Home", None, None),
        page("Scope 1", None, Some("Scope 1")).with_hidden(true),
        page("Stationary Emissions", Some("Scope 1"), Some("Scope 1")),
        page("Mobile Combustion", Some("Scope 1"), Some("Scope 1")),
        page("Fugitives", Some("Scope 1"), Some("Scope 1")),
        page("Process", Some("Scope 1"), Some("Scope 1")),
        page("Scope 2", None, Some("Scope 2")),
        page("Electricity", Some("Scope 2"), Some("Scope 2")),
        page("Scope 3", None, Some("Scope 3")),
        page("Upstream", Some("Scope 3"), Some("Scope 3")),
        page("Downstream", Some("Scope 3"), Some("Scope 3")),
        page("Purchased Goods", Some("Upstream"), Some("Scope 3")),
        page("Use of Sold Products", Some("Downstream"), Some("Scope 3")),
        page("Reduction Factor", None, Some("Reduction Factor")),
        page("Solar", Some("Reduction Factor"), Some("Reduction Factor")),
        page("Legacy Scope Report", None, Some("Scope 1")),
        page("Accounting", None, Some("Accounts")).with_roles([role("Accounts User")]),
    ]
}

fn cycle(
    policy: &AccessPolicy,
    workspaces: Vec<WorkspaceRecord>,
    selected: &BTreeSet<RoleName>,
) -> VisibilityPlan {
    let mut plan = VisibilityPlan::new(workspaces);
    plan.apply_cycle(policy, &policy.role_universe(), selected);
    plan
}

fn planned<'a>(plan: &'a VisibilityPlan, name: &str) -> &'a WorkspaceRecord {
    plan.planned_by_label(&label(name))
        .unwrap_or_else(|| unreachable!())
}

#[test]
fn selected_branch_is_granted_and_sibling_locked() {
    let policy = AccessPolicy::default();
    let selected = roles(&["Scope 3 Access", "Scope 3 Upstream Access"]);
    let plan = cycle(&policy, site(), &selected);

    let upstream = planned(&plan, "Upstream");
    assert_eq!(upstream.roles(), &selected);
    assert!(!upstream.is_locked());

    let downstream = planned(&plan, "Downstream");
    assert!(downstream.is_locked());
    assert!(downstream.roles().is_empty());

    assert_eq!(planned(&plan, "Purchased Goods").roles(), &selected);
    assert!(planned(&plan, "Use of Sold Products").is_locked());
    assert_eq!(planned(&plan, "Scope 3").roles(), &roles(&["Scope 3 Access"]));
}

#[test]
fn unselected_scope_root_and_children_are_locked() {
    let policy = AccessPolicy::default();
    let plan = cycle(&policy, site(), &roles(&["Scope 2 Access"]));

    for name in ["Scope 1", "Stationary Emissions", "Scope 3", "Upstream", "Solar"] {
        assert!(planned(&plan, name).is_locked(), "{name} should be locked");
    }
    assert_eq!(planned(&plan, "Scope 2").roles(), &roles(&["Scope 2 Access"]));
    assert_eq!(
        planned(&plan, "Electricity").roles(),
        &roles(&["Scope 2 Access"])
    );
}

#[test]
fn electricity_stays_with_scope2_when_another_scope_is_selected() {
    let policy = AccessPolicy::default();
    let plan = cycle(&policy, site(), &roles(&["Scope 1 Access"]));

    let electricity = planned(&plan, "Electricity");
    assert!(!electricity.is_locked());
    assert_eq!(electricity.roles(), &roles(&["Scope 2 Access"]));
    assert!(planned(&plan, "Scope 2").is_locked());
}

#[test]
fn home_is_hidden_with_no_roles_for_any_selection() {
    let policy = AccessPolicy::default();
    for selected in [roles(&[]), policy.role_universe()] {
        let plan = cycle(&policy, site(), &selected);
        let home = planned(&plan, "Home");

        assert!(home.is_hidden());
        assert!(home.roles().is_empty());
    }
}

#[test]
fn unmapped_workspace_in_managed_module_is_locked() {
    let policy = AccessPolicy::default();
    let plan = cycle(&policy, site(), &policy.role_universe());

    let legacy = planned(&plan, "Legacy Scope Report");
    assert!(legacy.is_locked());
    assert!(legacy.roles().is_empty());
}

#[test]
fn workspaces_outside_managed_scope_are_not_touched() {
    let policy = AccessPolicy::default();
    let plan = cycle(&policy, site(), &roles(&["Scope 1 Access"]));

    assert!(
        plan.changes()
            .iter()
            .all(|workspace| workspace.label() != &label("Accounting"))
    );
    assert_eq!(
        planned(&plan, "Accounting").roles(),
        &roles(&["Accounts User"])
    );
}

#[test]
fn hidden_flag_is_reset_on_mapped_workspaces() {
    let policy = AccessPolicy::default();
    let plan = cycle(&policy, site(), &roles(&["Scope 1 Access"]));

    let scope1 = planned(&plan, "Scope 1");
    assert!(!scope1.is_hidden());
    assert_eq!(scope1.roles(), &roles(&["Scope 1 Access"]));
}

#[test]
fn second_cycle_plans_no_changes() {
    let policy = AccessPolicy::default();
    let selected = roles(&["Scope 1 Access", "Scope 1 Mobile Access", "Scope 3 Access"]);
    let first = cycle(&policy, site(), &selected);
    assert!(!first.changes().is_empty());

    let stored: Vec<WorkspaceRecord> = first.workspaces().cloned().collect();
    let second = cycle(&policy, stored, &selected);

    assert!(second.changes().is_empty());
}

#[test]
fn private_pages_are_ignored_by_the_plan() {
    let policy = AccessPolicy::default();
    let mut workspaces = site();
    workspaces.push(private_page("Downstream-owner", "Downstream", "Scope 3"));
    let plan = cycle(&policy, workspaces, &roles(&[]));

    assert!(plan.workspaces().all(WorkspaceRecord::is_public));
}

#[test]
fn private_pages_outside_selection_are_removed() {
    let policy = AccessPolicy::default();
    let selected = roles(&["Scope 3 Access", "Scope 3 Upstream Access"]);
    let pages = vec![
        private_page("Electricity-owner", "Electricity", "Scope 2"),
        private_page("Downstream-owner", "Downstream", "Scope 3"),
        private_page("Upstream-owner", "Upstream", "Scope 3"),
        private_page("Scope 3-owner", "Scope 3", "Scope 3"),
        private_page("Notes-owner", "Notes", "Upstream"),
        private_page("Scratch-owner", "Scratch", "Drafts"),
        page("Downstream Copy", Some("Scope 3"), Some("Scope 3")),
    ];

    let removed: Vec<&str> = private_pages_to_remove(&policy, &selected, &pages)
        .into_iter()
        .map(|page| page.name().as_str())
        .collect();

    assert_eq!(removed, vec!["Downstream-owner"]);
}

#[test]
fn private_children_of_unselected_branch_are_removed() {
    let policy = AccessPolicy::default();
    let pages = vec![private_page("Notes-owner", "Notes", "Upstream")];

    let removed = private_pages_to_remove(&policy, &roles(&["Scope 3 Access"]), &pages);

    assert_eq!(removed.len(), 1);
}

fn selection_strategy() -> impl Strategy<Value = ScopeSelections> {
    proptest::collection::vec(any::<bool>(), SelectionKey::all().len()).prop_map(|flags| {
        SelectionKey::all()
            .iter()
            .zip(flags)
            .fold(ScopeSelections::default(), |selections, (key, flag)| {
                selections.with(*key, flag)
            })
    })
}

proptest! {
    #[test]
    fn cycle_is_idempotent_for_any_selection(selections in selection_strategy()) {
        let policy = AccessPolicy::default();
        let selected = policy.derive_roles(&selections);

        let first = cycle(&policy, site(), &selected);
        let stored: Vec<WorkspaceRecord> = first.workspaces().cloned().collect();
        let second = cycle(&policy, stored, &selected);

        prop_assert!(second.changes().is_empty());
    }

    #[test]
    fn member_sees_only_reachable_managed_workspaces(selections in selection_strategy()) {
        let policy = AccessPolicy::default();
        let selected = policy.derive_roles(&selections);
        let plan = cycle(&policy, site(), &selected);
        let member = UserRecord::new(
            UserId::new("member@acme.test").unwrap_or_else(|_| unreachable!()),
            CompanyName::new("Acme").unwrap_or_else(|_| unreachable!()),
        )
        .with_roles(selected.iter().cloned());

        let allowed = policy.allowed_labels(&selected);
        let managed = policy.managed_labels();
        for workspace in plan.workspaces().filter(|workspace| workspace.is_visible_to(&member)) {
            prop_assert!(
                !managed.contains(workspace.label()) || allowed.contains(workspace.label()),
                "{} visible without selection",
                workspace.label()
            );
            prop_assert!(workspace.label() != policy.home_label());
        }
    }
}
