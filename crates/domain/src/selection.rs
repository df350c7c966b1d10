use std::str::FromStr;

use chrono::{DateTime, Utc};
use climoro_core::AppError;
use serde::{Deserialize, Serialize};

use crate::CompanyName;

/// Onboarding checkbox that can gate an access role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectionKey {
    /// Company reports Scope 1 emissions.
    #[serde(rename = "scopes_to_report_scope1")]
    Scope1,
    /// Company reports Scope 2 emissions.
    #[serde(rename = "scopes_to_report_scope2")]
    Scope2,
    /// Company reports Scope 3 emissions.
    #[serde(rename = "scopes_to_report_scope3")]
    Scope3,
    /// Company tracks reduction levers.
    #[serde(rename = "scopes_to_report_reductions")]
    Reductions,
    /// Scope 1 stationary combustion.
    #[serde(rename = "scope_1_options_stationary")]
    Stationary,
    /// Scope 1 mobile combustion.
    #[serde(rename = "scope_1_options_mobile")]
    Mobile,
    /// Scope 1 fugitive emissions.
    #[serde(rename = "scope_1_options_fugitive")]
    Fugitive,
    /// Scope 1 process emissions.
    #[serde(rename = "scope_1_options_process")]
    Process,
    /// Scope 3 upstream categories.
    #[serde(rename = "scope_3_options_upstream")]
    Upstream,
    /// Scope 3 downstream categories.
    #[serde(rename = "scope_3_options_downstream")]
    Downstream,
    /// Reduction lever: energy efficiency.
    #[serde(rename = "reduction_options_energy_efficiency")]
    EnergyEfficiency,
    /// Reduction lever: renewable energy.
    #[serde(rename = "reduction_options_renewable_energy")]
    RenewableEnergy,
    /// Reduction lever: process optimization.
    #[serde(rename = "reduction_options_process_optimization")]
    ProcessOptimization,
    /// Reduction lever: waste management.
    #[serde(rename = "reduction_options_waste_management")]
    WasteManagement,
    /// Reduction lever: transportation.
    #[serde(rename = "reduction_options_transportation")]
    Transportation,
    /// Reduction lever: other (methane recovery).
    #[serde(rename = "reduction_options_other")]
    Other,
}

impl SelectionKey {
    /// Returns the stable intake form field name for this key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scope1 => "scopes_to_report_scope1",
            Self::Scope2 => "scopes_to_report_scope2",
            Self::Scope3 => "scopes_to_report_scope3",
            Self::Reductions => "scopes_to_report_reductions",
            Self::Stationary => "scope_1_options_stationary",
            Self::Mobile => "scope_1_options_mobile",
            Self::Fugitive => "scope_1_options_fugitive",
            Self::Process => "scope_1_options_process",
            Self::Upstream => "scope_3_options_upstream",
            Self::Downstream => "scope_3_options_downstream",
            Self::EnergyEfficiency => "reduction_options_energy_efficiency",
            Self::RenewableEnergy => "reduction_options_renewable_energy",
            Self::ProcessOptimization => "reduction_options_process_optimization",
            Self::WasteManagement => "reduction_options_waste_management",
            Self::Transportation => "reduction_options_transportation",
            Self::Other => "reduction_options_other",
        }
    }

    /// Returns all known selection keys.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SelectionKey] = &[
            SelectionKey::Scope1,
            SelectionKey::Scope2,
            SelectionKey::Scope3,
            SelectionKey::Reductions,
            SelectionKey::Stationary,
            SelectionKey::Mobile,
            SelectionKey::Fugitive,
            SelectionKey::Process,
            SelectionKey::Upstream,
            SelectionKey::Downstream,
            SelectionKey::EnergyEfficiency,
            SelectionKey::RenewableEnergy,
            SelectionKey::ProcessOptimization,
            SelectionKey::WasteManagement,
            SelectionKey::Transportation,
            SelectionKey::Other,
        ];

        ALL
    }
}

impl FromStr for SelectionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown selection key '{value}'")))
    }
}

/// Checkbox state captured by an onboarding form.
///
/// Child flags are kept as entered even when their parent is unset; role
/// derivation treats every flag independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSelections {
    /// Reports Scope 1.
    pub scope1: bool,
    /// Reports Scope 2.
    pub scope2: bool,
    /// Reports Scope 3.
    pub scope3: bool,
    /// Tracks reductions.
    pub reductions: bool,
    /// Scope 1 stationary combustion.
    pub stationary: bool,
    /// Scope 1 mobile combustion.
    pub mobile: bool,
    /// Scope 1 fugitive emissions.
    pub fugitive: bool,
    /// Scope 1 process emissions.
    pub process: bool,
    /// Scope 3 upstream.
    pub upstream: bool,
    /// Scope 3 downstream.
    pub downstream: bool,
    /// Reduction: energy efficiency.
    pub energy_efficiency: bool,
    /// Reduction: renewable energy.
    pub renewable_energy: bool,
    /// Reduction: process optimization.
    pub process_optimization: bool,
    /// Reduction: waste management.
    pub waste_management: bool,
    /// Reduction: transportation.
    pub transportation: bool,
    /// Reduction: other.
    pub other: bool,
}

impl ScopeSelections {
    /// Returns whether the checkbox behind `key` is ticked.
    #[must_use]
    pub fn is_selected(&self, key: SelectionKey) -> bool {
        match key {
            SelectionKey::Scope1 => self.scope1,
            SelectionKey::Scope2 => self.scope2,
            SelectionKey::Scope3 => self.scope3,
            SelectionKey::Reductions => self.reductions,
            SelectionKey::Stationary => self.stationary,
            SelectionKey::Mobile => self.mobile,
            SelectionKey::Fugitive => self.fugitive,
            SelectionKey::Process => self.process,
            SelectionKey::Upstream => self.upstream,
            SelectionKey::Downstream => self.downstream,
            SelectionKey::EnergyEfficiency => self.energy_efficiency,
            SelectionKey::RenewableEnergy => self.renewable_energy,
            SelectionKey::ProcessOptimization => self.process_optimization,
            SelectionKey::WasteManagement => self.waste_management,
            SelectionKey::Transportation => self.transportation,
            SelectionKey::Other => self.other,
        }
    }

    /// Returns a copy with the checkbox behind `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: SelectionKey, value: bool) -> Self {
        let flag = match key {
            SelectionKey::Scope1 => &mut self.scope1,
            SelectionKey::Scope2 => &mut self.scope2,
            SelectionKey::Scope3 => &mut self.scope3,
            SelectionKey::Reductions => &mut self.reductions,
            SelectionKey::Stationary => &mut self.stationary,
            SelectionKey::Mobile => &mut self.mobile,
            SelectionKey::Fugitive => &mut self.fugitive,
            SelectionKey::Process => &mut self.process,
            SelectionKey::Upstream => &mut self.upstream,
            SelectionKey::Downstream => &mut self.downstream,
            SelectionKey::EnergyEfficiency => &mut self.energy_efficiency,
            SelectionKey::RenewableEnergy => &mut self.renewable_energy,
            SelectionKey::ProcessOptimization => &mut self.process_optimization,
            SelectionKey::WasteManagement => &mut self.waste_management,
            SelectionKey::Transportation => &mut self.transportation,
            SelectionKey::Other => &mut self.other,
        };
        *flag = value;
        self
    }

    /// Builds selections with exactly the given keys ticked.
    #[must_use]
    pub fn from_keys(keys: &[SelectionKey]) -> Self {
        keys.iter()
            .fold(Self::default(), |selections, key| selections.with(*key, true))
    }

    /// Returns the ticked keys in declaration order.
    pub fn selected_keys(&self) -> impl Iterator<Item = SelectionKey> + '_ {
        SelectionKey::all()
            .iter()
            .copied()
            .filter(|key| self.is_selected(*key))
    }
}

/// Review status of an onboarding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnboardingStatus {
    /// Saved but not submitted.
    Draft,
    /// Awaiting review.
    Submitted,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator.
    Rejected,
}

impl OnboardingStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Finalized onboarding choices for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    company_name: CompanyName,
    status: OnboardingStatus,
    modified: DateTime<Utc>,
    #[serde(default)]
    selections: ScopeSelections,
}

impl SelectionRecord {
    /// Creates a selection record.
    #[must_use]
    pub fn new(
        company_name: CompanyName,
        status: OnboardingStatus,
        modified: DateTime<Utc>,
        selections: ScopeSelections,
    ) -> Self {
        Self {
            company_name,
            status,
            modified,
            selections,
        }
    }

    /// Returns the owning company.
    #[must_use]
    pub fn company_name(&self) -> &CompanyName {
        &self.company_name
    }

    /// Returns the review status.
    #[must_use]
    pub fn status(&self) -> OnboardingStatus {
        self.status
    }

    /// Returns the last modification time.
    #[must_use]
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns the checkbox state.
    #[must_use]
    pub fn selections(&self) -> &ScopeSelections {
        &self.selections
    }

    /// Returns whether the record is approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == OnboardingStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ScopeSelections, SelectionKey};

    #[test]
    fn selection_key_parses_form_field_names() {
        for key in SelectionKey::all() {
            assert_eq!(SelectionKey::from_str(key.as_str()).ok(), Some(*key));
        }
        assert!(SelectionKey::from_str("scopes_to_report_scope4").is_err());
    }

    #[test]
    fn selection_key_serializes_as_form_field_name() {
        let json = serde_json::to_string(&SelectionKey::Fugitive).unwrap_or_default();
        assert_eq!(json, "\"scope_1_options_fugitive\"");
    }

    #[test]
    fn child_flags_survive_without_parent() {
        let selections = ScopeSelections::from_keys(&[SelectionKey::Upstream]);
        assert!(!selections.is_selected(SelectionKey::Scope3));
        assert!(selections.is_selected(SelectionKey::Upstream));
        assert_eq!(
            selections.selected_keys().collect::<Vec<_>>(),
            vec![SelectionKey::Upstream]
        );
    }

    #[test]
    fn missing_flags_deserialize_as_unticked() {
        let selections: ScopeSelections =
            serde_json::from_str(r#"{"scope1": true}"#).unwrap_or_default();
        assert!(selections.scope1);
        assert!(!selections.stationary);
    }
}
