//! Audit module catalog.
//!
//! A section is the topic a conversation panel is about. It selects the
//! system instruction template and groups sessions and learnings.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The audit modules offered by the assistant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum AuditSection {
    #[default]
    #[strum(serialize = "Audit Observation")]
    #[serde(rename = "Audit Observation")]
    AuditObservation,
    #[strum(serialize = "Audit Plan")]
    #[serde(rename = "Audit Plan")]
    AuditPlan,
    #[strum(serialize = "Accounting Standards")]
    #[serde(rename = "Accounting Standards")]
    AccountingStandards,
    #[strum(serialize = "Regulatory Updates")]
    #[serde(rename = "Regulatory Updates")]
    RegulatoryUpdates,
    #[strum(serialize = "Tax Compliance")]
    #[serde(rename = "Tax Compliance")]
    TaxCompliance,
}

impl AuditSection {
    /// Uppercase label used in module banners and prompt focus tags.
    pub fn banner(&self) -> String {
        self.as_ref().to_uppercase()
    }

    /// Parses a section label, ignoring ASCII case.
    pub fn parse_loose(label: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        let trimmed = label.trim();
        Self::iter().find(|section| section.as_ref().eq_ignore_ascii_case(trimmed))
    }
}
