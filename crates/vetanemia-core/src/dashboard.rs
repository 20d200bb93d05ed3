//! Clinic overview shown on the dashboard landing page.

use serde::{Deserialize, Serialize};

use crate::case::CaseId;

/// Period-over-period change of each headline counter, as ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryChanges {
    pub total_cases: f64,
    pub predictions_today: f64,
    pub accuracy_rate: f64,
    pub active_patients: f64,
}

/// Response of `GET /api/dashboard/summary/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    pub total_cases: u64,
    pub predictions_today: u64,
    pub active_patients: u64,
    /// Ratio in 0..1.
    pub accuracy_rate: f64,
    pub changes: SummaryChanges,
}

impl DashboardSummary {
    /// Accuracy as a percentage with one decimal, e.g. `92.3%`.
    pub fn accuracy_label(&self) -> String {
        format!("{}%", (self.accuracy_rate * 1000.0).round() / 10.0)
    }
}

/// A change ratio as a whole percentage, e.g. `0.125` becomes `13%`.
pub fn change_label(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round())
}

/// Item of `GET /api/dashboard/recent/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentCase {
    pub id: Option<CaseId>,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub patient_name: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub species: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub breed: String,
    /// "High Risk", "Medium Risk" or "Low Risk".
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub prediction: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub confidence: f64,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub date: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub status: String,
}
