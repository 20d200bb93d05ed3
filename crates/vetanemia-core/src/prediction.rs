//! Prediction form collection and response-shape mapping.
//!
//! The backend owns the model; this module only turns what a clinician typed
//! into the request body of `POST /api/predict/`, and turns the raw response
//! into the risk summary shown to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Coarse anemia risk shown on results, case history and suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(CoreError::InvalidRiskLevel(s.to_string())),
        }
    }
}

/// Numeric lab panel as the backend names it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabValues {
    pub hb: f64,
    pub pcv: f64,
    pub tec: f64,
    pub tlc: f64,
    pub platelet: f64,
    pub mcv: f64,
    pub mchc: f64,
    pub reticulocyte: f64,
    pub bun: f64,
    pub creatinine: f64,
    pub alt: f64,
    pub ast: f64,
    pub glucose: f64,
}

/// Lab values exactly as typed into the form.
///
/// Hemoglobin, hematocrit, red blood cells, MCV and MCHC are required. MCH is
/// collected for the clinician's record but the backend does not take it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabForm {
    pub hemoglobin: String,
    pub hematocrit: String,
    pub red_blood_cells: String,
    pub mcv: String,
    pub mch: String,
    pub mchc: String,
    pub tlc: String,
    pub platelet: String,
    pub reticulocyte: String,
    pub bun: String,
    pub creatinine: String,
    pub alt: String,
    pub ast: String,
    pub glucose: String,
}

/// Patient details and lab values as typed into the prediction page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredictionForm {
    pub patient_name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub weight: String,
    pub gender: String,
    pub symptoms: String,
    pub lab_values: LabForm,
}

impl PredictionForm {
    /// Reads a saved form, e.g. one exported from a lab system.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the body of `POST /api/predict/`.
    ///
    /// Blank optional values are sent as zero; required values must parse.
    pub fn to_request(&self) -> Result<PredictionRequest> {
        let patient_id = self.patient_name.trim();
        if patient_id.is_empty() {
            return Err(CoreError::missing_field("patient name"));
        }

        let labs = &self.lab_values;
        Ok(PredictionRequest {
            patient_id: patient_id.to_string(),
            age: parse_required("age", &self.age)?,
            sex: self.gender.trim().to_string(),
            body_weight: parse_optional("weight", &self.weight)?,
            labs: LabValues {
                hb: parse_required("hemoglobin", &labs.hemoglobin)?,
                pcv: parse_required("hematocrit", &labs.hematocrit)?,
                tec: parse_required("red blood cells", &labs.red_blood_cells)?,
                tlc: parse_optional("tlc", &labs.tlc)?,
                platelet: parse_optional("platelet", &labs.platelet)?,
                mcv: parse_required("mcv", &labs.mcv)?,
                mchc: parse_required("mchc", &labs.mchc)?,
                reticulocyte: parse_optional("reticulocyte", &labs.reticulocyte)?,
                bun: parse_optional("bun", &labs.bun)?,
                creatinine: parse_optional("creatinine", &labs.creatinine)?,
                alt: parse_optional("alt", &labs.alt)?,
                ast: parse_optional("ast", &labs.ast)?,
                glucose: parse_optional("glucose", &labs.glucose)?,
            },
        })
    }
}

fn parse_required(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::missing_field(field));
    }
    parse_number(field, trimmed)
}

fn parse_optional(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    parse_number(field, trimmed)
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::invalid_lab_value(field, raw)),
    }
}

/// Body of `POST /api/predict/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub patient_id: String,
    pub age: f64,
    pub sex: String,
    pub body_weight: f64,
    #[serde(flatten)]
    pub labs: LabValues,
}

/// Raw classification returned by the backend. Every field is optional
/// because the backend is not validated on this side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anemia_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regeneration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prognosis: Option<String>,
}

impl RawPrediction {
    /// Risk level derived from severity and probability.
    ///
    /// Severe or moderate cases are High at p >= 0.7 and Medium otherwise;
    /// anything else is Medium at p >= 0.4 and Low below. A missing
    /// probability never crosses a threshold.
    pub fn risk_level(&self) -> RiskLevel {
        let p = self.probability.unwrap_or(0.0);
        let serious = matches!(self.severity.as_deref(), Some("Severe") | Some("Moderate"));
        match (serious, p) {
            (true, p) if p >= 0.7 => RiskLevel::High,
            (true, _) => RiskLevel::Medium,
            (false, p) if p >= 0.4 => RiskLevel::Medium,
            (false, _) => RiskLevel::Low,
        }
    }

    /// Closeness of the probability to the midpoint: 100 at p = 0.5, falling
    /// to 0 at either extreme. A missing probability counts as 0.5.
    pub fn confidence_percent(&self) -> u8 {
        let p = self.probability.unwrap_or(0.5);
        to_percent(1.0 - (0.5 - p).abs() * 2.0)
    }

    pub fn probability_percent(&self) -> u8 {
        to_percent(self.probability.unwrap_or(0.0))
    }

    /// The four labelled findings shown under the result.
    pub fn recommendations(&self) -> Vec<String> {
        recommendation_lines(
            self.severity.as_deref(),
            self.anemia_type.as_deref(),
            self.regeneration.as_deref(),
            self.prognosis.as_deref(),
        )
    }
}

pub(crate) fn recommendation_lines(
    severity: Option<&str>,
    anemia_type: Option<&str>,
    regeneration: Option<&str>,
    prognosis: Option<&str>,
) -> Vec<String> {
    let or_unknown = |v: Option<&str>| v.unwrap_or("Unknown").to_string();
    vec![
        format!("Severity: {}", or_unknown(severity)),
        format!("Type: {}", or_unknown(anemia_type)),
        format!("Regeneration: {}", or_unknown(regeneration)),
        format!("Prognosis: {}", or_unknown(prognosis)),
    ]
}

/// Converts a 0..1 ratio into a rounded, clamped percentage.
pub(crate) fn to_percent(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// A lab value's distance from its reference point, scaled to 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub impact: f64,
}

/// Result of a prediction, shaped for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub risk_level: RiskLevel,
    pub confidence: u8,
    pub probability: u8,
    pub recommendations: Vec<String>,
    pub factors: Vec<Factor>,
}

impl PredictionOutcome {
    pub fn from_response(raw: &RawPrediction, request: &PredictionRequest) -> Self {
        let labs = &request.labs;
        let factor = |name: &str, impact: f64| Factor {
            name: name.to_string(),
            impact: impact.min(100.0),
        };

        Self {
            risk_level: raw.risk_level(),
            confidence: raw.confidence_percent(),
            probability: raw.probability_percent(),
            recommendations: raw.recommendations(),
            factors: vec![
                factor("MCV", (70.0 - labs.mcv).abs()),
                factor("MCHC", (33.0 - labs.mchc).abs() * 2.0),
                factor("Hemoglobin", (12.0 - labs.hb).abs() * 8.0),
                factor("Hematocrit", (36.0 - labs.pcv).abs() * 3.0),
            ],
        }
    }
}
