//! Case history records.
//!
//! Cases are stored by the backend and passed through unvalidated. The
//! `Raw*` types mirror the wire format loosely; [`CaseSummary`] is the shape
//! the case history view works with.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::prediction::{
    LabValues, PredictionForm, PredictionOutcome, PredictionRequest, RawPrediction, RiskLevel,
    recommendation_lines, to_percent,
};

/// Case identifiers arrive as numbers or strings depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A case as listed by `GET /api/cases/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCase {
    pub id: Option<CaseId>,
    pub patient_name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<f64>,
    pub created_at: Option<String>,
    pub risk_level: Option<String>,
    pub probability: Option<f64>,
    pub lab_values: Option<LabValues>,
    pub symptoms: Option<String>,
    pub severity: Option<String>,
    #[serde(rename = "anemia_type")]
    pub anemia_type: Option<String>,
    pub regeneration: Option<String>,
    pub prognosis: Option<String>,
}

impl RawCase {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// The prediction fields stored with this case.
    pub fn prediction(&self) -> RawPrediction {
        RawPrediction {
            probability: self.probability,
            severity: self.severity.clone(),
            anemia_type: self.anemia_type.clone(),
            regeneration: self.regeneration.clone(),
            prognosis: self.prognosis.clone(),
        }
    }

    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.as_deref().and_then(|r| r.parse().ok())
    }

    /// An unsaved case for a prediction just made, in the same shape the
    /// case history returns.
    pub fn from_prediction(
        form: &PredictionForm,
        request: &PredictionRequest,
        raw: &RawPrediction,
        outcome: &PredictionOutcome,
        now: OffsetDateTime,
    ) -> Self {
        let text = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_string());
        Self {
            id: None,
            patient_name: Some(request.patient_id.clone()),
            species: text(&form.species),
            breed: text(&form.breed),
            age: Some(request.age),
            created_at: now.format(&Rfc3339).ok(),
            risk_level: Some(outcome.risk_level.to_string()),
            probability: raw.probability,
            lab_values: Some(request.labs),
            symptoms: text(&form.symptoms),
            severity: raw.severity.clone(),
            anemia_type: raw.anemia_type.clone(),
            regeneration: raw.regeneration.clone(),
            prognosis: raw.prognosis.clone(),
        }
    }
}

/// Envelope of every list endpoint: `{ "results": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultList<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for ResultList<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

/// Lab values displayed in the case history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLabs {
    pub hemoglobin: f64,
    pub hematocrit: f64,
    pub red_blood_cells: f64,
}

/// A case shaped for the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub id: String,
    pub patient_name: String,
    pub species: String,
    pub breed: String,
    pub age: f64,
    pub owner: String,
    pub date: String,
    pub risk_level: Option<RiskLevel>,
    pub confidence: u8,
    pub probability: u8,
    pub status: String,
    pub lab_values: CaseLabs,
    pub symptoms: String,
    pub recommendations: Vec<String>,
}

impl CaseSummary {
    /// Maps a raw case. `now` stands in for a missing creation date.
    pub fn from_raw(raw: &RawCase, now: OffsetDateTime) -> Self {
        let or_unknown = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string()
        };
        // A zero probability is treated like a missing one here.
        let p = raw.probability.filter(|p| *p != 0.0).unwrap_or(0.5);
        let labs = raw.lab_values.unwrap_or_default();
        let date = match raw.created_at.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => now.format(&Rfc3339).unwrap_or_default(),
        };

        Self {
            id: raw.id_string(),
            patient_name: or_unknown(&raw.patient_name),
            species: or_unknown(&raw.species),
            breed: or_unknown(&raw.breed),
            age: raw.age.unwrap_or(0.0),
            owner: String::new(),
            date,
            risk_level: raw.risk(),
            confidence: to_percent(p.max(1.0 - p)),
            probability: to_percent(raw.probability.unwrap_or(0.0)),
            status: "completed".to_string(),
            lab_values: CaseLabs {
                hemoglobin: labs.hb,
                hematocrit: labs.pcv,
                red_blood_cells: labs.tec,
            },
            symptoms: raw.symptoms.clone().unwrap_or_default(),
            recommendations: recommendation_lines(
                raw.severity.as_deref(),
                raw.anemia_type.as_deref(),
                raw.regeneration.as_deref(),
                raw.prognosis.as_deref(),
            ),
        }
    }

    fn created_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.date, &Rfc3339).ok()
    }
}

/// Search and filter state of the case history view.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Case-insensitive match on patient name, owner or breed.
    pub search: String,
    pub risk: Option<RiskLevel>,
    pub status: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &CaseSummary) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = [&case.patient_name, &case.owner, &case.breed]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        let matches_status = self.status.as_ref().is_none_or(|s| s == &case.status);
        let matches_risk = self.risk.is_none_or(|r| case.risk_level == Some(r));

        matches_search && matches_status && matches_risk
    }

    pub fn apply<'a>(&self, cases: &'a [CaseSummary]) -> Vec<&'a CaseSummary> {
        cases.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Counters shown above the case history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub total: usize,
    pub high_risk: usize,
    pub pending: usize,
    pub this_week: usize,
}

impl CaseStats {
    pub fn from_cases(cases: &[CaseSummary], now: OffsetDateTime) -> Self {
        let week_ago = now - Duration::days(7);
        Self {
            total: cases.len(),
            high_risk: cases
                .iter()
                .filter(|c| c.risk_level == Some(RiskLevel::High))
                .count(),
            pending: cases.iter().filter(|c| c.status == "pending").count(),
            this_week: cases
                .iter()
                .filter(|c| c.created_at().is_some_and(|d| d >= week_ago))
                .count(),
        }
    }
}

/// Body of `POST /api/cases/create/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub patient_name: String,
    pub species: String,
    pub breed: String,
    pub age: f64,
    pub weight: f64,
    pub gender: String,
    pub symptoms: String,
    pub risk_level: RiskLevel,
    pub probability: u8,
    pub severity: String,
    #[serde(rename = "anemia_type")]
    pub anemia_type: String,
    pub regeneration: String,
    pub prognosis: String,
    pub lab_values: LabValues,
}

impl NewCase {
    /// Case record for a prediction the clinician chose to keep. Age and
    /// weight are sent as the numbers used for the prediction.
    pub fn from_prediction(
        form: &PredictionForm,
        request: &PredictionRequest,
        raw: &RawPrediction,
        outcome: &PredictionOutcome,
    ) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            patient_name: form.patient_name.clone(),
            species: form.species.clone(),
            breed: form.breed.clone(),
            age: request.age,
            weight: request.body_weight,
            gender: form.gender.clone(),
            symptoms: form.symptoms.clone(),
            risk_level: outcome.risk_level,
            probability: outcome.probability,
            severity: text(&raw.severity),
            anemia_type: text(&raw.anemia_type),
            regeneration: text(&raw.regeneration),
            prognosis: text(&raw.prognosis),
            lab_values: request.labs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-10 12:00 UTC);

    fn parse_list(json: &str) -> Vec<CaseSummary> {
        let list: ResultList<RawCase> = serde_json::from_str(json).unwrap();
        list.results
            .iter()
            .map(|c| CaseSummary::from_raw(c, NOW))
            .collect()
    }

    #[test]
    fn test_case_from_fresh_prediction() {
        let form = PredictionForm {
            patient_name: " Rex ".to_string(),
            species: "Canine".to_string(),
            age: "4".to_string(),
            lab_values: crate::prediction::LabForm {
                hemoglobin: "6".to_string(),
                hematocrit: "20".to_string(),
                red_blood_cells: "3".to_string(),
                mcv: "70".to_string(),
                mchc: "33".to_string(),
                ..Default::default()
            },
            ..PredictionForm::default()
        };
        let request = form.to_request().unwrap();
        let raw = RawPrediction {
            probability: Some(0.75),
            severity: Some("Moderate".to_string()),
            ..RawPrediction::default()
        };
        let outcome = PredictionOutcome::from_response(&raw, &request);

        let case = RawCase::from_prediction(&form, &request, &raw, &outcome, NOW);
        assert_eq!(case.patient_name.as_deref(), Some("Rex"));
        assert_eq!(case.breed, None);
        assert_eq!(case.risk(), Some(RiskLevel::High));
        assert_eq!(case.lab_values.map(|l| l.hb), Some(6.0));
        assert_eq!(case.created_at.as_deref(), Some("2025-03-10T12:00:00Z"));

        let summary = CaseSummary::from_raw(&case, NOW);
        assert_eq!(summary.probability, 75);
        assert_eq!(summary.breed, "Unknown");
    }

    #[test]
    fn test_maps_backend_case() {
        let cases = parse_list(
            r#"{"results":[{"id":12,"patientName":"Milo","species":"Feline","breed":"Siamese",
            "age":3,"createdAt":"2025-03-09T08:00:00Z","riskLevel":"High","probability":0.82,
            "labValues":{"hb":7.1,"pcv":21,"tec":3.9},"severity":"Severe","anemia_type":"Microcytic",
            "regeneration":"Regenerative","prognosis":"Guarded"}]}"#,
        );
        let c = &cases[0];
        assert_eq!(c.id, "12");
        assert_eq!(c.risk_level, Some(RiskLevel::High));
        assert_eq!(c.probability, 82);
        assert_eq!(c.confidence, 82);
        assert_eq!(c.lab_values.hematocrit, 21.0);
        assert_eq!(c.recommendations[1], "Type: Microcytic");
        assert_eq!(c.status, "completed");
    }

    #[test]
    fn test_maps_sparse_case_with_defaults() {
        let cases = parse_list(r#"{"results":[{"id":"abc"}]}"#);
        let c = &cases[0];
        assert_eq!(c.id, "abc");
        assert_eq!(c.patient_name, "Unknown");
        assert_eq!(c.breed, "Unknown");
        assert_eq!(c.age, 0.0);
        assert_eq!(c.confidence, 50);
        assert_eq!(c.probability, 0);
        assert_eq!(c.risk_level, None);
        assert_eq!(c.date, "2025-03-10T12:00:00Z");
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(parse_list("{}").is_empty());
    }

    #[test]
    fn test_low_probability_confidence_uses_complement() {
        let raw = RawCase {
            probability: Some(0.1),
            ..RawCase::default()
        };
        let c = CaseSummary::from_raw(&raw, NOW);
        assert_eq!(c.confidence, 90);
        assert_eq!(c.probability, 10);
    }

    #[test]
    fn test_filter_search_and_risk() {
        let cases = parse_list(
            r#"{"results":[
            {"id":1,"patientName":"Bella","breed":"Labrador","riskLevel":"High"},
            {"id":2,"patientName":"Max","breed":"Poodle","riskLevel":"Low"},
            {"id":3,"patientName":"Luna","breed":"Labrador Mix","riskLevel":"Low"}]}"#,
        );

        let filter = CaseFilter {
            search: "LABRADOR".to_string(),
            ..CaseFilter::default()
        };
        let ids: Vec<String> = filter.apply(&cases).iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let filter = CaseFilter {
            search: "lab".to_string(),
            risk: Some(RiskLevel::Low),
            ..CaseFilter::default()
        };
        let ids: Vec<String> = filter.apply(&cases).iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["3"]);

        let filter = CaseFilter {
            status: Some("pending".to_string()),
            ..CaseFilter::default()
        };
        assert!(filter.apply(&cases).is_empty());
    }

    #[test]
    fn test_stats_count_recent_and_high_risk() {
        let cases = parse_list(
            r#"{"results":[
            {"id":1,"riskLevel":"High","createdAt":"2025-03-08T00:00:00Z"},
            {"id":2,"riskLevel":"High","createdAt":"2025-02-01T00:00:00Z"},
            {"id":3,"riskLevel":"Medium","createdAt":"not a date"},
            {"id":4,"riskLevel":"Low"}]}"#,
        );
        let stats = CaseStats::from_cases(&cases, NOW);
        assert_eq!(
            stats,
            CaseStats {
                total: 4,
                high_risk: 2,
                pending: 0,
                this_week: 2,
            }
        );
    }

    #[test]
    fn test_new_case_wire_format() {
        let form = PredictionForm {
            patient_name: "Rex".to_string(),
            age: "4".to_string(),
            ..PredictionForm::default()
        };
        let raw = RawPrediction {
            probability: Some(0.9),
            severity: Some("Severe".to_string()),
            anemia_type: Some("Normocytic".to_string()),
            ..RawPrediction::default()
        };
        let request = PredictionRequest {
            patient_id: "Rex".to_string(),
            age: 4.0,
            sex: String::new(),
            body_weight: 12.5,
            labs: LabValues {
                hb: 6.0,
                ..LabValues::default()
            },
        };
        let outcome = PredictionOutcome {
            risk_level: RiskLevel::High,
            confidence: 20,
            probability: 90,
            recommendations: raw.recommendations(),
            factors: Vec::new(),
        };

        let json =
            serde_json::to_value(NewCase::from_prediction(&form, &request, &raw, &outcome))
                .unwrap();
        assert_eq!(json["patientName"], "Rex");
        assert_eq!(json["age"], 4.0);
        assert_eq!(json["weight"], 12.5);
        assert!(json["age"].is_number() && json["weight"].is_number());
        assert_eq!(json["riskLevel"], "High");
        assert_eq!(json["probability"], 90);
        assert_eq!(json["anemia_type"], "Normocytic");
        assert_eq!(json["regeneration"], "");
        assert_eq!(json["labValues"]["hb"], 6.0);
    }
}
