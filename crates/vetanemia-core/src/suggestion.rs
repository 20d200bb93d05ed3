//! AI clinical suggestion payloads.

use serde::{Deserialize, Serialize};

use crate::case::RawCase;
use crate::prediction::{LabValues, RawPrediction};

/// Number of suggestions the compact panel shows.
pub const COMPACT_LIMIT: usize = 5;

/// Prediction context sent to `POST /api/ai/suggestions/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPrediction {
    #[serde(flatten)]
    pub prediction: RawPrediction,
    pub lab_parameters: LabValues,
}

/// Patient context sent to `POST /api/ai/suggestions/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPatient {
    pub species: String,
    pub age: f64,
    pub risk_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub prediction: SuggestionPrediction,
    pub patient: SuggestionPatient,
}

impl SuggestionRequest {
    /// Request for a stored case from the case history.
    pub fn for_case(case: &RawCase) -> Self {
        Self {
            prediction: SuggestionPrediction {
                prediction: case.prediction(),
                lab_parameters: case.lab_values.unwrap_or_default(),
            },
            patient: SuggestionPatient {
                species: case.species.clone().unwrap_or_default(),
                age: case.age.unwrap_or(0.0),
                risk_level: case.risk_level.clone().unwrap_or_default(),
            },
        }
    }
}

/// One generated suggestion.
///
/// `kind` is usually one of diagnostic, treatment, monitoring or preventive;
/// `priority` one of high, medium or low. Both are kept as free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "crate::nullable::or_default")]
    pub kind: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub priority: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub title: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub description: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub reasoning: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub confidence: f64,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub timeframe: String,
    #[serde(deserialize_with = "crate::nullable::or_default")]
    pub related_factors: Vec<String>,
}

/// Response of `POST /api/ai/suggestions/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// Response of `GET /api/ai/stats/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiStats {
    pub total_suggestions: u64,
    pub high_priority: u64,
    pub implemented: u64,
    pub avg_accuracy: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionFilter {
    pub kind: Option<String>,
    pub priority: Option<String>,
}

impl SuggestionFilter {
    pub fn matches(&self, s: &Suggestion) -> bool {
        let same = |want: &Option<String>, got: &str| {
            want.as_deref().is_none_or(|w| w.eq_ignore_ascii_case(got))
        };
        same(&self.kind, &s.kind) && same(&self.priority, &s.priority)
    }

    /// Filtered suggestions, truncated to the compact panel unless `show_all`.
    pub fn apply<'a>(&self, suggestions: &'a [Suggestion], show_all: bool) -> Vec<&'a Suggestion> {
        let limit = if show_all { usize::MAX } else { COMPACT_LIMIT };
        suggestions
            .iter()
            .filter(|s| self.matches(s))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: usize, kind: &str, priority: &str) -> Suggestion {
        Suggestion {
            id: id.to_string(),
            kind: kind.to_string(),
            priority: priority.to_string(),
            ..Suggestion::default()
        }
    }

    #[test]
    fn test_request_for_case_wire_format() {
        let case: RawCase = serde_json::from_str(
            r#"{"id":4,"species":"Canine","age":6,"riskLevel":"Medium","probability":0.55,
            "severity":"Mild","anemia_type":"Macrocytic","labValues":{"hb":10.2,"mcv":80}}"#,
        )
        .unwrap();
        let json = serde_json::to_value(SuggestionRequest::for_case(&case)).unwrap();

        assert_eq!(json["prediction"]["probability"], 0.55);
        assert_eq!(json["prediction"]["anemia_type"], "Macrocytic");
        assert_eq!(json["prediction"]["lab_parameters"]["mcv"], 80.0);
        assert_eq!(json["prediction"]["lab_parameters"]["pcv"], 0.0);
        assert_eq!(json["patient"]["species"], "Canine");
        assert_eq!(json["patient"]["riskLevel"], "Medium");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let resp: SuggestionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.suggestions.is_empty());

        let resp: SuggestionResponse = serde_json::from_str(
            r#"{"suggestions":[{"id":"s1","type":"diagnostic","priority":"high",
            "title":"Reticulocyte count","relatedFactors":["MCV"]}]}"#,
        )
        .unwrap();
        assert_eq!(resp.suggestions[0].kind, "diagnostic");
        assert_eq!(resp.suggestions[0].related_factors, vec!["MCV"]);
        assert_eq!(resp.suggestions[0].confidence, 0.0);
    }

    #[test]
    fn test_null_fields_keep_the_list() {
        let resp: SuggestionResponse = serde_json::from_str(
            r#"{"suggestions":[
                {"id":"s1","type":"treatment","priority":"high","title":"Transfuse",
                 "reasoning":null,"confidence":null,"timeframe":null,"relatedFactors":null},
                {"id":null,"type":null,"priority":null,"title":"Recheck PCV"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.suggestions.len(), 2);
        assert_eq!(resp.suggestions[0].title, "Transfuse");
        assert_eq!(resp.suggestions[0].reasoning, "");
        assert_eq!(resp.suggestions[0].confidence, 0.0);
        assert!(resp.suggestions[0].related_factors.is_empty());
        assert_eq!(resp.suggestions[1].kind, "");
        assert_eq!(resp.suggestions[1].title, "Recheck PCV");
    }

    #[test]
    fn test_filter_and_compact_limit() {
        let items: Vec<Suggestion> = (0..8)
            .map(|i| suggestion(i, if i % 2 == 0 { "treatment" } else { "monitoring" }, "high"))
            .collect();

        assert_eq!(SuggestionFilter::default().apply(&items, false).len(), 5);
        assert_eq!(SuggestionFilter::default().apply(&items, true).len(), 8);

        let filter = SuggestionFilter {
            kind: Some("Treatment".to_string()),
            priority: Some("high".to_string()),
        };
        assert_eq!(filter.apply(&items, true).len(), 4);

        let filter = SuggestionFilter {
            priority: Some("low".to_string()),
            ..SuggestionFilter::default()
        };
        assert!(filter.apply(&items, true).is_empty());
    }

    #[test]
    fn test_stats_defaults() {
        let stats: AiStats = serde_json::from_str(r#"{"totalSuggestions":12}"#).unwrap();
        assert_eq!(stats.total_suggestions, 12);
        assert_eq!(stats.avg_accuracy, 0.0);
    }
}
