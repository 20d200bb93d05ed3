//! Domain types for the VetAnemia clinical dashboard client.
//!
//! Everything here is pure data plus the response-shape mapping the
//! dashboard applies to backend payloads. Network access lives in
//! `vetanemia-client`, session state in `vetanemia-session`.

pub mod case;
pub mod dashboard;
pub mod error;
mod nullable;
pub mod prediction;
pub mod suggestion;
pub mod user;

pub use case::{CaseFilter, CaseId, CaseStats, CaseSummary, NewCase, RawCase, ResultList};
pub use dashboard::{DashboardSummary, RecentCase, SummaryChanges, change_label};
pub use error::{CoreError, Result};
pub use prediction::{
    Factor, LabForm, LabValues, PredictionForm, PredictionOutcome, PredictionRequest,
    RawPrediction, RiskLevel,
};
pub use suggestion::{
    AiStats, Suggestion, SuggestionFilter, SuggestionRequest, SuggestionResponse,
};
pub use user::{LoginRequest, LoginResponse, ProfileUpdate, ProfileUpdateResponse, SessionUser};
