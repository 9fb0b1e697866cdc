use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::score::CareerRanking;

/// Assessment answers keyed by question id.
pub type AssessmentAnswers = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSubmission<'a> {
    pub answers: &'a AssessmentAnswers,
}

/// Scoring API response to an assessment submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    #[serde(default)]
    pub ranking: Vec<CareerRanking>,
    /// Everything else the API returns (psychometrics, ids, ...), passed through.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPayload {
    pub user_id: String,
    #[serde(default)]
    pub strengths: Vec<Value>,
    #[serde(default)]
    pub gaps: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Body of `POST /student/work-experience`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub organisation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Body of `POST /student/project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Body of `POST /teacher/comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentComment {
    pub student_id: String,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
