use async_trait::async_trait;
use serde_json::Value;

use super::models::{
    AssessmentAnswers, AssessmentResult, PortfolioPayload, ProjectEntry, StudentComment,
    WorkExperience,
};

/// Remote scoring / portfolio API. Responses other than the assessment
/// ranking are opaque JSON.
#[async_trait]
pub trait ScoringApi: Send + Sync {
    fn name(&self) -> &str;
    async fn generate_portfolio(&self, answers: &AssessmentAnswers) -> anyhow::Result<Value>;
    async fn save_portfolio(&self, payload: &PortfolioPayload) -> anyhow::Result<Value>;
    async fn load_portfolio(&self, user_id: &str) -> anyhow::Result<Value>;
    async fn submit_guest_assessment(
        &self,
        answers: &AssessmentAnswers,
    ) -> anyhow::Result<AssessmentResult>;
}

/// Role-scoped endpoints of the same API. Every call is made with the
/// caller's own access token; the API decides what that token may see.
#[async_trait]
pub trait RoleApi: Send + Sync {
    async fn submit_assessment(
        &self,
        token: &str,
        answers: &AssessmentAnswers,
    ) -> anyhow::Result<AssessmentResult>;
    async fn student_profile(&self, token: &str) -> anyhow::Result<Value>;
    async fn add_work_experience(
        &self,
        token: &str,
        entry: &WorkExperience,
    ) -> anyhow::Result<Value>;
    async fn add_project(&self, token: &str, project: &ProjectEntry) -> anyhow::Result<Value>;

    async fn teacher_students(&self, token: &str) -> anyhow::Result<Value>;
    async fn teacher_student(&self, token: &str, student_id: &str) -> anyhow::Result<Value>;
    async fn add_comment(&self, token: &str, comment: &StudentComment) -> anyhow::Result<Value>;

    async fn admin_students(&self, token: &str) -> anyhow::Result<Value>;
    async fn admin_student(&self, token: &str, student_id: &str) -> anyhow::Result<Value>;
    async fn school_stats(&self, token: &str) -> anyhow::Result<Value>;
}
