use async_trait::async_trait;
use launchpad_core::api::{
    AssessmentAnswers, AssessmentResult, AssessmentSubmission, PortfolioPayload, ProjectEntry,
    RoleApi, ScoringApi, StudentComment, WorkExperience,
};
use serde_json::Value;

use crate::http::{parse_json_response, parse_typed_response, HttpCallError};

const SERVICE: &str = "scoring";

/// Client for the scoring / portfolio API. No retries: every failure goes
/// straight back to the caller.
#[derive(Clone)]
pub struct ScoringHttpClient {
    api_key: String,
    http: reqwest::Client,
    // Pre-built URL endpoints
    url_generate: String,
    url_save: String,
    url_load: String,
    url_guest_assessment: String,
    base_url: String,
}

impl ScoringHttpClient {
    pub fn new(base_url: String, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            api_key,
            http,
            url_generate: format!("{}/portfolio/generate", normalized),
            url_save: format!("{}/portfolio/save", normalized),
            url_load: format!("{}/portfolio", normalized),
            url_guest_assessment: format!("{}/guest/assessment", normalized),
            base_url: normalized.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    async fn send(
        &self,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, HttpCallError> {
        self.auth(req)
            .send()
            .await
            .map_err(|err| HttpCallError::from_reqwest(SERVICE, err, url.to_string()))
    }

    /// Send with the caller's token instead of the service key.
    async fn send_as(
        &self,
        token: &str,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, HttpCallError> {
        req.bearer_auth(token)
            .send()
            .await
            .map_err(|err| HttpCallError::from_reqwest(SERVICE, err, url.to_string()))
    }

    async fn get_as(&self, token: &str, path: &str, stage: &str) -> anyhow::Result<Value> {
        let url = self.endpoint(path);
        tracing::debug!(target: "launchpad.api", stage = %format!("{stage}.in"), url = %url);
        let resp = self.send_as(token, &url, self.http.get(&url)).await?;
        let status = resp.status();
        let v = parse_json_response(SERVICE, resp).await?;
        tracing::debug!(target: "launchpad.api", stage = %format!("{stage}.out"), status = %status);
        Ok(v)
    }

    async fn post_as<B: serde::Serialize + ?Sized + Sync>(
        &self,
        token: &str,
        path: &str,
        body: &B,
        stage: &str,
    ) -> anyhow::Result<Value> {
        let url = self.endpoint(path);
        tracing::debug!(target: "launchpad.api", stage = %format!("{stage}.in"), url = %url);
        let resp = self
            .send_as(token, &url, self.http.post(&url).json(body))
            .await?;
        let status = resp.status();
        let v = parse_json_response(SERVICE, resp).await?;
        tracing::debug!(target: "launchpad.api", stage = %format!("{stage}.out"), status = %status);
        Ok(v)
    }
}

#[async_trait]
impl ScoringApi for ScoringHttpClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate_portfolio(&self, answers: &AssessmentAnswers) -> anyhow::Result<Value> {
        let url = &self.url_generate;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.generate.in",
            url = %url,
            answers = answers.len()
        );
        let resp = self.send(url, self.http.post(url).json(answers)).await?;
        let status = resp.status();
        let v = parse_json_response(SERVICE, resp).await?;
        tracing::debug!(target: "launchpad.api", stage = "scoring.http.generate.out", status = %status);
        Ok(v)
    }

    async fn save_portfolio(&self, payload: &PortfolioPayload) -> anyhow::Result<Value> {
        let url = &self.url_save;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.save.in",
            url = %url,
            user_id = %payload.user_id,
            strengths = payload.strengths.len(),
            gaps = payload.gaps.len()
        );
        let resp = self.send(url, self.http.post(url).json(payload)).await?;
        let status = resp.status();
        let v = parse_json_response(SERVICE, resp).await?;
        tracing::debug!(target: "launchpad.api", stage = "scoring.http.save.out", status = %status);
        Ok(v)
    }

    async fn load_portfolio(&self, user_id: &str) -> anyhow::Result<Value> {
        let url = &self.url_load;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.load.in",
            url = %url,
            user_id = %user_id
        );
        let req = self.http.get(url).query(&[("user_id", user_id)]);
        let resp = self.send(url, req).await?;
        let status = resp.status();
        let v = parse_json_response(SERVICE, resp).await?;
        tracing::debug!(target: "launchpad.api", stage = "scoring.http.load.out", status = %status);
        Ok(v)
    }

    async fn submit_guest_assessment(
        &self,
        answers: &AssessmentAnswers,
    ) -> anyhow::Result<AssessmentResult> {
        let url = &self.url_guest_assessment;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.assessment.in",
            url = %url,
            answers = answers.len()
        );
        let body = AssessmentSubmission { answers };
        let resp = self.send(url, self.http.post(url).json(&body)).await?;
        let status = resp.status();
        let result: AssessmentResult = parse_typed_response(SERVICE, resp).await?;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.assessment.out",
            status = %status,
            rankings = result.ranking.len()
        );
        Ok(result)
    }
}

/// `student_id` is placed in the path as-is; callers validate it first.
#[async_trait]
impl RoleApi for ScoringHttpClient {
    async fn submit_assessment(
        &self,
        token: &str,
        answers: &AssessmentAnswers,
    ) -> anyhow::Result<AssessmentResult> {
        let url = self.endpoint("/student/assessment");
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.student_assessment.in",
            url = %url,
            answers = answers.len()
        );
        let body = AssessmentSubmission { answers };
        let resp = self
            .send_as(token, &url, self.http.post(&url).json(&body))
            .await?;
        let status = resp.status();
        let result: AssessmentResult = parse_typed_response(SERVICE, resp).await?;
        tracing::debug!(
            target: "launchpad.api",
            stage = "scoring.http.student_assessment.out",
            status = %status,
            rankings = result.ranking.len()
        );
        Ok(result)
    }

    async fn student_profile(&self, token: &str) -> anyhow::Result<Value> {
        self.get_as(token, "/student/profile", "scoring.http.student_profile")
            .await
    }

    async fn add_work_experience(
        &self,
        token: &str,
        entry: &WorkExperience,
    ) -> anyhow::Result<Value> {
        self.post_as(
            token,
            "/student/work-experience",
            entry,
            "scoring.http.work_experience",
        )
        .await
    }

    async fn add_project(&self, token: &str, project: &ProjectEntry) -> anyhow::Result<Value> {
        self.post_as(token, "/student/project", project, "scoring.http.project")
            .await
    }

    async fn teacher_students(&self, token: &str) -> anyhow::Result<Value> {
        self.get_as(token, "/teacher/students", "scoring.http.teacher_students")
            .await
    }

    async fn teacher_student(&self, token: &str, student_id: &str) -> anyhow::Result<Value> {
        let path = format!("/teacher/student/{student_id}");
        self.get_as(token, &path, "scoring.http.teacher_student")
            .await
    }

    async fn add_comment(&self, token: &str, comment: &StudentComment) -> anyhow::Result<Value> {
        self.post_as(token, "/teacher/comment", comment, "scoring.http.comment")
            .await
    }

    async fn admin_students(&self, token: &str) -> anyhow::Result<Value> {
        self.get_as(token, "/admin/students", "scoring.http.admin_students")
            .await
    }

    async fn admin_student(&self, token: &str, student_id: &str) -> anyhow::Result<Value> {
        let path = format!("/admin/student/{student_id}");
        self.get_as(token, &path, "scoring.http.admin_student")
            .await
    }

    async fn school_stats(&self, token: &str) -> anyhow::Result<Value> {
        self.get_as(token, "/admin/stats", "scoring.http.school_stats")
            .await
    }
}
