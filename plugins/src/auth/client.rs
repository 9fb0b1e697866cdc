use launchpad_core::api::{Identity, School, UserProfile};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::http::{ensure_success, parse_typed_response, HttpCallError};

const SERVICE: &str = "auth";

const PROFILE_COLUMNS: &str = "id,role,full_name,email,school_id,year_level";
const SCHOOL_COLUMNS: &str = "id,name";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Identity {
            id: user.id,
            email: user.email,
        }
    }
}

/// Token pair issued by a refresh-token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// REST client for the hosted auth service (user, token, logout endpoints)
/// and the profile table behind it.
#[derive(Clone)]
pub struct AuthHttpClient {
    anon_key: String,
    http: reqwest::Client,
    url_user: String,
    url_refresh: String,
    url_logout: String,
    url_profiles: String,
    url_schools: String,
}

impl AuthHttpClient {
    pub fn new(base_url: String, anon_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            anon_key,
            http,
            url_user: format!("{}/auth/v1/user", normalized),
            url_refresh: format!("{}/auth/v1/token?grant_type=refresh_token", normalized),
            url_logout: format!("{}/auth/v1/logout", normalized),
            url_profiles: format!("{}/rest/v1/profiles", normalized),
            url_schools: format!("{}/rest/v1/schools", normalized),
        })
    }

    fn keyed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.anon_key.trim().is_empty() {
            req
        } else {
            req.header("apikey", &self.anon_key)
        }
    }

    async fn send(
        &self,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, HttpCallError> {
        self.keyed(req)
            .send()
            .await
            .map_err(|err| HttpCallError::from_reqwest(SERVICE, err, url.to_string()))
    }

    /// `Ok(None)` when the token is rejected; `Err` only for transport or
    /// unexpected statuses.
    pub async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, HttpCallError> {
        let url = &self.url_user;
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.user.in", url = %url);
        let resp = self
            .send(url, self.http.get(url).bearer_auth(access_token))
            .await?;
        let status = resp.status();
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.user.out", status = %status);
        if is_rejected(status) {
            return Ok(None);
        }
        parse_typed_response(SERVICE, resp).await.map(Some)
    }

    /// Exchange a refresh token for a new token pair. `Ok(None)` when the
    /// refresh token is invalid or already used.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<TokenGrant>, HttpCallError> {
        let url = &self.url_refresh;
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.refresh.in", url = %url);
        let req = self
            .http
            .post(url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let resp = self.send(url, req).await?;
        let status = resp.status();
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.refresh.out", status = %status);
        if is_rejected(status) {
            return Ok(None);
        }
        parse_typed_response(SERVICE, resp).await.map(Some)
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), HttpCallError> {
        let url = &self.url_logout;
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.logout.in", url = %url);
        let resp = self
            .send(url, self.http.post(url).bearer_auth(access_token))
            .await?;
        ensure_success(SERVICE, resp).await
    }

    /// Profile row for `user_id`, read with the user's own token.
    pub async fn profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<UserProfile>, HttpCallError> {
        let url = &self.url_profiles;
        let id_filter = format!("eq.{user_id}");
        let req = self
            .http
            .get(url)
            .query(&[("select", PROFILE_COLUMNS), ("id", id_filter.as_str())])
            .bearer_auth(access_token);
        let resp = self.send(url, req).await?;
        let status = resp.status();
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.profile.out", status = %status);
        if is_rejected(status) {
            return Ok(None);
        }
        let rows: Vec<UserProfile> = parse_typed_response(SERVICE, resp).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn school(
        &self,
        access_token: &str,
        school_id: &str,
    ) -> Result<Option<School>, HttpCallError> {
        let url = &self.url_schools;
        let id_filter = format!("eq.{school_id}");
        let req = self
            .http
            .get(url)
            .query(&[("select", SCHOOL_COLUMNS), ("id", id_filter.as_str())])
            .bearer_auth(access_token);
        let resp = self.send(url, req).await?;
        let status = resp.status();
        tracing::debug!(target: "launchpad.auth", stage = "auth.http.school.out", status = %status);
        if is_rejected(status) {
            return Ok(None);
        }
        let rows: Vec<School> = parse_typed_response(SERVICE, resp).await?;
        Ok(rows.into_iter().next())
    }
}

fn is_rejected(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpCallErrorKind;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> AuthHttpClient {
        AuthHttpClient::new(server.url(), "anon".into(), 1_000).unwrap()
    }

    #[tokio::test]
    async fn test_get_user_ok() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer tok")
            .match_header("apikey", "anon")
            .with_status(200)
            .with_body(r#"{"id":"u1","email":"a@b.c","aud":"authenticated"}"#)
            .create_async()
            .await;

        let user = client(&server).get_user("tok").await.unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_rejected_token() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        assert!(client(&server).get_user("expired").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_user_server_error_is_err() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/auth/v1/user")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(&server).get_user("tok").await.unwrap_err();
        assert_eq!(err.kind(), HttpCallErrorKind::Status);
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_refresh_grant() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .match_body(Matcher::Json(serde_json::json!({"refresh_token": "r1"})))
            .with_status(200)
            .with_body(
                r#"{"access_token":"a2","refresh_token":"r2","expires_in":3600,"user":{"id":"u1"}}"#,
            )
            .create_async()
            .await;

        let grant = client(&server).refresh("r1").await.unwrap().unwrap();
        assert_eq!(grant.access_token, "a2");
        assert_eq!(grant.refresh_token, "r2");
        assert_eq!(grant.user.id, "u1");
    }

    #[tokio::test]
    async fn test_profile_first_row() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.u1".into()),
                Matcher::UrlEncoded("select".into(), PROFILE_COLUMNS.into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id":"u1","role":"teacher","full_name":"T","email":"t@s.edu","school_id":"s1"}]"#)
            .create_async()
            .await;

        let profile = client(&server).profile("tok", "u1").await.unwrap().unwrap();
        assert_eq!(profile.role, launchpad_core::api::UserRole::Teacher);
    }

    #[tokio::test]
    async fn test_school_by_id() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/rest/v1/schools")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.s1".into()),
                Matcher::UrlEncoded("select".into(), SCHOOL_COLUMNS.into()),
            ]))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"[{"id":"s1","name":"Hillview High"}]"#)
            .create_async()
            .await;

        let school = client(&server).school("tok", "s1").await.unwrap().unwrap();
        assert_eq!(school.name, "Hillview High");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_profile_missing_row() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        assert!(client(&server).profile("tok", "u1").await.unwrap().is_none());
    }
}
