//! Error type and response helpers shared by the HTTP collaborators.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpCallErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl HttpCallErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HttpCallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct HttpCallError {
    service: &'static str,
    kind: HttpCallErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl HttpCallError {
    pub fn kind(&self) -> HttpCallErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            HttpCallErrorKind::Timeout
        } else if err.is_connect() {
            HttpCallErrorKind::Connect
        } else if err.is_request() {
            HttpCallErrorKind::Request
        } else if err.is_body() {
            HttpCallErrorKind::Body
        } else if err.is_decode() {
            HttpCallErrorKind::Decode
        } else {
            HttpCallErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        HttpCallError {
            service,
            kind,
            status,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(
        service: &'static str,
        status: u16,
        url: String,
        preview: String,
    ) -> Self {
        HttpCallError {
            service,
            kind: HttpCallErrorKind::Status,
            status: Some(status),
            url: Some(url),
            message: preview,
            source: None,
        }
    }

    pub(crate) fn decode_error(
        service: &'static str,
        status: u16,
        url: String,
        err: serde_json::Error,
        preview: String,
    ) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        HttpCallError {
            service,
            kind: HttpCallErrorKind::Decode,
            status: Some(status),
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for HttpCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} http error kind={}", self.service, self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for HttpCallError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Read the body, fail on non-2xx, decode JSON. An empty 2xx body is `null`.
pub(crate) async fn parse_json_response(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<Value, HttpCallError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| HttpCallError::from_reqwest(service, err, url.clone()))?;

    if !status.is_success() {
        let preview = preview_body(&body);
        return Err(HttpCallError::status_error(
            service,
            status.as_u16(),
            url,
            preview,
        ));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&body).map_err(|err| {
        let preview = preview_body(&body);
        HttpCallError::decode_error(service, status.as_u16(), url, err, preview)
    })
}

/// Like [`parse_json_response`] but into a typed body.
pub(crate) async fn parse_typed_response<T: DeserializeOwned>(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<T, HttpCallError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| HttpCallError::from_reqwest(service, err, url.clone()))?;

    if !status.is_success() {
        let preview = preview_body(&body);
        return Err(HttpCallError::status_error(
            service,
            status.as_u16(),
            url,
            preview,
        ));
    }

    serde_json::from_str::<T>(&body).map_err(|err| {
        let preview = preview_body(&body);
        HttpCallError::decode_error(service, status.as_u16(), url, err, preview)
    })
}

pub(crate) async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<(), HttpCallError> {
    let status = resp.status();
    let url = resp.url().to_string();

    if status.is_success() {
        return Ok(());
    }

    let body = resp
        .text()
        .await
        .map_err(|err| HttpCallError::from_reqwest(service, err, url.clone()))?;
    let preview = preview_body(&body);
    Err(HttpCallError::status_error(
        service,
        status.as_u16(),
        url,
        preview,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_display_status() {
        let err = HttpCallError::status_error(
            "scoring",
            502,
            "https://api.example.com/portfolio/save".to_string(),
            "bad gateway".to_string(),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("scoring http error kind=status"));
        assert!(msg.contains("status=502"));
        assert!(msg.contains("url=https://api.example.com/portfolio/save"));
        assert!(msg.contains("bad gateway"));
        assert_eq!(err.kind(), HttpCallErrorKind::Status);
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_display_decode() {
        let decode_err = serde_json::from_str::<Value>("not json").unwrap_err();
        let err = HttpCallError::decode_error(
            "auth",
            200,
            "https://auth.example.com/auth/v1/user".to_string(),
            decode_err,
            "not json".to_string(),
        );
        let msg = err.to_string();
        assert!(msg.contains("kind=decode"));
        assert!(msg.contains("failed to decode response body"));
        assert!(err.source().is_some());
        assert_eq!(err.url(), Some("https://auth.example.com/auth/v1/user"));
    }
}
