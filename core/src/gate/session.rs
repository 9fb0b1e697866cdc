use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authenticated identity as attested by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The parts of an inbound request an auth provider may look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequest {
    pub path: String,
    cookies: BTreeMap<String, String>,
}

impl SessionRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cookies: BTreeMap::new(),
        }
    }

    /// Build from a raw `Cookie` header (`a=1; b=2`). Malformed pairs are dropped.
    pub fn from_cookie_header(path: impl Into<String>, header: Option<&str>) -> Self {
        let mut req = Self::new(path);
        for pair in header.unwrap_or_default().split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            req.cookies.insert(name.to_string(), value.to_string());
        }
        req
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// View of this request as it would look after `cookies` were stored.
    pub fn with_set_cookies(mut self, cookies: &[SetCookie]) -> Self {
        for c in cookies {
            if c.is_removal() {
                self.cookies.remove(&c.name);
            } else {
                self.cookies.insert(c.name.clone(), c.value.clone());
            }
        }
        self
    }
}

/// A cookie the auth provider wants written back on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    /// `Some(0)` expires the cookie immediately.
    pub max_age: Option<u64>,
    pub secure: bool,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age: u64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: Some(max_age),
            secure: true,
        }
    }

    pub fn removal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            max_age: Some(0),
            secure: true,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }

    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", self.name, self.value);
        if let Some(age) = self.max_age {
            out.push_str(&format!("; Max-Age={age}"));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// Result of a session refresh: who the caller is, and what cookies to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRefresh {
    pub user: Option<Identity>,
    pub set_cookies: Vec<SetCookie>,
}

impl SessionRefresh {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: Identity) -> Self {
        Self {
            user: Some(user),
            set_cookies: Vec::new(),
        }
    }

    pub fn with_cookies(mut self, cookies: Vec<SetCookie>) -> Self {
        self.set_cookies = cookies;
        self
    }
}

/// External authentication collaborator.
///
/// Implementations may do network I/O and may fail; callers decide how a
/// failure is interpreted.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Read-only lookup of the current session.
    async fn get_session(&self, req: &SessionRequest) -> anyhow::Result<Option<Identity>>;

    /// Validate the session, rotating tokens when needed.
    async fn refresh_session(&self, req: &SessionRequest) -> anyhow::Result<SessionRefresh>;

    /// Revoke the session and return cookies that clear it client side.
    async fn sign_out(&self, req: &SessionRequest) -> anyhow::Result<Vec<SetCookie>>;
}
