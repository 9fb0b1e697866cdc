use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use launchpad_core::gate::{AuthProvider, Identity, SessionRefresh, SessionRequest, SetCookie};

pub const ACCESS_COOKIE: &str = "lp-access-token";

/// Accepts exactly one access token and counts every provider call.
pub struct CountingAuth {
    valid_token: String,
    calls: AtomicUsize,
}

impl CountingAuth {
    pub fn new(valid_token: &str) -> Arc<Self> {
        Arc::new(Self {
            valid_token: valid_token.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, req: &SessionRequest) -> Option<Identity> {
        (req.cookie(ACCESS_COOKIE) == Some(self.valid_token.as_str())).then(|| Identity {
            id: "student-1".into(),
            email: Some("student@example.com".into()),
        })
    }
}

#[async_trait]
impl AuthProvider for CountingAuth {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get_session(&self, req: &SessionRequest) -> anyhow::Result<Option<Identity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(req))
    }

    async fn refresh_session(&self, req: &SessionRequest) -> anyhow::Result<SessionRefresh> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.lookup(req) {
            Some(user) => SessionRefresh::authenticated(user).with_cookies(vec![SetCookie::new(
                ACCESS_COOKIE,
                self.valid_token.clone(),
                3600,
            )]),
            None => SessionRefresh::anonymous(),
        })
    }

    async fn sign_out(&self, _req: &SessionRequest) -> anyhow::Result<Vec<SetCookie>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SetCookie::removal(ACCESS_COOKIE)])
    }
}
