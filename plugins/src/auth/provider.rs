use async_trait::async_trait;
use launchpad_core::api::{
    AuthConfig, AuthProvider, Identity, ProfileLookup, School, SessionRefresh, SessionRequest,
    SetCookie, UserProfile,
};

use super::client::{AuthHttpClient, TokenGrant};

/// Session carried in an access/refresh cookie pair, validated against the
/// hosted auth service on every refresh.
pub struct CookieSessionProvider {
    client: AuthHttpClient,
    access_cookie: String,
    refresh_cookie: String,
    max_age: u64,
    secure: bool,
}

impl CookieSessionProvider {
    pub fn new(client: AuthHttpClient, cfg: &AuthConfig) -> Self {
        Self {
            client,
            access_cookie: cfg.access_cookie.clone(),
            refresh_cookie: cfg.refresh_cookie.clone(),
            max_age: cfg.cookie_max_age_secs,
            secure: cfg.cookie_secure,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let client = AuthHttpClient::new(cfg.base_url.clone(), cfg.anon_key.clone(), cfg.timeout_ms)?;
        Ok(Self::new(client, cfg))
    }

    fn issue(&self, access: &str, refresh: &str) -> Vec<SetCookie> {
        vec![
            SetCookie::new(&self.access_cookie, access, self.max_age).secure(self.secure),
            SetCookie::new(&self.refresh_cookie, refresh, self.max_age).secure(self.secure),
        ]
    }

    fn clear(&self) -> Vec<SetCookie> {
        vec![
            SetCookie::removal(&self.access_cookie).secure(self.secure),
            SetCookie::removal(&self.refresh_cookie).secure(self.secure),
        ]
    }

    fn granted(&self, grant: TokenGrant) -> SessionRefresh {
        let cookies = self.issue(&grant.access_token, &grant.refresh_token);
        SessionRefresh::authenticated(grant.user.into()).with_cookies(cookies)
    }
}

#[async_trait]
impl AuthProvider for CookieSessionProvider {
    fn name(&self) -> &str {
        "cookie-session"
    }

    async fn get_session(&self, req: &SessionRequest) -> anyhow::Result<Option<Identity>> {
        let Some(access) = req.cookie(&self.access_cookie) else {
            return Ok(None);
        };
        Ok(self.client.get_user(access).await?.map(Identity::from))
    }

    async fn refresh_session(&self, req: &SessionRequest) -> anyhow::Result<SessionRefresh> {
        let access = req.cookie(&self.access_cookie);
        let refresh = req.cookie(&self.refresh_cookie);

        if access.is_none() && refresh.is_none() {
            return Ok(SessionRefresh::anonymous());
        }

        if let Some(access) = access {
            if let Some(user) = self.client.get_user(access).await? {
                // Still valid: re-issue the same pair so the cookie lifetime slides.
                let cookies = match refresh {
                    Some(r) => self.issue(access, r),
                    None => vec![SetCookie::new(&self.access_cookie, access, self.max_age)
                        .secure(self.secure)],
                };
                return Ok(SessionRefresh::authenticated(user.into()).with_cookies(cookies));
            }
        }

        let Some(refresh) = refresh else {
            tracing::debug!(target: "launchpad.auth", "access token rejected, no refresh token");
            return Ok(SessionRefresh::anonymous().with_cookies(self.clear()));
        };

        match self.client.refresh(refresh).await? {
            Some(grant) => {
                tracing::debug!(
                    target: "launchpad.auth",
                    user_id = %grant.user.id,
                    expires_in = ?grant.expires_in,
                    "session rotated"
                );
                Ok(self.granted(grant))
            }
            None => {
                tracing::debug!(target: "launchpad.auth", "refresh token rejected");
                Ok(SessionRefresh::anonymous().with_cookies(self.clear()))
            }
        }
    }

    async fn sign_out(&self, req: &SessionRequest) -> anyhow::Result<Vec<SetCookie>> {
        if let Some(access) = req.cookie(&self.access_cookie) {
            if let Err(err) = self.client.logout(access).await {
                // Local cookies are cleared either way.
                tracing::warn!(target: "launchpad.auth", error = %err, "remote sign out failed");
            }
        }
        Ok(self.clear())
    }
}

#[async_trait]
impl ProfileLookup for CookieSessionProvider {
    async fn profile(
        &self,
        req: &SessionRequest,
        user: &Identity,
    ) -> anyhow::Result<Option<UserProfile>> {
        let Some(access) = req.cookie(&self.access_cookie) else {
            return Ok(None);
        };
        Ok(self.client.profile(access, &user.id).await?)
    }

    async fn school(
        &self,
        req: &SessionRequest,
        school_id: &str,
    ) -> anyhow::Result<Option<School>> {
        let Some(access) = req.cookie(&self.access_cookie) else {
            return Ok(None);
        };
        Ok(self.client.school(access, school_id).await?)
    }
}
