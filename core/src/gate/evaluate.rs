use std::sync::Arc;
use std::time::Duration;

use crate::config::GateConfig;
use crate::error::ConfigError;
use crate::roles::{RoleTable, UserRole};

use super::decision::GateDecision;
use super::routes::{RouteCategory, RouteClassification, RouteTable};
use super::session::{AuthProvider, SessionRefresh, SessionRequest};

/// Route classification plus session check, in front of every request.
///
/// Stateless between calls: each request is classified and resolved on its
/// own, with at most one call into the auth provider.
#[derive(Clone)]
pub struct AccessGate {
    routes: RouteTable,
    roles: RoleTable,
    auth: Arc<dyn AuthProvider>,
    login_path: String,
    session_timeout: Duration,
}

impl AccessGate {
    pub fn new(
        routes: RouteTable,
        auth: Arc<dyn AuthProvider>,
        login_path: impl Into<String>,
        session_timeout: Duration,
    ) -> Self {
        Self {
            routes,
            roles: RoleTable::default(),
            auth,
            login_path: login_path.into(),
            session_timeout,
        }
    }

    pub fn with_roles(mut self, roles: RoleTable) -> Self {
        self.roles = roles;
        self
    }

    pub fn from_config(cfg: &GateConfig, auth: Arc<dyn AuthProvider>) -> Result<Self, ConfigError> {
        let roles = cfg.role_table()?;
        Ok(Self::new(
            cfg.route_table()?,
            auth,
            cfg.login_path.clone(),
            Duration::from_millis(cfg.session_timeout_ms),
        )
        .with_roles(roles))
    }

    pub fn classify(&self, path: &str) -> RouteClassification {
        self.routes.classify(path)
    }

    /// Roles allowed on `path`; `None` when any signed-in user may see it.
    /// Only consulted after a protected route has resolved a user.
    pub fn required_roles(&self, path: &str) -> Option<&[UserRole]> {
        self.roles.required_roles(path)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub async fn evaluate(&self, req: &SessionRequest) -> GateDecision {
        let route = self.routes.classify(&req.path);

        let decision = match route.category {
            RouteCategory::Skipped => GateDecision::Forward,
            RouteCategory::Public => match self.refresh(req).await {
                Some(refresh) => GateDecision::ForwardWithSession(refresh),
                None => GateDecision::Forward,
            },
            RouteCategory::Protected => match self.refresh(req).await {
                Some(refresh) if refresh.user.is_some() => {
                    GateDecision::ForwardWithSession(refresh)
                }
                _ => GateDecision::Redirect {
                    location: self.login_path.clone(),
                },
            },
        };

        tracing::debug!(
            target: "launchpad.gate",
            path = %route.path,
            category = %route.category,
            decision = decision.as_str(),
        );
        decision
    }

    /// Fail closed: provider errors and timeouts both read as "no session".
    async fn refresh(&self, req: &SessionRequest) -> Option<SessionRefresh> {
        match tokio::time::timeout(self.session_timeout, self.auth.refresh_session(req)).await {
            Ok(Ok(refresh)) => Some(refresh),
            Ok(Err(err)) => {
                tracing::warn!(
                    target: "launchpad.gate",
                    provider = self.auth.name(),
                    path = %req.path,
                    error = %err,
                    "session refresh failed, treating request as anonymous"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    target: "launchpad.gate",
                    provider = self.auth.name(),
                    path = %req.path,
                    timeout_ms = self.session_timeout.as_millis() as u64,
                    "session refresh timed out, treating request as anonymous"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Identity, SetCookie};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Fail,
        Hang,
        User,
    }

    struct FlakyAuth {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FlakyAuth {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthProvider for FlakyAuth {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn get_session(&self, req: &SessionRequest) -> anyhow::Result<Option<Identity>> {
            Ok(self.refresh_session(req).await?.user)
        }

        async fn refresh_session(&self, _req: &SessionRequest) -> anyhow::Result<SessionRefresh> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Fail => anyhow::bail!("auth provider unreachable"),
                Behavior::Hang => std::future::pending().await,
                Behavior::User => Ok(SessionRefresh::authenticated(Identity {
                    id: "u-1".into(),
                    email: None,
                })
                .with_cookies(vec![SetCookie::new("lp-access-token", "t2", 60)])),
            }
        }

        async fn sign_out(&self, _req: &SessionRequest) -> anyhow::Result<Vec<SetCookie>> {
            Ok(vec![])
        }
    }

    fn gate(auth: Arc<FlakyAuth>) -> AccessGate {
        let cfg = GateConfig {
            session_timeout_ms: 50,
            ..GateConfig::default()
        };
        AccessGate::from_config(&cfg, auth).unwrap()
    }

    #[tokio::test]
    async fn test_provider_error_redirects_protected_route() {
        let auth = FlakyAuth::new(Behavior::Fail);
        let decision = gate(auth.clone())
            .evaluate(&SessionRequest::new("/dashboard"))
            .await;
        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: "/login".into()
            }
        );
        assert_eq!(auth.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_error_still_forwards_public_route() {
        let auth = FlakyAuth::new(Behavior::Fail);
        let decision = gate(auth).evaluate(&SessionRequest::new("/login")).await;
        assert_eq!(decision, GateDecision::Forward);
    }

    #[tokio::test]
    async fn test_hanging_provider_times_out_closed() {
        let auth = FlakyAuth::new(Behavior::Hang);
        let decision = gate(auth)
            .evaluate(&SessionRequest::new("/student/portfolio"))
            .await;
        assert!(matches!(decision, GateDecision::Redirect { ref location } if location == "/login"));
    }

    #[tokio::test]
    async fn test_hanging_provider_on_public_route_forwards() {
        let auth = FlakyAuth::new(Behavior::Hang);
        let decision = gate(auth).evaluate(&SessionRequest::new("/")).await;
        assert_eq!(decision, GateDecision::Forward);
    }

    #[tokio::test]
    async fn test_custom_login_path_is_used_for_redirect() {
        let cfg = GateConfig {
            public_paths: vec!["/signin".into()],
            login_path: "/signin".into(),
            ..GateConfig::default()
        };
        let gate = AccessGate::from_config(&cfg, FlakyAuth::new(Behavior::Fail)).unwrap();
        assert_eq!(gate.login_path(), "/signin");
        let decision = gate.evaluate(&SessionRequest::new("/admin")).await;
        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: "/signin".into()
            }
        );
    }

    #[test]
    fn test_from_config_loads_role_sections() {
        let gate = gate(FlakyAuth::new(Behavior::User));
        assert_eq!(gate.required_roles("/admin/reports"), Some(&[UserRole::Admin][..]));
        assert_eq!(gate.required_roles("/dashboard"), None);
    }

    #[tokio::test]
    async fn test_doubled_slash_path_is_protected() {
        let auth = FlakyAuth::new(Behavior::Fail);
        let decision = gate(auth)
            .evaluate(&SessionRequest::new("//dashboard"))
            .await;
        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: "/login".into()
            }
        );
    }

    #[tokio::test]
    async fn test_authenticated_protected_route_carries_cookies() {
        let auth = FlakyAuth::new(Behavior::User);
        let decision = gate(auth).evaluate(&SessionRequest::new("/admin/reports")).await;
        let GateDecision::ForwardWithSession(refresh) = decision else {
            panic!("expected forward with session");
        };
        assert_eq!(refresh.user.unwrap().id, "u-1");
        assert_eq!(refresh.set_cookies.len(), 1);
    }
}
