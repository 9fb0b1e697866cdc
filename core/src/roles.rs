//! User roles and the dashboards they land on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RoleError;
use crate::gate::{normalize_path, Identity, SessionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub role: UserRole,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub year_level: Option<String>,
}

pub fn role_dashboard(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => "/student/",
        UserRole::Teacher => "/teacher/",
        UserRole::Admin => "/admin/",
    }
}

pub fn require_role(
    profile: Option<&UserProfile>,
    allowed: &[UserRole],
) -> Result<(), RoleError> {
    let profile = profile.ok_or(RoleError::NotAuthenticated)?;
    if allowed.contains(&profile.role) {
        Ok(())
    } else {
        Err(RoleError::Unauthorized)
    }
}

/// Where a signed-in user should be sent. No profile means back to login.
pub fn resolve_dashboard<'a>(profile: Option<&UserProfile>, login_path: &'a str) -> &'a str {
    match profile {
        Some(p) => role_dashboard(p.role),
        None => login_path,
    }
}

/// Redirect target for a page restricted to `allowed`, or `None` when the
/// profile may see it. A wrong role goes to its own dashboard.
pub fn role_redirect<'a>(
    profile: Option<&UserProfile>,
    allowed: &[UserRole],
    login_path: &'a str,
) -> Option<&'a str> {
    match (require_role(profile, allowed), profile) {
        (Ok(()), _) => None,
        (Err(RoleError::Unauthorized), Some(p)) => Some(role_dashboard(p.role)),
        (Err(_), _) => Some(login_path),
    }
}

/// A section of the site restricted to some roles, e.g. `/admin` for admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub prefix: String,
    pub roles: Vec<UserRole>,
}

impl RoleRule {
    pub fn new(prefix: impl Into<String>, roles: &[UserRole]) -> Self {
        Self {
            prefix: prefix.into(),
            roles: roles.to_vec(),
        }
    }

    /// Same segment-boundary rule as public paths: exact, or nested under `prefix/`.
    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Ordered role rules; the first matching prefix decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    rules: Vec<RoleRule>,
}

impl RoleTable {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    /// Roles allowed on `path`, or `None` when any signed-in user may see it.
    pub fn required_roles(&self, path: &str) -> Option<&[UserRole]> {
        let path = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(&path))
            .map(|rule| rule.roles.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Profile storage owned by the auth provider's database. Reads are made
/// on behalf of the requesting session.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile(
        &self,
        req: &SessionRequest,
        user: &Identity,
    ) -> anyhow::Result<Option<UserProfile>>;

    async fn school(
        &self,
        req: &SessionRequest,
        school_id: &str,
    ) -> anyhow::Result<Option<School>>;
}
