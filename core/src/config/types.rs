use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::RouteTable;
use crate::roles::{RoleRule, RoleTable, UserRole};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub scoring_api: ScoringApiConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "launchpad_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Static path tables and knobs for the access gate.
///
/// Both lists are ordered; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Prefixes excluded from the gate entirely (assets, API passthrough).
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// Paths reachable without a session. Matches the entry exactly or
    /// anything nested under `entry + "/"`.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Upper bound on a single session lookup. Expiry counts as "no user".
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Sections only some roles may open. Every prefix must be protected.
    #[serde(default = "default_role_paths")]
    pub role_paths: Vec<RoleRule>,
}

fn default_skip_prefixes() -> Vec<String> {
    vec!["/_next".into(), "/api".into(), "/favicon.ico".into()]
}

fn default_public_paths() -> Vec<String> {
    vec!["/login".into(), "/".into()]
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_session_timeout_ms() -> u64 {
    5_000
}

fn default_role_paths() -> Vec<RoleRule> {
    vec![
        RoleRule::new("/admin", &[UserRole::Admin]),
        RoleRule::new("/teacher", &[UserRole::Teacher]),
        RoleRule::new("/student", &[UserRole::Student]),
    ]
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: default_skip_prefixes(),
            public_paths: default_public_paths(),
            login_path: default_login_path(),
            session_timeout_ms: default_session_timeout_ms(),
            role_paths: default_role_paths(),
        }
    }
}

impl GateConfig {
    /// Validate the configured tables and build the classifier.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        for entry in self.skip_prefixes.iter().chain(self.public_paths.iter()) {
            if !entry.starts_with('/') {
                return Err(ConfigError::InvalidRoute(entry.clone()));
            }
        }
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::InvalidRoute(self.login_path.clone()));
        }
        if self.session_timeout_ms == 0 {
            return Err(ConfigError::ZeroSessionTimeout);
        }

        let table = RouteTable::new(self.skip_prefixes.clone(), self.public_paths.clone());
        if table.classify(&self.login_path).category.is_protected() {
            return Err(ConfigError::LoginPathProtected(self.login_path.clone()));
        }
        Ok(table)
    }

    /// Validate the role sections against the route table. A section that is
    /// public or skipped would never see a session, so it is rejected.
    pub fn role_table(&self) -> Result<RoleTable, ConfigError> {
        let routes = self.route_table()?;
        for rule in &self.role_paths {
            if !rule.prefix.starts_with('/') {
                return Err(ConfigError::InvalidRoute(rule.prefix.clone()));
            }
            if rule.roles.is_empty() {
                return Err(ConfigError::EmptyRoleRule(rule.prefix.clone()));
            }
            if !routes.classify(&rule.prefix).category.is_protected() {
                return Err(ConfigError::RolePathNotProtected(rule.prefix.clone()));
            }
        }
        Ok(RoleTable::new(self.role_paths.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_url")]
    pub base_url: String,

    /// Project key sent as the `apikey` header on every auth call.
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,

    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,

    #[serde(default = "default_cookie_max_age_secs")]
    pub cookie_max_age_secs: u64,

    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

fn default_auth_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_access_cookie() -> String {
    "lp-access-token".to_string()
}

fn default_refresh_cookie() -> String {
    "lp-refresh-token".to_string()
}

fn default_cookie_max_age_secs() -> u64 {
    60 * 60 * 24 * 7
}

fn default_cookie_secure() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_auth_url(),
            anon_key: String::new(),
            timeout_ms: default_timeout_ms(),
            access_cookie: default_access_cookie(),
            refresh_cookie: default_refresh_cookie(),
            cookie_max_age_secs: default_cookie_max_age_secs(),
            cookie_secure: default_cookie_secure(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ScoringApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for every path without an explicit route.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}
