//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `launchpad_core::api` instead of reaching into internal modules.

pub use crate::config::{
    get_launchpad_data_dir, load_default, load_from_path, AppConfig, AuthConfig, GateConfig,
    HttpServerConfig, LoggingConfig, ScoringApiConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::error::{CliError, ConfigError, RoleError};
pub use crate::gate::{
    normalize_path, AccessGate, AuthProvider, GateDecision, Identity, RouteCategory,
    RouteClassification, RouteTable, SessionRefresh, SessionRequest, SetCookie,
};
pub use crate::portfolio::{
    AssessmentAnswers, AssessmentResult, AssessmentSubmission, PortfolioPayload, ProjectEntry,
    RoleApi, ScoringApi, StudentComment, WorkExperience,
};
pub use crate::roles::{
    require_role, resolve_dashboard, role_dashboard, role_redirect, ProfileLookup, RoleRule,
    RoleTable, School, UserProfile, UserRole,
};
pub use crate::score::{
    match_quality_label, match_reasoning, normalize_score, rank_careers, CareerRanking,
    MatchQuality, RankedCareer,
};
