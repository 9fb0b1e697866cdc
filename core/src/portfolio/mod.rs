pub mod models;
pub mod r#trait;

pub use models::{
    AssessmentAnswers, AssessmentResult, AssessmentSubmission, PortfolioPayload, ProjectEntry,
    StudentComment, WorkExperience,
};
pub use r#trait::{RoleApi, ScoringApi};
