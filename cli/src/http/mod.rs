//! HTTP服务器模块 - 在访问控制之后提供页面、登出、角色跳转与评分服务透传

pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub use models::*;
pub use server::*;
pub use state::*;
