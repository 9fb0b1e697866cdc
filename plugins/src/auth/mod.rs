pub mod client;
pub mod provider;

pub use client::{AuthHttpClient, AuthUser, TokenGrant};
pub use provider::CookieSessionProvider;
