pub mod auth;
pub mod factory;
pub mod http;
pub mod scoring;
pub mod services;
