use std::sync::Arc;

use anyhow::Result;

use launchpad_core::api::{AppConfig, AuthProvider, ProfileLookup, RoleApi, ScoringApi};

use crate::auth::CookieSessionProvider;
use crate::scoring::ScoringHttpClient;

pub fn build_session_provider(cfg: &AppConfig) -> Result<Arc<CookieSessionProvider>> {
    Ok(Arc::new(CookieSessionProvider::from_config(&cfg.auth)?))
}

pub fn build_auth(cfg: &AppConfig) -> Result<(Arc<dyn AuthProvider>, Arc<dyn ProfileLookup>)> {
    let provider = build_session_provider(cfg)?;
    let auth: Arc<dyn AuthProvider> = provider.clone();
    let profiles: Arc<dyn ProfileLookup> = provider;
    Ok((auth, profiles))
}

/// One client serves both the guest/portfolio calls and the role calls.
pub fn build_scoring(cfg: &AppConfig) -> Result<(Arc<dyn ScoringApi>, Arc<dyn RoleApi>)> {
    let api = &cfg.scoring_api;
    let client = Arc::new(ScoringHttpClient::new(
        api.base_url.clone(),
        api.api_key.clone(),
        api.timeout_ms,
    )?);
    let scoring: Arc<dyn ScoringApi> = client.clone();
    let roles: Arc<dyn RoleApi> = client;
    Ok((scoring, roles))
}
