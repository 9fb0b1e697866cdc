//! ServicesFactory implementation: builds the auth and scoring collaborators from config.
use async_trait::async_trait;
use launchpad_core::api::{AppConfig, CliError, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError> {
        let (auth, profiles) = factory::build_auth(cfg)?;
        let (scoring, roles) = factory::build_scoring(cfg)?;
        tracing::info!(
            auth_url = %cfg.auth.base_url,
            scoring_url = %cfg.scoring_api.base_url,
            "services built"
        );
        Ok(Services {
            auth,
            profiles: Some(profiles),
            scoring,
            roles,
        })
    }
}
