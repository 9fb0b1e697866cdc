use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::gate::AuthProvider;
use crate::portfolio::{RoleApi, ScoringApi};
use crate::roles::ProfileLookup;

/// Collaborators the request pipeline is wired with.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Option<Arc<dyn ProfileLookup>>,
    pub scoring: Arc<dyn ScoringApi>,
    pub roles: Arc<dyn RoleApi>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        Self {
            cfg,
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(crate::error::ConfigError::MissingServices));
        };
        factory.build_services(&self.cfg).await
    }
}
