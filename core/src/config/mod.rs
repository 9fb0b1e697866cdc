pub mod load;
pub mod types;

pub use load::{get_launchpad_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, AuthConfig, GateConfig, HttpServerConfig, LoggingConfig, ScoringApiConfig,
};
