use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    HomeDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("route entry must start with '/': {0:?}")]
    InvalidRoute(String),
    #[error("services factory missing (cannot build collaborators)")]
    MissingServices,
    #[error("login path {0} is gated by the access gate and would redirect to itself")]
    LoginPathProtected(String),
    #[error("gate.session_timeout_ms must be greater than 0")]
    ZeroSessionTimeout,
    #[error("role section {0} must be a protected route")]
    RolePathNotProtected(String),
    #[error("role section {0} allows no roles")]
    EmptyRoleRule(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("unauthorized")]
    Unauthorized,
}
