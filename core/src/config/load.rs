use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::error::ConfigError;

/// Get the default launchpad data directory: ~/.launchpad
pub fn get_launchpad_data_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::HomeDir)?;
    Ok(PathBuf::from(home).join(".launchpad"))
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    // Priority 1: ~/.launchpad/config.toml (highest)
    let user_config = get_launchpad_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        read_config(&user_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load one explicit file, then apply environment overrides.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    apply_env_overrides_from(cfg, |key| std::env::var(key).ok());
}

// Environment variable overrides (Priority 0: highest). Blank values are ignored.
fn apply_env_overrides_from(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("LAUNCHPAD_API_URL") {
        cfg.scoring_api.base_url = v;
    }
    if let Some(v) = get("LAUNCHPAD_API_KEY") {
        cfg.scoring_api.api_key = v;
    }
    if let Some(v) = get("LAUNCHPAD_AUTH_URL") {
        cfg.auth.base_url = v;
    }
    if let Some(v) = get("LAUNCHPAD_AUTH_ANON_KEY") {
        cfg.auth.anon_key = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [http_server]
            port = 4100

            [scoring_api]
            base_url = "https://scores.example.com"
            "#
        )
        .unwrap();

        let cfg = read_config(file.path()).unwrap();
        assert_eq!(cfg.http_server.port, 4100);
        assert_eq!(cfg.scoring_api.base_url, "https://scores.example.com");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let err = load_from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_from_path_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gate\nlogin_path = 3").unwrap();
        let err = read_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LAUNCHPAD_API_URL", "https://api.example.com"),
            ("LAUNCHPAD_AUTH_URL", "   "),
            ("LAUNCHPAD_AUTH_ANON_KEY", "anon"),
        ]);
        let mut cfg = AppConfig::default();
        apply_env_overrides_from(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.scoring_api.base_url, "https://api.example.com");
        assert_eq!(cfg.auth.base_url, "http://localhost:54321");
        assert_eq!(cfg.auth.anon_key, "anon");
        assert!(cfg.scoring_api.api_key.is_empty());
    }
}
