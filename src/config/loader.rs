//! Configuration loading from disk.

use std::path::Path;

use crate::config::schema::RouterConfig;
use crate::error::ConfigError;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RouterConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Check field ranges and cross-field constraints.
pub fn validate(config: &RouterConfig) -> Result<(), ConfigError> {
    if config.retries.max_attempts == 0 {
        return Err(ConfigError::Invalid("retries.max_attempts must be at least 1".into()));
    }
    if config.retries.deadline_secs == 0 {
        return Err(ConfigError::Invalid("retries.deadline_secs must be positive".into()));
    }
    if config.probe.timeout_ms == 0 {
        return Err(ConfigError::Invalid("probe.timeout_ms must be positive".into()));
    }
    // Individual probes must give up well before the request deadline does.
    if config.probe.timeout_ms >= config.retries.deadline_secs * 1_000 {
        return Err(ConfigError::Invalid(
            "probe.timeout_ms must be shorter than retries.deadline_secs".into(),
        ));
    }
    if config.audit.enabled && config.audit.path.is_empty() {
        return Err(ConfigError::Invalid("audit.path must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PolicyKind;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        validate(&RouterConfig::default()).unwrap();
    }

    #[test]
    fn test_load_round_robin_config() {
        let path = std::env::temp_dir().join(format!("router-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            b"policy = \"round-robin\"\n\n[listener]\nbind_address = \"127.0.0.1:4100\"\n\n[retries]\nmax_attempts = 5\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.policy, PolicyKind::RoundRobin);
        assert_eq!(config.listener.bind_address, "127.0.0.1:4100");
        assert_eq!(config.retries.max_attempts, 5);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.probe.timeout_ms, 2_000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_probe_timeout_must_undercut_deadline() {
        let mut config = RouterConfig::default();
        config.probe.timeout_ms = 10_000;
        config.retries.deadline_secs = 10;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = RouterConfig::default();
        config.retries.max_attempts = 0;
        assert!(validate(&config).is_err());
    }
}
