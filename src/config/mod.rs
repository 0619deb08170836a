//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Example configuration written by `sirenbox init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../sirenbox.example.yaml");

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SirenboxConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let config: SirenboxConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the built-in defaults
pub fn load_or_default(path: &Path) -> Result<SirenboxConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(?path, "no config file, using built-in defaults");
        Ok(SirenboxConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ParamId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
osc:
  host: 192.168.1.20
  port: 57121

engine:
  tick_hz: 100
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.osc.host, "192.168.1.20");
        assert_eq!(config.engine.tick_hz, 100.0);
        assert_eq!(config.outputs.len(), 13);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let yaml = r#"
parameters:
  delay_time:
    default: 0.5
    min: 2.0
    max: 0.03
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("delay_time"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: SirenboxConfig = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.parameters[&ParamId::Volume].instant);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, SirenboxConfig::default());
    }
}
