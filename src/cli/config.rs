use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::fs;

/// Optional settings file for the CLI; any field present overrides the
/// built-in default, and command-line flags override both.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub generate_custom_properties: Option<bool>,
    pub generate_custom_media: Option<bool>,
    pub custom_property_prefix: Option<String>,
    pub development: Option<bool>,
    pub performance_metrics: Option<bool>,
    pub validate_css: Option<bool>,
    pub enable_caching: Option<bool>,
    pub cache_size: Option<usize>,
    pub output_directory: Option<String>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    log::info!("Loaded configuration from {}", config_path);
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        TransformError::FileNotFound {
            path: format!("Config file {}: {}", config_path, e),
        }
    })?;

    if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| TransformError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| TransformError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })
    } else {
        Err(TransformError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_toml_config() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "custom_property_prefix = \"--app\"\ncache_size = 64").unwrap();

        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.custom_property_prefix.as_deref(), Some("--app"));
        assert_eq!(config.cache_size, Some(64));
        assert!(config.development.is_none());
    }

    #[test]
    fn test_load_json_config() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, "{{\"validate_css\": true, \"enable_caching\": false}}").unwrap();

        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.validate_css, Some(true));
        assert_eq!(config.enable_caching, Some(false));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = load("settings.yaml");
        assert!(matches!(result, Err(TransformError::FileNotFound { .. }) | Err(TransformError::InvalidFormat { .. })));
    }
}
