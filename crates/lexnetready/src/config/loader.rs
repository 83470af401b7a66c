use std::path::{Path, PathBuf};

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.json";

/// Per-user config location, e.g. `~/.config/lexnetready/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lexnetready").join(CONFIG_FILE_NAME))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads `explicit` when given (it must exist), otherwise the default path
/// if a file is there, otherwise built-in defaults.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_config(path),
        _ => Ok(Config::default()),
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let name = config.output_directory_name.trim();
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(ConfigError::Validation {
            message: format!(
                "output_directory_name must be a plain folder name, got '{}'",
                config.output_directory_name
            ),
        });
    }

    let tools = &config.tools;
    let programs = [
        ("tools.converter.program", &tools.converter.program),
        ("tools.ocr.program", &tools.ocr.program),
        ("tools.signer.java", &tools.signer.java),
        ("tools.signer.jar", &tools.signer.jar),
        ("tools.signer.store", &tools.signer.store),
        ("tools.signer.format", &tools.signer.format),
        ("tools.inspector.program", &tools.inspector.program),
    ];
    for (field, value) in programs {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: format!("{} must not be empty", field),
            });
        }
    }

    for ext in &tools.converter.extensions {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::Validation {
                message: format!(
                    "Converter extensions are written without a dot, got '{}'",
                    ext
                ),
            });
        }
        if ext.eq_ignore_ascii_case("pdf") {
            return Err(ConfigError::Validation {
                message: "PDF sources are never converted; remove 'pdf' from tools.converter.extensions".to_string(),
            });
        }
    }

    Ok(())
}
