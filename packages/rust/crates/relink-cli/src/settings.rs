//! Settings loader for the relink binary.
//!
//! Loads `RelinkConfig` from YAML:
//! - explicit `--config <file>`: must exist and parse
//! - otherwise `./relink.yaml` when present; unreadable or invalid files are
//!   logged and ignored
//!
//! Command-line flags override file settings.

use std::path::Path;

use anyhow::Context;
use relink_edit::RelinkConfig;

use crate::cli::Cli;

const DEFAULT_SETTINGS_PATH: &str = "relink.yaml";

pub(crate) fn load_settings(explicit: Option<&Path>) -> anyhow::Result<RelinkConfig> {
    let Some(path) = explicit else {
        return Ok(load_one(Path::new(DEFAULT_SETTINGS_PATH)));
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

fn load_one(path: &Path) -> RelinkConfig {
    if !path.exists() {
        return RelinkConfig::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RelinkConfig::default();
        }
    };
    match serde_yaml::from_str::<RelinkConfig>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RelinkConfig::default()
        }
    }
}

pub(crate) fn apply_overrides(config: &mut RelinkConfig, cli: &Cli) {
    if let Some(prefix) = &cli.prefix {
        config.prefix.clone_from(prefix);
    }
    if let Some(suffix) = &cli.suffix {
        config.suffix.clone_from(suffix);
    }
    if let Some(patch) = &cli.patch {
        config.patch.file = Some(patch.clone());
    }
}
