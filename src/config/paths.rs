//! Path management for kubectl-sealer
//!
//! ## Path Resolution Order
//!
//! 1. `KUBECTL_SEALER_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory joined with `kubectl-sealer`
//!    (`~/.config/kubectl-sealer` on Linux)

use std::path::PathBuf;

use crate::error::SealerError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KUBECTL_SEALER_CONFIG_DIR";

const APP_DIR_NAME: &str = "kubectl-sealer";

/// Manages the paths used by kubectl-sealer
#[derive(Debug, Clone)]
pub struct SealerPaths {
    base_dir: PathBuf,
}

impl SealerPaths {
    /// Resolve the config directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, SealerError> {
        let base_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create SealerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }
}

fn resolve_default_path() -> Result<PathBuf, SealerError> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(APP_DIR_NAME))
        .ok_or_else(|| SealerError::Config("Could not determine home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SealerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(
            paths.settings_file(),
            temp_dir.path().join("settings.json")
        );
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(CONFIG_DIR_ENV, temp_dir.path());
        let paths = SealerPaths::new().unwrap();
        env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }
}
