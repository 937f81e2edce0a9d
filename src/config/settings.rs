//! Settings for kubectl-sealer
//!
//! Read from `settings.json` in the config directory; every field is
//! optional. Environment variables override the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::paths::SealerPaths;
use crate::error::SealerError;

pub const CONTROLLER_NAMESPACE_ENV: &str = "SEALED_SECRETS_CONTROLLER_NAMESPACE";
pub const KUBESEAL_ENV: &str = "KUBECTL_SEALER_KUBESEAL";
pub const KUBECTL_ENV: &str = "KUBECTL_SEALER_KUBECTL";
pub const CERT_ENV: &str = "KUBECTL_SEALER_CERT";

/// Settings for kubectl-sealer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Namespace the sealed-secrets controller runs in
    #[serde(default = "default_controller_namespace")]
    pub controller_namespace: String,

    /// kubeseal binary
    #[serde(default = "default_kubeseal_path")]
    pub kubeseal_path: String,

    /// kubectl binary
    #[serde(default = "default_kubectl_path")]
    pub kubectl_path: String,

    /// Editor command used when neither `$VISUAL` nor `$EDITOR` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Public certificate for offline sealing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<PathBuf>,

    /// Prefix of temporary files holding plaintext or keys
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
}

fn default_controller_namespace() -> String {
    "kube-system".to_string()
}

fn default_kubeseal_path() -> String {
    "kubeseal".to_string()
}

fn default_kubectl_path() -> String {
    "kubectl".to_string()
}

fn default_temp_prefix() -> String {
    "kubectl-sealer-".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller_namespace: default_controller_namespace(),
            kubeseal_path: default_kubeseal_path(),
            kubectl_path: default_kubectl_path(),
            editor: None,
            cert: None,
            temp_prefix: default_temp_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults if the file doesn't exist
    ///
    /// Environment overrides are applied on top.
    pub fn load(paths: &SealerPaths) -> Result<Self, SealerError> {
        let mut settings = Self::load_file(paths)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load only the settings file
    pub fn load_file(paths: &SealerPaths) -> Result<Self, SealerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SealerError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SealerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Override fields from environment variables found by `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(namespace) = lookup(CONTROLLER_NAMESPACE_ENV) {
            self.controller_namespace = namespace;
        }
        if let Some(kubeseal) = lookup(KUBESEAL_ENV) {
            self.kubeseal_path = kubeseal;
        }
        if let Some(kubectl) = lookup(KUBECTL_ENV) {
            self.kubectl_path = kubectl;
        }
        if let Some(cert) = lookup(CERT_ENV) {
            self.cert = Some(PathBuf::from(cert));
        }
    }

    /// Render as indented JSON for display
    pub fn to_pretty_json(&self) -> Result<String, SealerError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SealerError::Serialization(format!("Failed to serialize settings: {}", e)))
    }
}
