//! Kubernetes secret type tag
//!
//! Well-known types get their own variant so validation and placeholders can
//! match on them; anything else passes through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SERVICE_ACCOUNT_NAME_KEY: &str = "kubernetes.io/service-account.name";
pub const SERVICE_ACCOUNT_UID_KEY: &str = "kubernetes.io/service-account.uid";
pub const SERVICE_ACCOUNT_TOKEN_KEY: &str = "token";
pub const DOCKER_CONFIG_KEY: &str = ".dockercfg";
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";
pub const BASIC_AUTH_USERNAME_KEY: &str = "username";
pub const BASIC_AUTH_PASSWORD_KEY: &str = "password";
pub const SSH_AUTH_PRIVATE_KEY: &str = "ssh-privatekey";
pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Type tag of a Secret (`type:` field)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecretType {
    #[default]
    Opaque,
    ServiceAccountToken,
    Dockercfg,
    DockerConfigJson,
    BasicAuth,
    SshAuth,
    Tls,
    BootstrapToken,
    /// Any type not known to this tool
    Custom(String),
}

impl SecretType {
    /// Parse a well-known type, rejecting anything else
    ///
    /// Used when creating new secrets, where a typo should be an error rather
    /// than a custom type.
    pub fn parse_known(s: &str) -> Option<Self> {
        match Self::from(s.to_string()) {
            Self::Custom(_) => None,
            known => Some(known),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Opaque => "Opaque",
            Self::ServiceAccountToken => "kubernetes.io/service-account-token",
            Self::Dockercfg => "kubernetes.io/dockercfg",
            Self::DockerConfigJson => "kubernetes.io/dockerconfigjson",
            Self::BasicAuth => "kubernetes.io/basic-auth",
            Self::SshAuth => "kubernetes.io/ssh-auth",
            Self::Tls => "kubernetes.io/tls",
            Self::BootstrapToken => "bootstrap.kubernetes.io/token",
            Self::Custom(s) => s,
        }
    }

    /// Payload keys a new secret of this type starts with
    pub fn placeholder_keys(&self) -> &'static [&'static str] {
        match self {
            Self::ServiceAccountToken => &[SERVICE_ACCOUNT_TOKEN_KEY],
            Self::Dockercfg => &[DOCKER_CONFIG_KEY],
            Self::DockerConfigJson => &[DOCKER_CONFIG_JSON_KEY],
            Self::BasicAuth => &[BASIC_AUTH_USERNAME_KEY, BASIC_AUTH_PASSWORD_KEY],
            Self::SshAuth => &[SSH_AUTH_PRIVATE_KEY],
            Self::Tls => &[TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY],
            Self::Opaque | Self::BootstrapToken | Self::Custom(_) => &["change"],
        }
    }
}

impl From<String> for SecretType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Opaque" | "" => Self::Opaque,
            "kubernetes.io/service-account-token" => Self::ServiceAccountToken,
            "kubernetes.io/dockercfg" => Self::Dockercfg,
            "kubernetes.io/dockerconfigjson" => Self::DockerConfigJson,
            "kubernetes.io/basic-auth" => Self::BasicAuth,
            "kubernetes.io/ssh-auth" => Self::SshAuth,
            "kubernetes.io/tls" => Self::Tls,
            "bootstrap.kubernetes.io/token" => Self::BootstrapToken,
            _ => Self::Custom(s),
        }
    }
}

impl From<SecretType> for String {
    fn from(t: SecretType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!(SecretType::parse_known("Opaque"), Some(SecretType::Opaque));
        assert_eq!(
            SecretType::parse_known("kubernetes.io/tls"),
            Some(SecretType::Tls)
        );
        assert_eq!(SecretType::parse_known("example.com/custom"), None);
    }

    #[test]
    fn test_custom_type_passes_through() {
        let t: SecretType = serde_yaml::from_str("example.com/custom").unwrap();
        assert_eq!(t, SecretType::Custom("example.com/custom".into()));
        assert_eq!(serde_yaml::to_string(&t).unwrap().trim(), "example.com/custom");
    }

    #[test]
    fn test_placeholder_keys() {
        assert_eq!(
            SecretType::BasicAuth.placeholder_keys(),
            &["username", "password"]
        );
        assert_eq!(SecretType::Opaque.placeholder_keys(), &["change"]);
    }
}
