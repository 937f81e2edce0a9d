//! Secret validation
//!
//! Mirrors the checks the Kubernetes API server applies to a `v1/Secret`, so
//! mistakes surface in the editor instead of at apply time. Secret contents
//! never appear in error details.

use std::fmt;

use crate::models::resource::PlainResource;
use crate::models::secret_type::{
    SecretType, BASIC_AUTH_PASSWORD_KEY, BASIC_AUTH_USERNAME_KEY, DOCKER_CONFIG_JSON_KEY,
    DOCKER_CONFIG_KEY, SERVICE_ACCOUNT_NAME_KEY, SSH_AUTH_PRIVATE_KEY, TLS_CERT_KEY,
    TLS_PRIVATE_KEY_KEY,
};

/// Largest total payload the API server accepts
pub const MAX_SECRET_SIZE: usize = 1024 * 1024;

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const CONFIG_MAP_KEY_MAX_LENGTH: usize = 253;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;

/// Largest combined size of annotation keys and values
pub const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

const STANDARD_FINALIZERS: [&str; 3] = ["kubernetes", "orphan", "foregroundDeletion"];

/// What is wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid,
    TooLong,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required value"),
            Self::Invalid => write!(f, "Invalid value"),
            Self::TooLong => write!(f, "Too long"),
        }
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `metadata.name`
    pub path: String,
    pub kind: FieldErrorKind,
    pub detail: String,
}

impl FieldError {
    pub fn required(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::Required,
            detail: String::new(),
        }
    }

    pub fn invalid(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::Invalid,
            detail: detail.into(),
        }
    }

    pub fn too_long(path: impl Into<String>, max: usize) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::TooLong,
            detail: format!("must have at most {} bytes", max),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}: {}", self.path, self.kind)
        } else {
            write!(f, "{}: {}: {}", self.path, self.kind, self.detail)
        }
    }
}

fn data_path(key: &str) -> String {
    format!("data[{}]", key)
}

/// Validate a Secret, returning every problem found
pub fn validate_secret(secret: &PlainResource) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let meta = &secret.metadata;

    if meta.name.is_empty() {
        errors.push(FieldError::required("metadata.name"));
    } else {
        errors.extend(
            dns1123_subdomain_errors(&meta.name)
                .into_iter()
                .map(|msg| FieldError::invalid("metadata.name", msg)),
        );
    }

    if meta.namespace.is_empty() {
        errors.push(FieldError::required("metadata.namespace"));
    } else {
        errors.extend(
            dns1123_label_errors(&meta.namespace)
                .into_iter()
                .map(|msg| FieldError::invalid("metadata.namespace", msg)),
        );
    }

    errors.extend(metadata_errors(secret));

    let mut total_size = 0;
    for (key, value) in &secret.payload {
        errors.extend(
            config_map_key_errors(key)
                .into_iter()
                .map(|msg| FieldError::invalid(data_path(key), msg)),
        );
        total_size += value.len();
    }
    if total_size > MAX_SECRET_SIZE {
        errors.push(FieldError::too_long("data", MAX_SECRET_SIZE));
    }

    errors.extend(type_errors(secret));
    errors
}

fn metadata_errors(secret: &PlainResource) -> Vec<FieldError> {
    let meta = &secret.metadata;
    let mut errors = Vec::new();

    for (key, value) in &meta.labels {
        errors.extend(
            qualified_name_errors(key)
                .into_iter()
                .map(|msg| FieldError::invalid("metadata.labels", format!("{:?}: {}", key, msg))),
        );
        errors.extend(
            label_value_errors(value)
                .into_iter()
                .map(|msg| FieldError::invalid("metadata.labels", format!("{:?}: {}", value, msg))),
        );
    }

    let mut total_size = 0;
    for (key, value) in &meta.annotations {
        errors.extend(
            qualified_name_errors(&key.to_lowercase())
                .into_iter()
                .map(|msg| FieldError::invalid("metadata.annotations", format!("{:?}: {}", key, msg))),
        );
        total_size += key.len() + value.len();
    }
    if total_size > TOTAL_ANNOTATION_SIZE_LIMIT {
        errors.push(FieldError::too_long("metadata.annotations", TOTAL_ANNOTATION_SIZE_LIMIT));
    }

    if let Some(finalizers) = meta.extra.get("finalizers") {
        match finalizers.as_array() {
            Some(finalizers) => {
                for (i, finalizer) in finalizers.iter().enumerate() {
                    let path = format!("metadata.finalizers[{}]", i);
                    match finalizer.as_str() {
                        Some(name) => errors.extend(
                            finalizer_errors(name)
                                .into_iter()
                                .map(|msg| FieldError::invalid(path.as_str(), msg)),
                        ),
                        None => errors.push(FieldError::invalid(path, "must be a string")),
                    }
                }
            }
            None => errors.push(FieldError::invalid("metadata.finalizers", "must be a list")),
        }
    }

    errors
}

fn type_errors(secret: &PlainResource) -> Vec<FieldError> {
    let payload = &secret.payload;
    let mut errors = Vec::new();

    match secret.secret_type() {
        SecretType::ServiceAccountToken => {
            let name = secret.metadata.annotations.get(SERVICE_ACCOUNT_NAME_KEY);
            if name.map_or(true, String::is_empty) {
                errors.push(FieldError::required(format!(
                    "metadata.annotations[{}]",
                    SERVICE_ACCOUNT_NAME_KEY
                )));
            }
        }
        SecretType::Dockercfg | SecretType::DockerConfigJson => {
            let key = if secret.secret_type() == SecretType::Dockercfg {
                DOCKER_CONFIG_KEY
            } else {
                DOCKER_CONFIG_JSON_KEY
            };
            match payload.get(key) {
                None => errors.push(FieldError::required(data_path(key))),
                Some(value) => {
                    let parsed: Result<serde_json::Map<String, serde_json::Value>, _> =
                        serde_json::from_str(value);
                    if let Err(e) = parsed {
                        errors.push(FieldError::invalid(
                            data_path(key),
                            format!("<secret contents redacted>: {}", e),
                        ));
                    }
                }
            }
        }
        SecretType::BasicAuth => {
            // Either may be empty, but one must be present
            if !payload.contains_key(BASIC_AUTH_USERNAME_KEY)
                && !payload.contains_key(BASIC_AUTH_PASSWORD_KEY)
            {
                errors.push(FieldError::required(data_path(BASIC_AUTH_USERNAME_KEY)));
                errors.push(FieldError::required(data_path(BASIC_AUTH_PASSWORD_KEY)));
            }
        }
        SecretType::SshAuth => {
            if payload.get(SSH_AUTH_PRIVATE_KEY).map_or(true, String::is_empty) {
                errors.push(FieldError::required(data_path(SSH_AUTH_PRIVATE_KEY)));
            }
        }
        SecretType::Tls => {
            for key in [TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY] {
                if !payload.contains_key(key) {
                    errors.push(FieldError::required(data_path(key)));
                }
            }
        }
        SecretType::Opaque | SecretType::BootstrapToken | SecretType::Custom(_) => {}
    }

    errors
}

fn is_dns1123_label(s: &str) -> bool {
    let bytes = s.as_bytes();
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

fn dns1123_label_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        errors.push(format!(
            "must be no more than {} characters",
            DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !is_dns1123_label(value) {
        errors.push(
            "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    errors
}

fn dns1123_subdomain_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(format!(
            "must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !value.split('.').all(is_dns1123_label) {
        errors.push(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, \
             '-' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    errors
}

fn is_qualified_name_part(s: &str) -> bool {
    let bytes = s.as_bytes();
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
}

/// `[prefix/]name` as used by label and annotation keys
fn qualified_name_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let parts: Vec<&str> = value.split('/').collect();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty() {
                errors.push("prefix part must be non-empty".to_string());
            } else {
                errors.extend(
                    dns1123_subdomain_errors(prefix)
                        .into_iter()
                        .map(|msg| format!("prefix part {}", msg)),
                );
            }
            *name
        }
        _ => {
            errors.push(
                "a qualified name must consist of an optional DNS subdomain prefix and '/' \
                 followed by a name"
                    .to_string(),
            );
            return errors;
        }
    };

    if name.is_empty() {
        errors.push("name part must be non-empty".to_string());
        return errors;
    }
    if name.len() > QUALIFIED_NAME_MAX_LENGTH {
        errors.push(format!(
            "name part must be no more than {} characters",
            QUALIFIED_NAME_MAX_LENGTH
        ));
    }
    if !is_qualified_name_part(name) {
        errors.push(
            "name part must consist of alphanumeric characters, '-', '_' or '.', and must start \
             and end with an alphanumeric character"
                .to_string(),
        );
    }
    errors
}

fn label_value_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > LABEL_VALUE_MAX_LENGTH {
        errors.push(format!(
            "must be no more than {} characters",
            LABEL_VALUE_MAX_LENGTH
        ));
    }
    if !value.is_empty() && !is_qualified_name_part(value) {
        errors.push(
            "a valid label must be an empty string or consist of alphanumeric characters, '-', \
             '_' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    errors
}

fn finalizer_errors(name: &str) -> Vec<String> {
    let mut errors = qualified_name_errors(name);
    if !name.contains('/') && !STANDARD_FINALIZERS.contains(&name) {
        errors.push("name is neither a standard finalizer name nor is it fully qualified".to_string());
    }
    errors
}

fn config_map_key_errors(key: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if key.len() > CONFIG_MAP_KEY_MAX_LENGTH {
        errors.push(format!(
            "must be no more than {} characters",
            CONFIG_MAP_KEY_MAX_LENGTH
        ));
    }
    let valid_chars = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !valid_chars {
        errors.push(
            "a valid config key must consist of alphanumeric characters, '-', '_' or '.'"
                .to_string(),
        );
    }
    if key == "." {
        errors.push("must not be '.'".to_string());
    } else if key == ".." {
        errors.push("must not be '..'".to_string());
    } else if key.starts_with("..") {
        errors.push("must not start with '..'".to_string());
    }
    errors
}
