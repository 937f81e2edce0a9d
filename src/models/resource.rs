//! Secret and SealedSecret resource models
//!
//! `PlainResource` is the decrypted `v1/Secret` a user edits; its payload is
//! always held as `stringData`. `SealedResource` is the
//! `bitnami.com/v1alpha1/SealedSecret` on disk, whose `spec.encryptedData`
//! maps the same keys to opaque ciphertext.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::scope::Scope;
use super::secret_type::SecretType;
use crate::error::{SealerError, SealerResult};

/// Secret payload: key to plaintext value, sorted for deterministic output
pub type Payload = BTreeMap<String, String>;

/// Encrypted payload: key to opaque ciphertext
pub type EncryptedData = BTreeMap<String, String>;

fn default_secret_api_version() -> String {
    "v1".to_string()
}

fn default_secret_kind() -> String {
    "Secret".to_string()
}

fn default_sealed_api_version() -> String {
    "bitnami.com/v1alpha1".to_string()
}

fn default_sealed_kind() -> String {
    "SealedSecret".to_string()
}

/// Object metadata shared by Secrets and SealedSecrets
///
/// Fields the tool does not interpret (uid, finalizers, creationTimestamp, ...)
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<serde_json::Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// A decrypted Secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlainResource {
    #[serde(default = "default_secret_api_version")]
    pub api_version: String,

    #[serde(default = "default_secret_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<SecretType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

    /// Base64 payload as read from input; folded into `payload` on load
    #[serde(default, skip_serializing)]
    data: BTreeMap<String, String>,

    /// Plaintext payload
    #[serde(rename = "stringData", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub payload: Payload,
}

impl PlainResource {
    /// Create an empty Secret with the given identity
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: default_secret_api_version(),
            kind: default_secret_kind(),
            metadata: ObjectMeta::new(name, namespace),
            secret_type: None,
            immutable: None,
            data: BTreeMap::new(),
            payload: Payload::new(),
        }
    }

    /// Parse a Secret from YAML (or JSON) text
    ///
    /// Unknown top-level fields are rejected so a typo cannot silently drop
    /// payload entries.
    pub fn from_yaml(input: &[u8]) -> SealerResult<Self> {
        let mut resource: Self = serde_yaml::from_slice(input).map_err(|e| {
            SealerError::Deserialization(format!("invalid Secret: {}", e))
        })?;
        resource.fold_data()?;
        Ok(resource)
    }

    /// Parse a Secret from JSON, as produced by the decryption tool
    pub fn from_json(input: &[u8]) -> SealerResult<Self> {
        let mut resource: Self = serde_json::from_slice(input).map_err(|e| {
            SealerError::Deserialization(format!("invalid Secret JSON: {}", e))
        })?;
        resource.fold_data()?;
        Ok(resource)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> SealerResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SealerError::Serialization(format!("Secret to YAML: {}", e)))
    }

    /// Render as JSON
    pub fn to_json(&self) -> SealerResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| SealerError::Serialization(format!("Secret to JSON: {}", e)))
    }

    /// The scope declared by this resource's annotations
    pub fn scope(&self) -> Scope {
        Scope::resolve(&self.metadata)
    }

    /// The effective type tag (missing means Opaque)
    pub fn secret_type(&self) -> SecretType {
        self.secret_type.clone().unwrap_or_default()
    }

    /// A copy of this resource with no payload at all
    pub fn without_payload(&self) -> Self {
        let mut copy = self.clone();
        copy.payload.clear();
        copy.data.clear();
        copy
    }

    /// Decode base64 `data` into the plaintext payload
    ///
    /// `stringData` wins over `data` for the same key, as in the API server.
    fn fold_data(&mut self) -> SealerResult<()> {
        for (key, encoded) in std::mem::take(&mut self.data) {
            if self.payload.contains_key(&key) {
                continue;
            }
            let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
                SealerError::Deserialization(format!("data[{}] is not valid base64: {}", key, e))
            })?;
            let value = String::from_utf8(bytes).map_err(|_| {
                SealerError::Deserialization(format!(
                    "data[{}] is not valid UTF-8 and cannot be edited as text",
                    key
                ))
            })?;
            self.payload.insert(key, value);
        }
        Ok(())
    }
}

/// Template the controller uses to build the unsealed Secret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<SecretType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

    /// Non-secret templated data, kept as-is
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

/// Spec of a SealedSecret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSpec {
    #[serde(default)]
    pub template: SecretTemplate,

    #[serde(default)]
    pub encrypted_data: EncryptedData,
}

/// An encrypted SealedSecret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedResource {
    #[serde(default = "default_sealed_api_version")]
    pub api_version: String,

    #[serde(default = "default_sealed_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: SealedSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl SealedResource {
    /// Create an empty SealedSecret with the given identity
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let metadata = ObjectMeta::new(name, namespace);
        Self {
            api_version: default_sealed_api_version(),
            kind: default_sealed_kind(),
            spec: SealedSpec {
                template: SecretTemplate {
                    metadata: metadata.clone(),
                    ..Default::default()
                },
                encrypted_data: EncryptedData::new(),
            },
            metadata,
            status: None,
        }
    }

    /// Parse a SealedSecret from YAML or JSON text
    pub fn from_slice(input: &[u8]) -> SealerResult<Self> {
        let resource: Self = serde_yaml::from_slice(input).map_err(|e| {
            SealerError::Deserialization(format!("invalid SealedSecret: {}", e))
        })?;

        if resource.kind != "SealedSecret" {
            return Err(SealerError::Deserialization(format!(
                "expected kind SealedSecret, got {}",
                resource.kind
            )));
        }

        Ok(resource)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> SealerResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SealerError::Serialization(format!("SealedSecret to YAML: {}", e)))
    }

    /// Render as JSON
    pub fn to_json(&self) -> SealerResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| SealerError::Serialization(format!("SealedSecret to JSON: {}", e)))
    }

    /// Render as indented JSON
    pub fn to_json_pretty(&self) -> SealerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SealerError::Serialization(format!("SealedSecret to JSON: {}", e)))
    }

    /// The encrypted payload
    pub fn encrypted_data(&self) -> &EncryptedData {
        &self.spec.encrypted_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEALED_YAML: &str = r#"
apiVersion: bitnami.com/v1alpha1
kind: SealedSecret
metadata:
  creationTimestamp: null
  name: apple
  namespace: banana
spec:
  encryptedData:
    a: AgBy3i4OJSWK
    b: AgCJxQ9Zz1mD
  template:
    metadata:
      creationTimestamp: null
      name: apple
      namespace: banana
      labels:
        app: fruit
    type: kubernetes.io/basic-auth
"#;

    #[test]
    fn test_parse_sealed() {
        let sealed = SealedResource::from_slice(SEALED_YAML.as_bytes()).unwrap();
        assert_eq!(sealed.metadata.name, "apple");
        assert_eq!(sealed.metadata.namespace, "banana");
        assert_eq!(sealed.encrypted_data().len(), 2);
        assert_eq!(sealed.spec.template.secret_type, Some(SecretType::BasicAuth));
        assert_eq!(
            sealed.spec.template.metadata.labels.get("app").map(String::as_str),
            Some("fruit")
        );
        assert!(sealed.metadata.extra.contains_key("creationTimestamp"));
    }

    #[test]
    fn test_sealed_preserves_fields_through_yaml() {
        let sealed = SealedResource::from_slice(SEALED_YAML.as_bytes()).unwrap();
        let rendered = sealed.to_yaml().unwrap();
        let reparsed = SealedResource::from_slice(rendered.as_bytes()).unwrap();
        assert_eq!(sealed, reparsed);
    }

    #[test]
    fn test_parse_sealed_json() {
        let json = r#"{"apiVersion":"bitnami.com/v1alpha1","kind":"SealedSecret","metadata":{"name":"orange"},"spec":{"encryptedData":{"k":"v"}}}"#;
        let sealed = SealedResource::from_slice(json.as_bytes()).unwrap();
        assert_eq!(sealed.metadata.name, "orange");
        assert_eq!(sealed.encrypted_data().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let yaml = "apiVersion: v1\nkind: Secret\nmetadata:\n  name: x\n";
        let err = SealedResource::from_slice(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, SealerError::Deserialization(_)));
    }

    #[test]
    fn test_plain_folds_base64_data() {
        let json = r#"{"apiVersion":"v1","kind":"Secret","metadata":{"name":"apple"},"data":{"a":"MQ==","b":"Mg=="},"stringData":{"b":"override"}}"#;
        let plain = PlainResource::from_json(json.as_bytes()).unwrap();
        assert_eq!(plain.payload.get("a").map(String::as_str), Some("1"));
        assert_eq!(plain.payload.get("b").map(String::as_str), Some("override"));

        let yaml = plain.to_yaml().unwrap();
        assert!(!yaml.contains("\ndata:"));
        assert!(yaml.contains("stringData:"));
    }

    #[test]
    fn test_plain_rejects_binary_data() {
        let json = r#"{"kind":"Secret","metadata":{"name":"apple"},"data":{"bin":"/w=="}}"#;
        let err = PlainResource::from_json(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_plain_rejects_unknown_top_level_field() {
        let yaml = "apiVersion: v1\nkind: Secret\nmetadata:\n  name: x\nstringdata:\n  a: b\n";
        let err = PlainResource::from_yaml(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, SealerError::Deserialization(_)));
    }

    #[test]
    fn test_without_payload_keeps_metadata() {
        let mut plain = PlainResource::new("apple", "banana");
        plain.metadata.labels.insert("app".into(), "fruit".into());
        plain.secret_type = Some(SecretType::Tls);
        plain.payload.insert("tls.crt".into(), "cert".into());

        let skeleton = plain.without_payload();
        assert!(skeleton.payload.is_empty());
        assert_eq!(skeleton.metadata, plain.metadata);
        assert_eq!(skeleton.secret_type, plain.secret_type);
        assert_eq!(plain.payload.len(), 1);
    }
}
