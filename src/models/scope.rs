//! Sealing scope model
//!
//! A scope governs how tightly ciphertext is bound to a resource's name and
//! namespace. It is carried on the resource as an annotation and resolved
//! here without touching anything but metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::resource::{ObjectMeta, PlainResource};
use crate::error::{SealerError, SealerResult};

/// Annotation marking a secret as sealable under any name in its namespace
pub const NAMESPACE_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/namespace-wide";

/// Annotation marking a secret as sealable under any name and namespace
pub const CLUSTER_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/cluster-wide";

/// How ciphertext is bound to a resource identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Bound to the exact name and namespace
    #[default]
    Strict,
    /// Bound to the namespace only
    NamespaceWide,
    /// Not bound to any identity
    ClusterWide,
}

impl Scope {
    /// Resolve the scope declared by a resource's annotations
    ///
    /// Never fails: a missing or non-"true" annotation falls back to
    /// [`Scope::Strict`]. Cluster-wide wins when both annotations are set.
    pub fn resolve(meta: &ObjectMeta) -> Self {
        let is_set = |key: &str| meta.annotations.get(key).map(String::as_str) == Some("true");

        if is_set(CLUSTER_WIDE_ANNOTATION) {
            Self::ClusterWide
        } else if is_set(NAMESPACE_WIDE_ANNOTATION) {
            Self::NamespaceWide
        } else {
            Self::Strict
        }
    }

    /// Parse a scope from its command-line form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "namespace-wide" => Some(Self::NamespaceWide),
            "cluster-wide" => Some(Self::ClusterWide),
            _ => None,
        }
    }

    /// The textual form kubeseal accepts for `--scope`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::NamespaceWide => "namespace-wide",
            Self::ClusterWide => "cluster-wide",
        }
    }

    /// Rewrite the scope annotations so they declare this scope
    pub fn apply_to(&self, annotations: &mut BTreeMap<String, String>) {
        annotations.remove(NAMESPACE_WIDE_ANNOTATION);
        annotations.remove(CLUSTER_WIDE_ANNOTATION);

        match self {
            Self::Strict => {}
            Self::NamespaceWide => {
                annotations.insert(NAMESPACE_WIDE_ANNOTATION.to_string(), "true".to_string());
            }
            Self::ClusterWide => {
                annotations.insert(CLUSTER_WIDE_ANNOTATION.to_string(), "true".to_string());
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identity fields a scope needs to be non-empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredIdentity {
    pub name: bool,
    pub namespace: bool,
}

impl RequiredIdentity {
    pub fn for_scope(scope: Scope) -> Self {
        match scope {
            Scope::Strict => Self {
                name: true,
                namespace: true,
            },
            Scope::NamespaceWide => Self {
                name: false,
                namespace: true,
            },
            Scope::ClusterWide => Self {
                name: false,
                namespace: false,
            },
        }
    }
}

/// The (scope, name, namespace) triple ciphertext is bound to
///
/// Only the fields the scope requires are carried; the rest are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub scope: Scope,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl IdentityContext {
    /// Build and validate the identity context of a plain resource
    pub fn for_resource(resource: &PlainResource) -> SealerResult<Self> {
        Self::new(
            Scope::resolve(&resource.metadata),
            &resource.metadata.name,
            &resource.metadata.namespace,
        )
    }

    /// Build an identity context, failing if the scope needs a missing field
    pub fn new(scope: Scope, name: &str, namespace: &str) -> SealerResult<Self> {
        let required = RequiredIdentity::for_scope(scope);

        if required.name && name.is_empty() {
            return Err(SealerError::IdentityIncomplete {
                scope,
                field: "name",
            });
        }
        if required.namespace && namespace.is_empty() {
            return Err(SealerError::IdentityIncomplete {
                scope,
                field: "namespace",
            });
        }

        Ok(Self {
            scope,
            name: required.name.then(|| name.to_string()),
            namespace: required.namespace.then(|| namespace.to_string()),
        })
    }
}
