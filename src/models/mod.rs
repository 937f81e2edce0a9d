//! Core data models for kubectl-sealer
//!
//! This module contains the resources the tool moves between the user and the
//! sealing tool: plain Secrets, SealedSecrets, their scope, and type tags.

pub mod format;
pub mod resource;
pub mod scope;
pub mod secret_type;

pub use format::OutputFormat;
pub use resource::{
    EncryptedData, ObjectMeta, Payload, PlainResource, SealedResource, SealedSpec, SecretTemplate,
};
pub use scope::{
    IdentityContext, RequiredIdentity, Scope, CLUSTER_WIDE_ANNOTATION, NAMESPACE_WIDE_ANNOTATION,
};
pub use secret_type::SecretType;
