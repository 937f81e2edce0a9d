//! Reconciliation of an edited Secret against its sealed original
//!
//! Decides between resealing everything and re-encrypting only the keys that
//! changed, then produces the new SealedSecret. Ciphertext of untouched keys
//! is carried over byte for byte on the selective path.

use std::fmt;

use tracing::{debug, info};

use super::diff::PayloadDiff;
use crate::error::SealerResult;
use crate::gateway::EncryptionGateway;
use crate::models::{IdentityContext, PlainResource, Scope, SealedResource};

/// Why every key has to be encrypted again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullResealReason {
    ScopeChanged,
    NameChanged,
    NamespaceChanged,
    /// Requested by the caller
    Forced,
}

impl fmt::Display for FullResealReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ScopeChanged => "scope changed",
            Self::NameChanged => "name changed",
            Self::NamespaceChanged => "namespace changed",
            Self::Forced => "forced",
        };
        f.write_str(reason)
    }
}

/// The path a reconciliation takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePath {
    FullReseal(FullResealReason),
    SelectiveMerge,
}

impl fmt::Display for ReconcilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullReseal(reason) => write!(f, "full reseal ({})", reason),
            Self::SelectiveMerge => f.write_str("selective merge"),
        }
    }
}

/// Result of a reconciliation
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub sealed: SealedResource,
    pub path: ReconcilePath,
    pub diff: PayloadDiff,
}

/// Merges edits into a SealedSecret through an encryption gateway
pub struct Reconciler<'a, G: EncryptionGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: EncryptionGateway + ?Sized> Reconciler<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Decide how `edited` must be sealed given the `original` it came from
    pub fn plan(original: &PlainResource, edited: &PlainResource) -> ReconcilePath {
        let scope = original.scope();
        if scope != edited.scope() {
            return ReconcilePath::FullReseal(FullResealReason::ScopeChanged);
        }

        let name_changed = original.metadata.name != edited.metadata.name;
        let namespace_changed = original.metadata.namespace != edited.metadata.namespace;

        match scope {
            Scope::Strict if name_changed => {
                ReconcilePath::FullReseal(FullResealReason::NameChanged)
            }
            Scope::Strict | Scope::NamespaceWide if namespace_changed => {
                ReconcilePath::FullReseal(FullResealReason::NamespaceChanged)
            }
            Scope::Strict | Scope::NamespaceWide | Scope::ClusterWide => {
                ReconcilePath::SelectiveMerge
            }
        }
    }

    /// Produce the SealedSecret for `edited`
    ///
    /// `original_sealed` must be the SealedSecret `original` was decrypted
    /// from. Neither input is modified; any gateway failure aborts with no
    /// result.
    pub fn reconcile(
        &self,
        original_sealed: &SealedResource,
        original: &PlainResource,
        edited: &PlainResource,
    ) -> SealerResult<Reconciliation> {
        let path = Self::plan(original, edited);
        let diff = PayloadDiff::compute(&original.payload, &edited.payload);
        info!(%path, changes = %diff.summary(), "reconciling");

        // Resolve identity before the first external call
        let identity = IdentityContext::for_resource(edited)?;

        let sealed = match path {
            ReconcilePath::FullReseal(_) => self.gateway.encrypt(edited)?,
            ReconcilePath::SelectiveMerge => {
                self.selective_merge(original_sealed, edited, &diff, &identity)?
            }
        };

        Ok(Reconciliation { sealed, path, diff })
    }

    /// Seal `edited` from scratch regardless of what changed
    pub fn force_reseal(&self, original: &PlainResource, edited: &PlainResource) -> SealerResult<Reconciliation> {
        let path = ReconcilePath::FullReseal(FullResealReason::Forced);
        let diff = PayloadDiff::compute(&original.payload, &edited.payload);
        info!(%path, changes = %diff.summary(), "reconciling");

        IdentityContext::for_resource(edited)?;
        let sealed = self.gateway.encrypt(edited)?;
        Ok(Reconciliation { sealed, path, diff })
    }

    /// Seal a payload-less copy of `edited`
    ///
    /// Only the metadata wrapper of the result is used; its encrypted data is
    /// replaced by the caller.
    pub fn metadata_skeleton(&self, edited: &PlainResource) -> SealerResult<SealedResource> {
        self.gateway.encrypt_skeleton(&edited.without_payload())
    }

    fn selective_merge(
        &self,
        original_sealed: &SealedResource,
        edited: &PlainResource,
        diff: &PayloadDiff,
        identity: &IdentityContext,
    ) -> SealerResult<SealedResource> {
        let mut sealed = self.metadata_skeleton(edited)?;
        sealed.spec.encrypted_data = original_sealed.spec.encrypted_data.clone();

        for key in diff.to_encrypt() {
            let value = edited.payload.get(key).map(String::as_bytes).unwrap_or_default();
            let ciphertext = self.gateway.encrypt_raw(value, identity)?;
            debug!(key, "re-encrypted key");
            sealed.spec.encrypted_data.insert(key.to_string(), ciphertext);
        }

        for key in &diff.removed {
            sealed.spec.encrypted_data.remove(key);
            debug!(key = key.as_str(), "removed key");
        }

        Ok(sealed)
    }
}
