//! External collaborators
//!
//! Everything that crosses a process boundary lives behind the traits in this
//! module: the sealing tool, the key source and the editor. The reconciler
//! and edit session only ever see the traits, so tests drive them with
//! in-memory fakes.
//!
//! # Architecture
//!
//! - `CommandRunner`: spawns a program; the only code touching `std::process`
//! - `Kubeseal`: `EncryptionGateway` backed by the `kubeseal` binary
//! - `Kubectl`: `KeySource` reading sealing keys from the cluster
//! - `Editor`: `EditingSurface` launching `$VISUAL` / `$EDITOR`

mod editor;
mod exec;
mod kubectl;
mod kubeseal;

#[cfg(test)]
pub mod fake;

use zeroize::Zeroizing;

use crate::error::SealerResult;
use crate::models::{IdentityContext, PlainResource, SealedResource};

pub use editor::{pick_editor, Editor};
pub use exec::{CommandRunner, SystemRunner};
pub use kubectl::{Kubectl, SEALING_KEY_LABEL};
pub use kubeseal::Kubeseal;

/// Encrypts and decrypts resources
pub trait EncryptionGateway {
    /// Seal a whole Secret, producing a brand-new SealedSecret
    fn encrypt(&self, plain: &PlainResource) -> SealerResult<SealedResource>;

    /// Seal a Secret that carries no payload
    ///
    /// Only the metadata wrapper of the result is meaningful.
    fn encrypt_skeleton(&self, plain: &PlainResource) -> SealerResult<SealedResource>;

    /// Encrypt a single value bound to an identity context
    fn encrypt_raw(&self, value: &[u8], identity: &IdentityContext) -> SealerResult<String>;

    /// Decrypt a SealedSecret with the given private key material
    fn decrypt(&self, sealed: &SealedResource, keys: &KeyMaterial) -> SealerResult<PlainResource>;
}

/// Supplies private sealing keys
pub trait KeySource {
    fn fetch_key_material(&self, admin_namespace: &str) -> SealerResult<KeyMaterial>;
}

/// Lets a human edit text
pub trait EditingSurface {
    /// Present `content` for editing and return the result, which may be unchanged
    fn edit(&self, content: &[u8]) -> SealerResult<Vec<u8>>;
}

/// Private key material for decryption, wiped from memory on drop
pub struct KeyMaterial {
    bytes: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial([{} bytes redacted])", self.bytes.len())
    }
}
