//! kubectl-sealer - edit SealedSecrets as plain Secrets
//!
//! This library decrypts a bitnami SealedSecret, lets the user edit it as a
//! plain `v1/Secret`, and seals the result again. When only some values
//! change, only those are re-encrypted; the ciphertext of every other key is
//! carried over byte for byte, so diffs of the sealed manifest stay small.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Secret, SealedSecret, scope and type models
//! - `gateway`: `kubeseal`, `kubectl` and editor collaborators
//! - `services`: Diffing, reconciliation and the edit session
//! - `validation`: Secret validation
//! - `storage`: Atomic file output
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use sealer::config::{SealerPaths, Settings};
//!
//! let paths = SealerPaths::new()?;
//! let settings = Settings::load(&paths)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{SealerError, SealerResult};
