//! Service layer for kubectl-sealer
//!
//! The service layer holds the editing workflow on top of the gateway
//! traits: payload diffing, reconciliation of edits into SealedSecrets, and
//! the edit session that ties decryption, editing and sealing together.

pub mod diff;
pub mod reconcile;
pub mod session;

pub use diff::{key_diff, updated_existing, PayloadDiff};
pub use reconcile::{FullResealReason, ReconcilePath, Reconciler, Reconciliation};
pub use session::{EditOptions, EditOutcome, EditSession, Edited, NewSecret};
