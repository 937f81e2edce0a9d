//! Storage layer for kubectl-sealer
//!
//! Reads input manifests and writes results with atomic replacement, so a
//! failed run never leaves a half-written file behind.

pub mod file_io;

pub use file_io::{read_file, write_atomic};
