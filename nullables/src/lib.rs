//! Nullable infrastructure for deterministic testing.
//!
//! Everything the vault depends on from outside (the clock, the asset
//! collaborator) is abstracted behind a value or a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Can be told to fail, to exercise all-or-nothing rollback
//!
//! Usage: swap real implementations for nullables in tests.

pub mod asset;
pub mod clock;

pub use asset::NullAsset;
pub use clock::NullClock;
