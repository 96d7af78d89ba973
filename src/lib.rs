//! Crate root: public surface for the DDH-based inner-product functional
//! encryption scheme.
//!
//! This module is the **single canonical entry-point** for downstream users
//! of the library. It re-exports the core types and the `setup` →
//! `initialize` → `key_gen` → `key_derive` → `encrypt` → `decrypt` pipeline
//! implemented in [`ipfe`].
//!
//! ## Invariants
//!
//! - **Field & Curve.** The scalar field is `ark_bn254::Fr` (aliased as
//!   [`Scalar`]); group elements live in BN254 `G1` (aliased as [`Point`]).
//!   All arithmetic is provided by Arkworks; we **forbid unsafe** throughout
//!   the crate.
//!
//! - **Parameter bound.** `Setup` enforces `dimension_len + 2*msg_len <=
//!   dlog_len`: every honest inner product fits inside the DLOG solver's
//!   range. Violating it is a recoverable [`IpfeError`], never a panic.
//!
//! - **Randomness.** All sampling goes through [`group::secure_rng`]
//!   (`rand::rngs::OsRng`) unless the caller opts into the
//!   `dev-insecure-rng` feature for reproducible demos/tests.
//!
//! If any invariant is violated at runtime, the failure mode is a precise,
//! recoverable error — never UB, never a process exit.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Error kinds surfaced by every fallible operation in this crate.
pub mod error;
/// Group/scalar arithmetic adapter over BN254 `G1` (component A).
pub mod group;
/// Bounded-range discrete-logarithm solver and its persisted table (component B).
pub mod dlog;
/// The inner-product functional encryption scheme itself (component C).
pub mod ipfe;
/// Fixed-width wire encoding for ciphertexts (component D).
pub mod ser;

// ============================================================================
// Canonical aliases and root-level re-exports (centralization)
// ============================================================================

/// Scalar field used across the crate (BN254 `Fr`).
pub type F = ark_bn254::Fr;

/// G1 affine group element used throughout the crate.
pub type G1 = ark_bn254::G1Affine;

pub use crate::error::IpfeError;
pub use crate::group::{Point, Scalar};
pub use crate::ipfe::{
    decrypt, encrypt, initialize, initialize_in_cwd, key_derive, key_gen, setup, Ciphertext,
    FunctionalSecretKey, MasterPublicKey, MasterSecretKey, PublicParams,
};
pub use crate::ser::{deserialize_ciphertext, serialize_ciphertext};
