//! DDH-based inner-product functional encryption (component C).
//!
//! Implements Abdalla, Bourse, De Caro & Pointcheval's "Simple Functional
//! Encryption Schemes for Inner Products" (PKC 2015) scheme directly over
//! the group adapter in [`crate::group`] and the bounded DLOG solver in
//! [`crate::dlog`].
//!
//! Data flow: [`setup`] → [`initialize`] (populates the DLOG table, once
//! per `(dlog_len, tuning)`, cached on disk) → [`key_gen`] → [`key_derive`]
//! → [`encrypt`] → [`decrypt`].

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::dlog::{self, GiantStepTable};
use crate::error::IpfeError;
use crate::group::{self, Point, Scalar};

/// Scheme-wide public parameters, fixed for the lifetime of a deployment.
#[derive(Debug, Clone)]
pub struct PublicParams {
    /// log2 of the per-component message bound: each `x[i]`/`y[i]` SHOULD
    /// lie in `[0, 2^msg_len)`.
    pub msg_len: u32,
    /// log2 of the vector dimension.
    pub dimension_len: u32,
    /// Vector length, `2^dimension_len`.
    pub dimension: usize,
    /// log2 of the bound on the recoverable inner product; the solver
    /// handles values in `[0, 2^dlog_len)`.
    pub dlog_len: u32,
    /// Giant-step/baby-step split parameter, `0 <= tuning <= dlog_len/2`.
    pub tuning: u32,
    /// Worker-thread count used by [`decrypt`].
    pub thread_count: usize,
    /// The curve generator `g`, copied at `setup` time.
    pub g: Point,
}

/// Master public key: `MPK[i] = g^{MSK[i]}`.
pub type MasterPublicKey = Vec<Point>;

/// Master secret key: uniform scalars, one per dimension.
pub type MasterSecretKey = Vec<Scalar>;

/// A functional secret key derived for a fixed policy vector `y`.
#[derive(Debug, Clone)]
pub struct FunctionalSecretKey {
    /// The policy this key was derived for, copied at derivation time.
    pub policy: Vec<Scalar>,
    /// `sk_y = <MSK, y> mod q`.
    pub sk: Scalar,
}

/// A ciphertext: `X = g^r`, `Y[i] = MPK[i]^r * g^{x[i]}`.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    /// `X = g^r`.
    pub x: Point,
    /// `Y[i] = MPK[i]^r * g^{x[i]}`, one entry per dimension.
    pub y: Vec<Point>,
}

/// Validates `dimension_len + 2*msg_len <= dlog_len` and builds [`PublicParams`].
///
/// Fails with [`IpfeError::ParameterOutOfRange`] otherwise: this bound is
/// what guarantees every honest inner product fits inside the solver's range.
pub fn setup(
    msg_len: u32,
    dimension_len: u32,
    dlog_len: u32,
    tuning: u32,
    thread_count: usize,
) -> Result<PublicParams, IpfeError> {
    let required = dimension_len as u64 + 2 * msg_len as u64;
    if required > dlog_len as u64 {
        return Err(IpfeError::ParameterOutOfRange(format!(
            "dimension_len ({dimension_len}) + 2*msg_len ({msg_len}) = {required} exceeds dlog_len ({dlog_len})"
        )));
    }
    if tuning as u64 > dlog_len as u64 / 2 {
        return Err(IpfeError::ParameterOutOfRange(format!(
            "tuning {tuning} exceeds dlog_len/2 = {}",
            dlog_len / 2
        )));
    }

    let dimension = 1usize
        .checked_shl(dimension_len)
        .ok_or_else(|| IpfeError::ParameterOutOfRange(format!("dimension_len {dimension_len} too large")))?;

    tracing::debug!(msg_len, dimension_len, dlog_len, tuning, thread_count, "setup complete");

    Ok(PublicParams {
        msg_len,
        dimension_len,
        dimension,
        dlog_len,
        tuning,
        thread_count: thread_count.max(1),
        g: group::generator(),
    })
}

/// Ensures the DLOG table for `(pp.g, pp.dlog_len, pp.tuning)` exists under
/// `table_dir`, building and persisting it if absent, and returns it loaded
/// into memory. Idempotent across repeated calls with the same parameters.
pub fn initialize(pp: &PublicParams, table_dir: &Path) -> Result<GiantStepTable, IpfeError> {
    tracing::info!(dir = %table_dir.display(), "initializing DLOG table");
    dlog::ensure_table(table_dir, &pp.g, pp.dlog_len, pp.tuning)
}

/// Samples `MSK[i]` uniformly in `[0, q)` and computes `MPK[i] = g^{MSK[i]}`.
pub fn key_gen(pp: &PublicParams) -> (MasterPublicKey, MasterSecretKey) {
    let mut rng = group::secure_rng();
    let msk: MasterSecretKey = (0..pp.dimension).map(|_| group::random_scalar(&mut rng)).collect();
    let mpk: MasterPublicKey = msk.iter().map(group::mul_base).collect();

    tracing::debug!(dimension = pp.dimension, "key_gen complete");
    (mpk, msk)
}

/// Derives `fsk = (y, <MSK, y> mod q)`. Requires `policy.len() == pp.dimension`.
pub fn key_derive(pp: &PublicParams, msk: &MasterSecretKey, policy: &[Scalar]) -> Result<FunctionalSecretKey, IpfeError> {
    if policy.len() != pp.dimension {
        return Err(IpfeError::DimensionMismatch {
            expected: pp.dimension,
            got: policy.len(),
        });
    }
    let sk = group::inner_product_scalars(msk, policy)?;

    tracing::debug!("key_derive complete");
    Ok(FunctionalSecretKey {
        policy: policy.to_vec(),
        sk,
    })
}

/// Encrypts `x` under `mpk`. Requires `x.len() == pp.dimension`.
///
/// Samples a fresh uniform `r`, sets `X = g^r` and, for each `i`,
/// `Y[i] = MPK[i]^r * g^{x[i]}` — computed as one two-base multi-
/// exponentiation per component rather than two sequential multiplications.
pub fn encrypt(pp: &PublicParams, mpk: &MasterPublicKey, x: &[Scalar]) -> Result<Ciphertext, IpfeError> {
    if x.len() != pp.dimension {
        return Err(IpfeError::DimensionMismatch {
            expected: pp.dimension,
            got: x.len(),
        });
    }

    let mut rng = group::secure_rng();
    let r = group::random_scalar(&mut rng);

    let ct_x = group::mul_point(&r, &pp.g);
    let y = mpk
        .iter()
        .zip(x.iter())
        .map(|(pk_i, x_i)| {
            let masked = group::mul_point(&r, pk_i);
            let blinded = group::mul_point(x_i, &pp.g);
            group::point_add(&masked, &blinded)
        })
        .collect();

    tracing::debug!(dimension = pp.dimension, "encrypt complete");
    Ok(Ciphertext { x: ct_x, y })
}

/// Decrypts `ct` under `fsk`, recovering `<x, y> mod q` as an integer in
/// `[0, 2^dlog_len)` by way of the bounded DLOG solver.
///
/// `M = (prod_i Y[i]^{y[i]}) / X^{sk_y} = g^{<x,y>}`; recovering the
/// exponent of `M` is delegated to [`dlog::solve`] against `table`.
pub fn decrypt(
    pp: &PublicParams,
    fsk: &FunctionalSecretKey,
    ct: &Ciphertext,
    table: &GiantStepTable,
) -> Result<u64, IpfeError> {
    if ct.y.len() != pp.dimension {
        return Err(IpfeError::DimensionMismatch {
            expected: pp.dimension,
            got: ct.y.len(),
        });
    }
    if fsk.policy.len() != pp.dimension {
        return Err(IpfeError::DimensionMismatch {
            expected: pp.dimension,
            got: fsk.policy.len(),
        });
    }

    // sum_i Y[i]^{y[i]} via multi-scalar multiplication, never a naive
    // per-point loop — see group::msm's contract.
    let masked_sum = group::msm(&ct.y, &fsk.policy)?;
    let blinding = group::mul_point(&fsk.sk, &ct.x);
    let m = group::point_sub(&masked_sum, &blinding);

    let result = dlog::solve(table, &pp.g, &m, pp.thread_count)?;
    tracing::debug!(result, "decrypt complete");
    Ok(result)
}

/// Convenience wrapper over [`initialize`] that resolves the table
/// directory to the process's current working directory, mirroring the
/// reference implementation's single well-known table file in-place.
pub fn initialize_in_cwd(pp: &PublicParams) -> Result<GiantStepTable, IpfeError> {
    let dir: PathBuf = std::env::current_dir()?;
    initialize(pp, &dir)
}
