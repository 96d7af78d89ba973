//! Group arithmetic adapter (component A).
//!
//! Wraps `ark_bn254`'s `G1` group and its scalar field `Fr`. All arithmetic
//! here is pure and never retries; size mismatches between operand vectors
//! are returned as [`IpfeError::DimensionMismatch`] rather than panicking.
//! The OpenSSL-backed reference implementation this scheme is modeled on
//! passes raw pointer vectors between routines and calls `exit()` on a
//! length mismatch; arkworks gives us owned, checked slices, so there is no
//! reason to keep that process-exit behavior here.
//!
//! Randomness is drawn from [`rand::rngs::OsRng`], a CSPRNG seeded by the
//! operating system. This crate never falls back to a deterministic PRG
//! unless the caller explicitly opts in via the `dev-insecure-rng` feature
//! (see [`insecure_dev_rng`]).

#![forbid(unsafe_code)]

use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use rand::RngCore;

use crate::error::IpfeError;

/// Scalar field of the curve (integers mod the group order `q`).
pub type Scalar = ark_bn254::Fr;

/// Prime-order EC group element (BN254 `G1`, affine form).
pub type Point = ark_bn254::G1Affine;

/// Canonical byte width of a serialized [`Scalar`].
pub const BN_LEN: usize = 32;

/// Canonical byte width of a compressed [`Point`].
pub const POINT_LEN: usize = 32;

/// A stable identifier for the curve this adapter is built over, used to
/// key the on-disk DLOG table filename so a table built for one curve is
/// never silently loaded against another.
pub const CURVE_ID: &str = "bn254-g1";

/// Returns the canonical group generator `g`.
#[inline]
pub fn generator() -> Point {
    Point::generator()
}

/// Cryptographically secure RNG used for all randomness in this crate.
///
/// Returns the OS CSPRNG by default. A reimplementation MUST NOT silently
/// substitute a deterministic generator; see [`insecure_dev_rng`] for the
/// explicit, feature-gated opt-out used only in tests and demos.
#[inline]
pub fn secure_rng() -> rand::rngs::OsRng {
    rand::rngs::OsRng
}

/// A deterministic, **publicly seeded** RNG for reproducible demos/tests.
///
/// Only available behind the `dev-insecure-rng` feature. Never use outside
/// tests: the seed is fixed, so every value drawn from this RNG is
/// predictable to anyone who reads this source file.
#[cfg(feature = "dev-insecure-rng")]
pub fn insecure_dev_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::from_seed([7u8; 32])
}

/// Samples a uniformly random scalar in `[0, q)`.
pub fn random_scalar<R: RngCore + ?Sized>(rng: &mut R) -> Scalar {
    Scalar::rand(rng)
}

/// `a + b mod q`.
#[inline]
pub fn scalar_add(a: &Scalar, b: &Scalar) -> Scalar {
    *a + *b
}

/// `a - b mod q`.
#[inline]
pub fn scalar_sub(a: &Scalar, b: &Scalar) -> Scalar {
    *a - *b
}

/// `-a mod q`.
#[inline]
pub fn scalar_neg(a: &Scalar) -> Scalar {
    -*a
}

/// `a * b mod q`.
#[inline]
pub fn scalar_mul(a: &Scalar, b: &Scalar) -> Scalar {
    *a * *b
}

/// Builds a scalar from a small unsigned integer.
#[inline]
pub fn scalar_from_u64(v: u64) -> Scalar {
    Scalar::from(v)
}

/// `g^k` using the fixed base generator.
#[inline]
pub fn mul_base(k: &Scalar) -> Point {
    (Point::generator() * *k).into_affine()
}

/// `k * p` for an arbitrary (variable-base) point `p`.
#[inline]
pub fn mul_point(k: &Scalar, p: &Point) -> Point {
    (*p * *k).into_affine()
}

/// Group addition `a + b`.
#[inline]
pub fn point_add(a: &Point, b: &Point) -> Point {
    (*a + *b).into_affine()
}

/// Group subtraction `a - b` (add the inverse).
#[inline]
pub fn point_sub(a: &Point, b: &Point) -> Point {
    (a.into_group() - b.into_group()).into_affine()
}

/// Multi-scalar multiplication `sum_i k_i * p_i`.
///
/// Callers (in particular `decrypt`) MUST use this instead of a naive
/// per-point loop: `ark_ec::VariableBaseMSM` amortizes the scalar
/// decomposition across all terms, which is the same optimization the
/// reference implementation gets from OpenSSL's batched point-multiply.
pub fn msm(points: &[Point], scalars: &[Scalar]) -> Result<Point, IpfeError> {
    if points.len() != scalars.len() {
        return Err(IpfeError::DimensionMismatch {
            expected: points.len(),
            got: scalars.len(),
        });
    }
    if points.is_empty() {
        return Ok(Point::zero());
    }
    let acc = <ark_bn254::G1Projective as VariableBaseMSM>::msm(points, scalars)
        .map_err(|_| IpfeError::DimensionMismatch { expected: points.len(), got: scalars.len() })?;
    Ok(acc.into_affine())
}

/// Element-wise `result[i] = points[i]^c` for a shared scalar `c`.
pub fn scale_points(points: &[Point], c: &Scalar) -> Vec<Point> {
    points.iter().map(|p| mul_point(c, p)).collect()
}

/// Element-wise `result[i] = points[i]^{scalars[i]}`.
pub fn product_points(points: &[Point], scalars: &[Scalar]) -> Result<Vec<Point>, IpfeError> {
    if points.len() != scalars.len() {
        return Err(IpfeError::DimensionMismatch {
            expected: points.len(),
            got: scalars.len(),
        });
    }
    Ok(points
        .iter()
        .zip(scalars.iter())
        .map(|(p, s)| mul_point(s, p))
        .collect())
}

/// Scalar-vector inner product `sum_i a_i * b_i mod q`.
pub fn inner_product_scalars(a: &[Scalar], b: &[Scalar]) -> Result<Scalar, IpfeError> {
    if a.len() != b.len() {
        return Err(IpfeError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).fold(Scalar::zero(), |acc, (x, y)| acc + *x * *y))
}

/// Serializes a [`Scalar`] to exactly [`BN_LEN`] bytes (big-endian, canonical).
pub fn serialize_scalar(s: &Scalar) -> [u8; BN_LEN] {
    let mut le = Vec::with_capacity(BN_LEN);
    s.serialize_compressed(&mut le).expect("scalar serialize");
    debug_assert_eq!(le.len(), BN_LEN);
    // ark-serialize emits little-endian; flip to big-endian on the wire to
    // match the reference implementation's OpenSSL `BN_bn2bin`-style
    // big-endian, left-zero-padded encoding.
    le.reverse();
    let mut out = [0u8; BN_LEN];
    out.copy_from_slice(&le);
    out
}

/// Deserializes a [`Scalar`] from exactly [`BN_LEN`] big-endian bytes.
pub fn deserialize_scalar(bytes: &[u8; BN_LEN]) -> Result<Scalar, IpfeError> {
    let mut le = bytes.to_vec();
    le.reverse();
    Scalar::deserialize_with_mode(le.as_slice(), Compress::Yes, Validate::Yes)
        .map_err(|e| IpfeError::ParameterOutOfRange(format!("malformed scalar: {e}")))
}

/// Serializes a [`Point`] to exactly [`POINT_LEN`] bytes, compressed SEC1-style.
pub fn serialize_point(p: &Point) -> Result<[u8; POINT_LEN], IpfeError> {
    let mut bytes = Vec::with_capacity(POINT_LEN);
    p.serialize_compressed(&mut bytes)
        .map_err(|e| IpfeError::ParameterOutOfRange(format!("point serialize: {e}")))?;
    if bytes.len() != POINT_LEN {
        return Err(IpfeError::ParameterOutOfRange(format!(
            "unexpected compressed point width: got {}, want {}",
            bytes.len(),
            POINT_LEN
        )));
    }
    let mut out = [0u8; POINT_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Deserializes a [`Point`] from exactly [`POINT_LEN`] compressed bytes.
pub fn deserialize_point(bytes: &[u8; POINT_LEN]) -> Result<Point, IpfeError> {
    Point::deserialize_with_mode(bytes.as_slice(), Compress::Yes, Validate::Yes)
        .map_err(|e| IpfeError::ParameterOutOfRange(format!("malformed point: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_roundtrip() {
        let mut rng = secure_rng();
        let s = random_scalar(&mut rng);
        let bytes = serialize_scalar(&s);
        assert_eq!(bytes.len(), BN_LEN);
        let s2 = deserialize_scalar(&bytes).unwrap();
        assert_eq!(s, s2);
    }

    #[test]
    fn point_roundtrip() {
        let mut rng = secure_rng();
        let s = random_scalar(&mut rng);
        let p = mul_base(&s);
        let bytes = serialize_point(&p).unwrap();
        assert_eq!(bytes.len(), POINT_LEN);
        let p2 = deserialize_point(&bytes).unwrap();
        assert_eq!(p, p2);
    }

    #[test]
    fn msm_matches_naive_sum() {
        let mut rng = secure_rng();
        let n = 6;
        let scalars: Vec<Scalar> = (0..n).map(|_| random_scalar(&mut rng)).collect();
        let points: Vec<Point> = (0..n)
            .map(|_| mul_base(&random_scalar(&mut rng)))
            .collect();

        let naive = points
            .iter()
            .zip(scalars.iter())
            .fold(Point::zero(), |acc, (p, s)| point_add(&acc, &mul_point(s, p)));

        let fast = msm(&points, &scalars).unwrap();
        assert_eq!(naive, fast);
    }

    #[test]
    fn dimension_mismatch_is_recoverable() {
        let points = vec![generator(), generator()];
        let scalars = vec![Scalar::from(1u64)];
        assert!(matches!(
            msm(&points, &scalars),
            Err(IpfeError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            inner_product_scalars(&scalars, &[]),
            Err(IpfeError::DimensionMismatch { expected: 1, got: 0 })
        ));
    }

    #[test]
    fn inner_product_matches_definition() {
        let a = vec![scalar_from_u64(3), scalar_from_u64(5)];
        let b = vec![scalar_from_u64(2), scalar_from_u64(7)];
        let got = inner_product_scalars(&a, &b).unwrap();
        assert_eq!(got, scalar_from_u64(3 * 2 + 5 * 7));
    }

    #[test]
    fn scale_points_matches_per_point_multiply() {
        let mut rng = secure_rng();
        let c = random_scalar(&mut rng);
        let points: Vec<Point> = (0..4).map(|_| mul_base(&random_scalar(&mut rng))).collect();

        let got = scale_points(&points, &c);
        let want: Vec<Point> = points.iter().map(|p| mul_point(&c, p)).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn product_points_matches_per_pair_multiply() {
        let mut rng = secure_rng();
        let points: Vec<Point> = (0..4).map(|_| mul_base(&random_scalar(&mut rng))).collect();
        let scalars: Vec<Scalar> = (0..4).map(|_| random_scalar(&mut rng)).collect();

        let got = product_points(&points, &scalars).unwrap();
        let want: Vec<Point> = points
            .iter()
            .zip(scalars.iter())
            .map(|(p, s)| mul_point(s, p))
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn product_points_rejects_mismatched_lengths() {
        let points = vec![generator(), generator()];
        let scalars = vec![Scalar::from(1u64)];
        assert!(matches!(
            product_points(&points, &scalars),
            Err(IpfeError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }
}
