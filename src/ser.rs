//! Fixed-width wire encoding for ciphertexts.
//!
//! `Ciphertext` is encoded as `serialize_point(X)` (from [`crate::group`])
//! followed by `dimension` instances of `serialize_point(Y[i])`, concatenated
//! with no length prefix: the reader recovers `dimension` from
//! `PublicParams` rather than from the wire format itself, mirroring the
//! reference tool's own fixed-shape ciphertext file.

#![forbid(unsafe_code)]

use crate::error::IpfeError;
use crate::group::{self, Point, POINT_LEN};
use crate::ipfe::Ciphertext;

/// Encodes `ct` as `POINT_LEN * (1 + dimension)` bytes: `X` then `Y[0..dimension)`.
pub fn serialize_ciphertext(ct: &Ciphertext) -> Result<Vec<u8>, IpfeError> {
    let mut out = Vec::with_capacity(POINT_LEN * (1 + ct.y.len()));
    out.extend_from_slice(&group::serialize_point(&ct.x)?);
    for p in &ct.y {
        out.extend_from_slice(&group::serialize_point(p)?);
    }
    Ok(out)
}

/// Decodes a ciphertext for a scheme of the given `dimension` from `bytes`.
///
/// `bytes` MUST be exactly `POINT_LEN * (1 + dimension)` long; any other
/// length is a dimension mismatch rather than a truncated-read I/O error,
/// since this format carries no length prefix to distinguish the two.
pub fn deserialize_ciphertext(bytes: &[u8], dimension: usize) -> Result<Ciphertext, IpfeError> {
    let want = POINT_LEN * (1 + dimension);
    if bytes.len() != want {
        return Err(IpfeError::DimensionMismatch {
            expected: want,
            got: bytes.len(),
        });
    }

    let x = decode_point_at(bytes, 0)?;
    let mut y = Vec::with_capacity(dimension);
    for i in 0..dimension {
        y.push(decode_point_at(bytes, 1 + i)?);
    }
    Ok(Ciphertext { x, y })
}

fn decode_point_at(bytes: &[u8], slot: usize) -> Result<Point, IpfeError> {
    let start = slot * POINT_LEN;
    let mut buf = [0u8; POINT_LEN];
    buf.copy_from_slice(&bytes[start..start + POINT_LEN]);
    group::deserialize_point(&buf)
}
