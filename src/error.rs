//! Error kinds surfaced by the IP-FE core.
//!
//! The reference implementation terminates the process on dimension
//! mismatches and on out-of-range decryption. This crate instead returns
//! every error as a recoverable [`IpfeError`] and lets the caller decide.

#![forbid(unsafe_code)]

/// Unified error type for every public operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum IpfeError {
    /// `Setup` received parameters violating `dimension_len + 2*msg_len <= dlog_len`,
    /// or a table parameter (`tuning`, `dlog_len`) too large to build.
    #[error("parameter out of range: {0}")]
    ParameterOutOfRange(String),

    /// A vector operation received inputs of unequal length, or a scheme
    /// operation received a policy/message of length != `PublicParams::dimension`.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected vector length.
        expected: usize,
        /// Actual vector length supplied.
        got: usize,
    },

    /// The DLOG table file could not be read or written.
    #[error("table I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Table allocation failed (e.g. the requested table would not fit in memory).
    #[error("memory exhaustion: {0}")]
    MemoryExhaustion(String),

    /// `Dec` produced a group element whose discrete log does not lie in
    /// `[0, 2^dlog_len)`.
    #[error("discrete log out of range [0, 2^{dlog_len})")]
    OutOfRange {
        /// The `dlog_len` bound that was exceeded.
        dlog_len: u32,
    },
}
