//! Error type shared by all engines, encodings and protocols.
//!
//! Errors fall into a few broad classes:
//!
//!  - Configuration errors (`InvalidArgument`, `InvalidKey`,
//!    `KeyTooSmall`): the call site passed a key of the wrong role, keys
//!    from mismatched domain parameters, or a key too small for the
//!    selected encoding. These are never transient.
//!
//!  - Data-format errors (`InvalidCipherText`): a padding or integrity
//!    check failed while decoding. A single variant without detail is
//!    used, so that the error value does not tell which
//!    check failed.
//!
//!  - Resource errors (`DataLength`): input too long for the block, or
//!    requested output larger than what a KDF can produce.
//!
//!  - Sequencing errors (`InvalidState`): an engine used before `init()`,
//!    or a multi-step protocol invoked out of order.
//!
//!  - Degenerate agreement results (`InvalidAgreement`).
//!
//! An invalid signature is not an error; verification functions return
//! `false` in that case.

use thiserror::Error;

/// Errors reported by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Wrong parameter or key role supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Key or public value outside of its valid range.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// Key modulus too small for the selected hash and salt sizes.
    #[error("key too small for the selected encoding parameters")]
    KeyTooSmall,

    /// Malformed padding or failed integrity check.
    #[error("invalid cipher text")]
    InvalidCipherText,

    /// Input or output length outside of the supported range.
    #[error("data length error: {0}")]
    DataLength(&'static str),

    /// Operation invoked in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The agreement computation yielded a degenerate value.
    #[error("invalid agreement: {0}")]
    InvalidAgreement(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
