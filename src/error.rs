//! Crate-wide error taxonomy.
//!
//! Every fallible operation in this crate returns one of four error kinds:
//! a well-formed input on which the operation is mathematically undefined
//! (`Domain`), a size bound that was exceeded (`Overflow`), a probabilistic
//! or heuristic algorithm that did not reach a definite answer within its
//! budget (`Unable`), or a violated internal invariant (`Internal`).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The four-kind error taxonomy shared by `Z`, `Q` and `Qx`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Inputs are well-formed but the operation is undefined on them (e.g.
    /// division by zero, modular inverse of a non-coprime value, `divexact`
    /// with a non-exact divisor).
    #[error("domain error: {0}")]
    Domain(String),

    /// A size bound was exceeded (e.g. an allocation or exponent too large
    /// to represent).
    #[error("overflow: {0}")]
    Overflow(String),

    /// A probabilistic or heuristic algorithm did not reach a definite
    /// answer within its effort budget.
    #[error("unable to reach a definite answer: {0}")]
    Unable(String),

    /// An internal invariant was violated. This indicates a bug in this
    /// crate rather than a caller mistake.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    /// Build a [`Error::Domain`] error.
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Build a [`Error::Overflow`] error.
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    /// Build a [`Error::Unable`] error.
    pub fn unable(msg: impl Into<String>) -> Self {
        Self::Unable(msg.into())
    }

    /// Build an [`Error::Internal`] error, logging it as a bug before
    /// returning it to the caller. Does not abort the process: a library
    /// should report, not kill its host.
    pub fn bug(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!(target: "flint_core::bug", "{msg}");
        Self::Internal(msg)
    }
}
