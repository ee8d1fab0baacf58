//! The two-layer error model from `spec.md` §7.
//!
//! `NoMatch` is a distinguished non-fatal outcome, not a defect; everything
//! else is fatal and short-circuits the driver before it transfers ownership
//! of the result table to the caller.

use thiserror::Error;

/// Errors returned by pattern compilation and matching.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Successful execution, empty result set, and neither `NOCHECK` nor
    /// `NOMAGIC` rescued a literal fallback.
    #[error("no match for pattern")]
    NoMatch,

    /// A directory could not be read and `ERR` was set, or the caller's
    /// error predicate returned non-zero.
    #[error("aborted: {0}")]
    Aborted(String),

    /// Allocation failure while growing the result table.
    #[error("no space left to grow result table")]
    NoSpace,

    /// `ALTDIRFUNC`, or another flag bit this build does not implement.
    #[error("unsupported flag: {0}")]
    UnsupportedFlag(&'static str),

    /// Reserved for `TILDE_CHECK` resolution failures: `~user` did not
    /// resolve to a known user in the OS user database.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

impl Error {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatch)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
