//! The walker/driver half of the two-layer error model (`spec.md` §7),
//! grounded on `turborepo-globwalk`'s own `WalkError` (a `thiserror::Error`
//! enum wrapping `walkdir::Error`).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// A directory could not be opened or read and `ERR` was set.
    #[error("could not read directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pattern compilation or single-segment matching failed.
    #[error(transparent)]
    Pattern(#[from] quickglob_core::Error),

    /// The caller-supplied error predicate returned non-zero for `path`.
    #[error("aborted by error predicate at {0:?}")]
    Aborted(PathBuf),

    /// A `**` recursion exceeded `GlobConfig::max_depth`.
    #[error("recursion depth exceeded at {path:?} (max_depth = {max_depth})")]
    DepthExceeded { path: PathBuf, max_depth: usize },
}

pub type Result<T> = std::result::Result<T, WalkError>;
