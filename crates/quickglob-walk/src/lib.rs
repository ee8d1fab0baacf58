//! Directory walker and glob driver for `quickglob`.
//!
//! Builds on `quickglob_core`'s pattern compiler and fnmatch engine to
//! implement the filesystem-facing half of the library: a platform-
//! adaptive directory walker, the glob driver that ties compiling,
//! walking, matching, and result collection together, an optional
//! `.gitignore`-driven subtree pruner, and the borrowed-mode
//! `match_paths` entry point for matching against an in-memory list of
//! paths instead of a live filesystem.

pub mod driver;
pub mod error;
pub mod matchpaths;
pub mod walker;

mod pathbytes;

#[cfg(feature = "gitignore")]
pub mod gitignore;

#[cfg(feature = "cabi")]
pub mod ffi;

pub use driver::{glob, EntryKind, GlobConfig};
pub use error::WalkError;
pub use matchpaths::match_paths;
pub use walker::{DirReader, StdDirReader, WalkEntry};

#[cfg(target_os = "linux")]
pub use walker::RawDirReader;
