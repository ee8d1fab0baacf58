//! Pattern compiler, fnmatch engine, brace expander, and result table for
//! `quickglob` — a fast, POSIX-`glob(3)`-compatible pathname expansion
//! library with modern shell extensions (`**`, `{a,b,c}`, `~`, `@(...)`).
//!
//! This crate has no filesystem dependence: it compiles patterns, matches
//! single segments and whole already-known paths, and builds result
//! tables. Directory traversal lives in `quickglob-walk`, which depends on
//! this crate for all of the above.

pub mod charclass;
pub mod error;
pub mod flags;
pub mod fnmatch;
pub mod pattern;
pub mod simd;

mod brace;
mod matchcore;
mod result;
mod tilde;

#[cfg(feature = "cabi")]
pub mod ffi;

pub use error::{Error, Result};
pub use flags::Flags;
pub use matchcore::match_paths;
pub use pattern::{compile, CompiledPattern, Expansion, Segment, SegmentKind};
pub use result::{MatchResult, OwnershipTag};
