//! Byte-string <-> `Path` conversions.
//!
//! The engine is 8-bit-clean end to end (`spec.md` §4.1's "encoding errors
//! ... are not diagnosed"); on Unix this is a free reinterpretation of
//! `OsStr`'s own byte representation, so no lossy round-trip ever happens
//! on the only platform this crate's Linux fast path targets.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[cfg(unix)]
pub fn to_bytes(s: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
pub fn to_bytes(s: &OsStr) -> Vec<u8> {
    s.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
pub fn to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub fn to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Byte-for-byte on Unix; on other platforms, normalized through
/// `path_slash` so `\`-separated components round-trip as the `/`-joined
/// segments the rest of the engine (and the ABI's pattern syntax)
/// expects.
#[cfg(unix)]
pub fn path_to_bytes(p: &Path) -> Vec<u8> {
    to_bytes(p.as_os_str())
}

#[cfg(not(unix))]
pub fn path_to_bytes(p: &Path) -> Vec<u8> {
    use path_slash::PathExt;
    p.to_slash_lossy().into_owned().into_bytes()
}
