//! Tilde expansion: `~` and `~user` (`spec.md` §4.4, the pattern
//! compiler's step 2).
//!
//! Only a leading `~` in the first path segment is eligible; a `~`
//! appearing mid-pattern, or after an escape, is left alone.

use crate::error::Error;

/// Outcome of attempting tilde expansion on a pattern's first segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TildeExpansion {
    /// No leading `~`; the pattern is returned unchanged by the caller.
    NotApplicable,
    /// Expanded to an absolute directory prefix.
    Expanded(Vec<u8>),
    /// `TILDE_CHECK` was set and `~user` did not resolve; caller should
    /// fail the whole pattern with `Error::InvalidPattern`.
    Unresolved,
}

/// Scans `pattern` for a leading `~[user]` run, stopping at the first `/`
/// or end of pattern. Returns the tilde text (without the `~`) and the
/// byte offset where the rest of the pattern resumes.
fn leading_tilde_run(pattern: &[u8]) -> Option<(&[u8], usize)> {
    if pattern.first() != Some(&b'~') {
        return None;
    }
    let end = pattern
        .iter()
        .position(|&b| b == b'/')
        .unwrap_or(pattern.len());
    Some((&pattern[1..end], end))
}

/// Expands a leading tilde, returning the replacement prefix and how many
/// bytes of `pattern` it replaces (the caller splices
/// `[expanded, &pattern[consumed..]].concat()`).
///
/// `check` mirrors `Flags::TILDE_CHECK`: when set, an unresolved `~user`
/// is a hard error rather than being left as a literal `~user`.
pub fn expand(pattern: &[u8], check: bool) -> Result<(TildeExpansion, usize), Error> {
    let Some((user, consumed)) = leading_tilde_run(pattern) else {
        return Ok((TildeExpansion::NotApplicable, 0));
    };

    let home = if user.is_empty() {
        dirs::home_dir().map(|p| path_to_bytes(&p))
    } else {
        lookup_user_home(user)
    };

    match home {
        Some(home) => Ok((TildeExpansion::Expanded(home), consumed)),
        None if check => Ok((TildeExpansion::Unresolved, consumed)),
        None => Ok((TildeExpansion::NotApplicable, 0)),
    }
}

#[cfg(unix)]
fn lookup_user_home(user: &[u8]) -> Option<Vec<u8>> {
    use std::ffi::CString;

    let cname = CString::new(user).ok()?;
    // SAFETY: `getpwnam_r` is reentrant by design; `buf` backs `result`'s
    // pointers for the duration of this call only, and we copy out the
    // home directory before `buf` drops.
    unsafe {
        let mut pwd: libc::passwd = std::mem::zeroed();
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let mut buf = vec![0i8; 16 * 1024];
        let rc = libc::getpwnam_r(
            cname.as_ptr(),
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        );
        if rc != 0 || result.is_null() {
            return None;
        }
        if pwd.pw_dir.is_null() {
            return None;
        }
        let dir = std::ffi::CStr::from_ptr(pwd.pw_dir);
        Some(dir.to_bytes().to_vec())
    }
}

#[cfg(not(unix))]
fn lookup_user_home(_user: &[u8]) -> Option<Vec<u8>> {
    // No portable `~user` database off Unix; only bare `~` resolves.
    None
}

#[cfg(unix)]
fn path_to_bytes(p: &std::path::Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    p.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(p: &std::path::Path) -> Vec<u8> {
    p.to_string_lossy().into_owned().into_bytes()
}
