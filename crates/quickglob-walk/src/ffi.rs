//! The filesystem-facing half of the `extern "C"` surface (`spec.md` §6):
//! `quickglob_glob`, paired with `quickglob_core::ffi::quickglob_globfree`
//! for release. Gated behind the `cabi` feature for the same reason
//! `quickglob_core::ffi` is — a pure-Rust consumer of this crate never
//! pays for it.

use std::os::raw::{c_char, c_int};

use quickglob_core::ffi::{self, QuickglobResult, QUICKGLOB_ABORTED, QUICKGLOB_NOMATCH, QUICKGLOB_NOSPACE};
use quickglob_core::{Error as CoreError, Flags};

use crate::driver::{self, GlobConfig};
use crate::error::WalkError;

/// Compiles `pattern` (a NUL-terminated byte string), walks the
/// filesystem, and writes the result into `*out`.
///
/// # Safety
/// `pattern` and `out` must be valid, non-null pointers; `pattern` must be
/// NUL-terminated and readable for the duration of this call.
#[no_mangle]
pub unsafe extern "C" fn quickglob_glob(
    pattern: *const c_char,
    flags: u32,
    out: *mut QuickglobResult,
) -> c_int {
    if pattern.is_null() || out.is_null() {
        return QUICKGLOB_ABORTED;
    }
    let pattern_bytes = std::ffi::CStr::from_ptr(pattern).to_bytes();
    let flags = Flags::from_bits_truncate(flags);
    let mut config = GlobConfig::from_flags(flags);

    match driver::glob(pattern_bytes, flags, &mut config, None) {
        Ok(result) => {
            if result.count() == 0 {
                return QUICKGLOB_NOMATCH;
            }
            *out = ffi::into_c_result(result);
            0
        }
        Err(WalkError::Pattern(CoreError::NoMatch)) => QUICKGLOB_NOMATCH,
        Err(WalkError::Pattern(CoreError::NoSpace)) => QUICKGLOB_NOSPACE,
        Err(_) => QUICKGLOB_ABORTED,
    }
}

/// Releases a [`QuickglobResult`] produced by `quickglob_glob` or
/// `quickglob_match_paths`; re-exported here so a C consumer linking only
/// against this crate's `cdylib` still has one release function for both.
///
/// # Safety
/// Same contract as `quickglob_core::ffi::quickglob_globfree`.
pub use quickglob_core::ffi::quickglob_globfree;

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::fs;

    #[test]
    fn glob_matches_files_via_c_abi() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::write(dir.path().join("c.rs"), b"").unwrap();

        let pattern = format!("{}/*.txt", dir.path().display());
        let cpattern = CString::new(pattern).unwrap();
        let mut out = std::mem::MaybeUninit::<QuickglobResult>::uninit();

        let rc = unsafe { quickglob_glob(cpattern.as_ptr(), 0, out.as_mut_ptr()) };
        assert_eq!(rc, 0);

        unsafe {
            let result = out.assume_init();
            assert_eq!(result.count, 2);
            let mut result = result;
            quickglob_globfree(&mut result as *mut QuickglobResult);
        }
    }

    #[test]
    fn glob_reports_nomatch_via_c_abi() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.nonexistent", dir.path().display());
        let cpattern = CString::new(pattern).unwrap();
        let mut out = std::mem::MaybeUninit::<QuickglobResult>::uninit();

        let rc = unsafe { quickglob_glob(cpattern.as_ptr(), 0, out.as_mut_ptr()) };
        assert_eq!(rc, QUICKGLOB_NOMATCH);
    }
}
