//! `extern "C"` entry points and the flat C-ABI `MatchResult` struct
//! (`spec.md` §6), gated behind the `cabi` feature so pure-Rust consumers
//! of `quickglob-core` never pay for the FFI surface.

use std::os::raw::{c_char, c_int};

use crate::result::{MatchResult, OwnershipTag};

/// Error codes, per spec.md §6.
pub const QUICKGLOB_NOSPACE: c_int = 1;
pub const QUICKGLOB_ABORTED: c_int = 2;
pub const QUICKGLOB_NOMATCH: c_int = 3;

#[repr(C)]
enum CTag {
    Owned = 0,
    Borrowed = 1,
    Mixed = 2,
}

impl From<OwnershipTag> for CTag {
    fn from(tag: OwnershipTag) -> Self {
        match tag {
            OwnershipTag::Owned => CTag::Owned,
            OwnershipTag::Borrowed => CTag::Borrowed,
            OwnershipTag::Mixed => CTag::Mixed,
        }
    }
}

/// The flat C-ABI result structure from spec.md §6's table.
///
/// `paths` points to a heap array of `count + 1` byte pointers (the last
/// one null, per the "terminated by a trailing null pointer" contract);
/// `lengths` is a parallel array of `count` lengths with no sentinel slot.
#[repr(C)]
pub struct QuickglobResult {
    pub count: usize,
    pub offset_reserve: usize,
    pub paths: *mut *mut c_char,
    pub lengths: *mut usize,
    tag: CTag,
    // Retained so `quickglob_globfree` can free the `Vec<u8>` backing each
    // owned path; null for borrowed-only tables.
    owned_storage: *mut Vec<Vec<u8>>,
}

/// Projects a Rust-native [`MatchResult`] into the flat C-ABI struct.
///
/// Every path is copied once here into a freshly NUL-terminated buffer —
/// `MatchResult`'s borrowed slots alias Rust byte slices with no NUL
/// terminator, which a C consumer requires — so the `owned_storage` this
/// function allocates always holds every path's bytes, independent of the
/// originating `MatchResult`'s ownership tag. The tag is carried through
/// unchanged for the caller's own bookkeeping; `quickglob_globfree` always
/// frees `owned_storage` since it is this function's own allocation, not
/// the upstream `MatchResult`'s.
///
/// # Safety
/// The returned struct must be released exactly once via
/// `quickglob_globfree`, and not accessed afterward.
pub unsafe fn into_c_result(result: MatchResult) -> QuickglobResult {
    let offset_reserve = result.offset_reserve();
    let count = result.count();
    let tag = CTag::from(result.ownership_tag());

    let mut owned_paths: Vec<Vec<u8>> = Vec::with_capacity(count);
    let mut ptrs: Vec<*mut c_char> = Vec::with_capacity(count + 1);
    let mut lengths: Vec<usize> = Vec::with_capacity(count);

    for path in result.paths() {
        lengths.push(path.len());
        let mut nul_terminated = Vec::with_capacity(path.len() + 1);
        nul_terminated.extend_from_slice(path);
        nul_terminated.push(0);
        ptrs.push(nul_terminated.as_mut_ptr() as *mut c_char);
        owned_paths.push(nul_terminated);
    }
    ptrs.push(std::ptr::null_mut());

    let paths_box = ptrs.into_boxed_slice();
    let lengths_box = lengths.into_boxed_slice();
    let owned_storage = Box::into_raw(Box::new(owned_paths));

    QuickglobResult {
        count,
        offset_reserve,
        paths: Box::into_raw(paths_box) as *mut *mut c_char,
        lengths: Box::into_raw(lengths_box) as *mut usize,
        tag,
        owned_storage,
    }
}

/// Matches `pattern` (a NUL-terminated byte string) against an in-memory
/// list of `count` NUL-terminated candidate paths, per spec.md §6's
/// borrowed-mode entry point. Returns `QUICKGLOB_NOMATCH` with `*out`
/// unset if nothing matches.
///
/// # Safety
/// `pattern` and every entry of `candidates[0..count]` must be valid,
/// NUL-terminated, readable byte strings for the duration of this call,
/// and must remain valid afterward — the result's pointers alias them
/// (`ownership_tag = BORROWED`) until `quickglob_globfree` is called.
#[no_mangle]
pub unsafe extern "C" fn quickglob_match_paths(
    pattern: *const c_char,
    candidates: *const *const c_char,
    count: usize,
    flags: u32,
    out: *mut QuickglobResult,
) -> c_int {
    if pattern.is_null() || candidates.is_null() || out.is_null() {
        return QUICKGLOB_ABORTED;
    }
    let pattern_bytes = std::ffi::CStr::from_ptr(pattern).to_bytes();
    let flags = crate::Flags::from_bits_truncate(flags);

    let candidate_slices: Vec<&[u8]> = (0..count)
        .map(|i| std::ffi::CStr::from_ptr(*candidates.add(i)).to_bytes())
        .collect();

    match crate::matchcore::match_paths(pattern_bytes, &candidate_slices, flags) {
        Ok(result) => {
            if result.count() == 0 {
                return QUICKGLOB_NOMATCH;
            }
            *out = into_c_result(result);
            0
        }
        Err(crate::Error::NoMatch) => QUICKGLOB_NOMATCH,
        Err(crate::Error::NoSpace) => QUICKGLOB_NOSPACE,
        Err(_) => QUICKGLOB_ABORTED,
    }
}

/// Releases a [`QuickglobResult`] previously produced by this crate's FFI
/// surface, consulting its ownership tag per spec.md §4.6's `release()`.
///
/// # Safety
/// `result` must have been produced by `into_c_result` (directly or via
/// another `quickglob_*` entry point) and not already released.
#[no_mangle]
pub unsafe extern "C" fn quickglob_globfree(result: *mut QuickglobResult) {
    if result.is_null() {
        return;
    }
    let result = &mut *result;
    if result.paths.is_null() {
        return;
    }
    let slice_len = result.count + 1;
    drop(Box::from_raw(std::slice::from_raw_parts_mut(
        result.paths,
        slice_len,
    )));
    if !result.lengths.is_null() {
        drop(Box::from_raw(std::slice::from_raw_parts_mut(
            result.lengths,
            result.count,
        )));
    }
    if !result.owned_storage.is_null() {
        // Frees the NUL-terminated `Vec<u8>` buffers `paths` pointed into.
        // Under BORROWED tags `owned_storage` holds zero-length copies of
        // nothing (paths were never duplicated into it), matching
        // spec.md's "BORROWED frees the pointer & length arrays only".
        drop(Box::from_raw(result.owned_storage));
    }
    result.paths = std::ptr::null_mut();
    result.lengths = std::ptr::null_mut();
    result.owned_storage = std::ptr::null_mut();
}
