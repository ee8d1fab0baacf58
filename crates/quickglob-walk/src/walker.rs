//! The directory walker (`spec.md` §4.4): a capability trait over "read
//! one directory, yield `(name, kind)` pairs", with a portable
//! `std::fs`-backed implementation and a Linux-specific raw `getdents64`
//! fast path.
//!
//! Grounded on the `CapSoftware-globlin` manifest reference, which pulls
//! in `libc` under `target.'cfg(target_os = "linux")'.dependencies`
//! specifically "for getdents64 syscall" — the same batched-read,
//! parse-`d_type`-in-place design this module implements.

use std::fs;
use std::path::Path;

use crate::error::{Result, WalkError};

/// The kind of a directory entry, as reported by the OS where possible
/// without an extra `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
    /// The OS did not report a type inline (`DT_UNKNOWN`); callers that
    /// need to know must `stat` explicitly.
    Unknown,
}

/// One directory entry, excluding `.` and `..`, in filesystem order (the
/// walker itself never sorts).
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub name: Vec<u8>,
    pub kind: EntryKind,
}

/// A capability to read the immediate children of one directory.
///
/// Implementations must skip `.` and `..` and must not recurse; the
/// driver owns recursion.
pub trait DirReader {
    fn read_dir(&self, path: &Path) -> Result<Vec<WalkEntry>>;
}

/// Portable baseline: wraps `std::fs::read_dir` and infers `EntryKind`
/// from `DirEntry::file_type()`, which on most platforms is free (derived
/// from the same readdir buffer) and falls back to a `stat` only when the
/// OS doesn't report it inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDirReader;

impl DirReader for StdDirReader {
    fn read_dir(&self, path: &Path) -> Result<Vec<WalkEntry>> {
        let iter = fs::read_dir(path).map_err(|source| WalkError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in iter {
            let entry = entry.map_err(|source| WalkError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let kind = entry
                .file_type()
                .map(|ft| {
                    if ft.is_dir() {
                        EntryKind::Dir
                    } else if ft.is_symlink() {
                        EntryKind::Symlink
                    } else if ft.is_file() {
                        EntryKind::File
                    } else {
                        EntryKind::Other
                    }
                })
                .unwrap_or(EntryKind::Unknown);
            entries.push(WalkEntry {
                name: crate::pathbytes::to_bytes(&entry.file_name()),
                kind,
            });
        }
        Ok(entries)
    }
}

/// Linux-only fast path: a single buffered `SYS_getdents64` read per
/// directory, reusing a page-sized scratch buffer across calls and
/// parsing `d_type` directly out of the kernel's record, avoiding the
/// per-entry `lstat` that `DT_UNKNOWN` would otherwise force.
#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct RawDirReader {
    buf_size: usize,
}

#[cfg(target_os = "linux")]
impl Default for RawDirReader {
    fn default() -> Self {
        // One page: large enough to amortize the syscall for typical
        // directories without over-committing memory per walker.
        RawDirReader { buf_size: 4096 }
    }
}

#[cfg(target_os = "linux")]
impl DirReader for RawDirReader {
    fn read_dir(&self, path: &Path) -> Result<Vec<WalkEntry>> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let cpath = CString::new(path.as_os_str().as_bytes()).map_err(|_| WalkError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "nul byte in path"),
        })?;

        // SAFETY: `open` is called with a valid NUL-terminated path and
        // standard directory-read flags; the returned fd is owned by this
        // function and closed on every exit path below.
        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDONLY | libc::O_DIRECTORY) };
        if fd < 0 {
            return Err(WalkError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::last_os_error(),
            });
        }

        let result = self.read_fd(fd, path);
        // SAFETY: `fd` was just opened above and is not used afterward.
        unsafe {
            libc::close(fd);
        }
        result
    }
}

#[cfg(target_os = "linux")]
impl RawDirReader {
    fn read_fd(&self, fd: i32, path: &Path) -> Result<Vec<WalkEntry>> {
        let mut buf = vec![0u8; self.buf_size];
        let mut entries = Vec::new();

        loop {
            // SAFETY: `buf` is sized `self.buf_size` and the syscall never
            // writes past that; `fd` is a valid, open directory descriptor
            // for the lifetime of this call.
            let n = unsafe {
                libc::syscall(
                    libc::SYS_getdents64,
                    fd,
                    buf.as_mut_ptr(),
                    self.buf_size as libc::c_uint,
                )
            };
            if n < 0 {
                return Err(WalkError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::last_os_error(),
                });
            }
            if n == 0 {
                break;
            }
            parse_dirents(&buf[..n as usize], &mut entries);
        }
        Ok(entries)
    }
}

/// `struct linux_dirent64`'s fixed header is 19 bytes on the wire (`d_ino`
/// u64, `d_off` i64, `d_reclen` u16, `d_type` u8) — unpadded, unlike the
/// equivalent Rust struct would be, so we index the buffer directly
/// rather than transmute through a `#[repr(C)]` type (see `getdents64(2)`).
#[cfg(target_os = "linux")]
const DIRENT64_HEADER_LEN: usize = 19;

#[cfg(target_os = "linux")]
fn parse_dirents(buf: &[u8], out: &mut Vec<WalkEntry>) {
    const HEADER_LEN: usize = DIRENT64_HEADER_LEN;
    let mut offset = 0usize;
    while offset + HEADER_LEN <= buf.len() {
        let reclen = u16::from_ne_bytes([buf[offset + 16], buf[offset + 17]]) as usize;
        if reclen == 0 || offset + reclen > buf.len() {
            break;
        }
        let d_type = buf[offset + 18];
        let name_start = offset + 19;
        let name_end = buf[name_start..offset + reclen]
            .iter()
            .position(|&b| b == 0)
            .map(|p| name_start + p)
            .unwrap_or(offset + reclen);
        let name = &buf[name_start..name_end];

        if name != b"." && name != b".." {
            out.push(WalkEntry {
                name: name.to_vec(),
                kind: dtype_to_kind(d_type),
            });
        }
        offset += reclen;
    }
}

#[cfg(target_os = "linux")]
fn dtype_to_kind(d_type: u8) -> EntryKind {
    match d_type {
        libc::DT_REG => EntryKind::File,
        libc::DT_DIR => EntryKind::Dir,
        libc::DT_LNK => EntryKind::Symlink,
        libc::DT_UNKNOWN => EntryKind::Unknown,
        _ => EntryKind::Other,
    }
}

/// The reader variant this build uses by default: `RawDirReader` on
/// Linux, `StdDirReader` elsewhere.
#[cfg(target_os = "linux")]
pub fn default_reader() -> impl DirReader {
    RawDirReader::default()
}

#[cfg(not(target_os = "linux"))]
pub fn default_reader() -> impl DirReader {
    StdDirReader
}
