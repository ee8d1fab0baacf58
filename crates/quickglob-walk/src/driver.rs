//! The glob driver (`spec.md` §4.5): compile, walk, match, and collect.
//!
//! Orchestrates the pattern compiler and brace expander
//! (`quickglob_core`), the walker (`crate::walker`), and, when `GITIGNORE`
//! is set, the gitignore predicate (`crate::gitignore`) behind the
//! `gitignore` feature.

use std::path::{Path, PathBuf};
use std::time::Instant;

use quickglob_core::fnmatch::{self, MatchOptions};
use quickglob_core::{
    CompiledPattern, Error as CoreError, Expansion, Flags, MatchResult, Segment, SegmentKind,
};

use crate::error::{Result, WalkError};
use crate::pathbytes;
use crate::walker::{self, DirReader, EntryKind as DirEntryKind, WalkEntry};

/// Which kinds of entries the caller wants back, independent of the ABI
/// `ONLYDIR` flag. Supplemental to spec.md, grounded in the teacher's own
/// `WalkType::{Files,Folders,All}` enum (`crates/globwalk/src/lib.rs`);
/// `ONLYDIR` maps onto `EntryKind::Dirs` at the ABI boundary in
/// [`GlobConfig::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Files,
    Dirs,
    All,
}

impl EntryKind {
    fn accepts(&self, is_dir: bool) -> bool {
        match self {
            EntryKind::Files => !is_dir,
            EntryKind::Dirs => is_dir,
            EntryKind::All => true,
        }
    }
}

/// Caller-supplied knobs that sit alongside `Flags` (ambient addition;
/// spec.md §6 names only the bitmask, but every production walker carries
/// a recursion guard and a hookable error policy).
pub struct GlobConfig {
    /// Recursion guard for `**`; `None` means unbounded, matching libc
    /// `glob()`'s own lack of a depth limit.
    pub max_depth: Option<usize>,
    /// Whether to follow symlinks into directories while descending a
    /// `**` segment. Default `false` to avoid symlink loops (spec.md
    /// §4.4).
    pub follow_symlinks: bool,
    pub entry_kind: EntryKind,
    /// Called with `(path, errno)` for an unreadable directory when `ERR`
    /// is not set; returning `true` aborts the walk (spec.md §4.4/§7).
    pub error_predicate: Option<Box<dyn FnMut(&Path, i32) -> bool>>,
}

impl GlobConfig {
    pub fn from_flags(flags: Flags) -> Self {
        GlobConfig {
            max_depth: None,
            follow_symlinks: false,
            entry_kind: if flags.contains(Flags::ONLYDIR) {
                EntryKind::Dirs
            } else {
                EntryKind::All
            },
            error_predicate: None,
        }
    }
}

impl Default for GlobConfig {
    fn default() -> Self {
        GlobConfig::from_flags(Flags::empty())
    }
}

fn match_options(flags: Flags) -> MatchOptions {
    MatchOptions {
        no_escape: flags.contains(Flags::NOESCAPE),
        period: flags.contains(Flags::PERIOD),
        extglob: flags.contains(Flags::EXTGLOB),
    }
}

/// Runs the full glob algorithm for `pattern` under `flags`/`config`,
/// appending into `into` when it is `Some` (`APPEND` semantics) or
/// starting fresh otherwise.
pub fn glob(
    pattern: &[u8],
    flags: Flags,
    config: &mut GlobConfig,
    into: Option<MatchResult>,
) -> Result<MatchResult> {
    let start = Instant::now();
    let compiled: CompiledPattern = quickglob_core::compile(pattern, flags)?;
    let opts = match_options(flags);

    let mut result = into.unwrap_or_default();

    let max_depth = config.max_depth;
    let follow_symlinks = config.follow_symlinks;
    let entry_kind = config.entry_kind;
    let mut predicate = config.error_predicate.as_deref_mut();

    for expansion in &compiled.expansions {
        let dir = starting_dir(expansion);
        // A wholly-LITERAL pattern (no magic, no `**`) has an empty stem —
        // `dir` is the whole candidate path, which may be a plain file, not
        // a directory to walk. Only a non-empty stem requires `dir` itself
        // to be an openable directory (spec.md §4.5 step 2/3).
        if expansion.stem.is_empty() {
            if dir.exists() {
                emit_terminal(&dir, flags, entry_kind, &mut result);
            }
            continue;
        }
        if !dir.is_dir() {
            continue;
        }

        #[cfg(feature = "gitignore")]
        let pruner = if flags.contains(Flags::GITIGNORE) {
            Some(crate::gitignore::GitignorePruner::build(&dir))
        } else {
            None
        };

        let reader = walker::default_reader();
        let mut ctx = WalkCtx {
            flags,
            opts,
            entry_kind,
            max_depth,
            follow_symlinks,
            error_predicate: predicate.as_deref_mut(),
            #[cfg(feature = "gitignore")]
            pruner: pruner.as_ref(),
        };

        match_segments(&reader, &dir, &expansion.stem, 0, &mut ctx, &mut result)?;
    }

    if !flags.contains(Flags::NOSORT) {
        result.sort_and_dedup();
    }

    if result.count() == 0 {
        if flags.contains(Flags::NOCHECK) || (flags.contains(Flags::NOMAGIC) && !compiled.magchar) {
            result.append_owned(pattern);
            tracing::debug!(
                pattern = %String::from_utf8_lossy(pattern),
                matched = 0,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "glob completed via literal fallback",
            );
            return Ok(result);
        }
        tracing::debug!(
            pattern = %String::from_utf8_lossy(pattern),
            matched = 0,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "glob completed with no matches",
        );
        return Err(WalkError::Pattern(CoreError::NoMatch));
    }

    tracing::debug!(
        pattern = %String::from_utf8_lossy(pattern),
        matched = result.count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "glob completed",
    );
    Ok(result)
}

fn starting_dir(expansion: &Expansion) -> PathBuf {
    let mut dir = if expansion.absolute {
        PathBuf::from("/")
    } else {
        PathBuf::from(".")
    };
    if !expansion.literal_prefix_dir.is_empty() {
        dir.push(pathbytes::to_path(&expansion.literal_prefix_dir));
    }
    dir
}

struct WalkCtx<'a> {
    flags: Flags,
    opts: MatchOptions,
    entry_kind: EntryKind,
    max_depth: Option<usize>,
    follow_symlinks: bool,
    error_predicate: Option<&'a mut (dyn FnMut(&Path, i32) -> bool + 'a)>,
    #[cfg(feature = "gitignore")]
    pruner: Option<&'a crate::gitignore::GitignorePruner>,
}

fn emit(dir: &Path, name: &[u8], is_dir: bool, ctx: &WalkCtx, result: &mut MatchResult) {
    if !ctx.entry_kind.accepts(is_dir) {
        return;
    }
    let mut full = dir.to_path_buf();
    full.push(pathbytes::to_path(name));
    let mut bytes = pathbytes::path_to_bytes(&full);
    if is_dir && ctx.flags.contains(Flags::MARK) {
        bytes.push(b'/');
    }
    result.append_owned(&bytes);
}

/// Whether `entry` (a child of `dir`) should be treated as a directory for
/// recursion purposes, honoring `follow_symlinks`.
fn is_dir_entry(entry: &WalkEntry, dir: &Path, follow_symlinks: bool) -> bool {
    match entry.kind {
        DirEntryKind::Dir => true,
        DirEntryKind::File | DirEntryKind::Other => false,
        DirEntryKind::Symlink => {
            if !follow_symlinks {
                return false;
            }
            let mut path = dir.to_path_buf();
            path.push(pathbytes::to_path(&entry.name));
            path.is_dir()
        }
        DirEntryKind::Unknown => {
            let mut path = dir.to_path_buf();
            path.push(pathbytes::to_path(&entry.name));
            if path.is_symlink() && !follow_symlinks {
                return false;
            }
            path.is_dir()
        }
    }
}

/// Matches `segments[pos..]` against the children of `dir`, recursing one
/// directory level per non-recursive segment and, for a `**` segment,
/// once per candidate depth per spec.md §4.5 step 3.
fn match_segments(
    reader: &impl DirReader,
    dir: &Path,
    segments: &[Segment],
    depth: usize,
    ctx: &mut WalkCtx,
    result: &mut MatchResult,
) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        // No segments left: `dir` itself is the match — reached via a
        // trailing `**`, or a pattern whose stem was entirely consumed by
        // the literal prefix.
        if ctx.entry_kind.accepts(true) {
            let mut bytes = pathbytes::path_to_bytes(dir);
            if ctx.flags.contains(Flags::MARK) {
                bytes.push(b'/');
            }
            result.append_owned(&bytes);
        }
        return Ok(());
    };

    if let Some(max_depth) = ctx.max_depth {
        if depth > max_depth {
            return Err(WalkError::DepthExceeded {
                path: dir.to_path_buf(),
                max_depth,
            });
        }
    }

    #[cfg(feature = "gitignore")]
    if let Some(pruner) = ctx.pruner {
        if pruner.should_prune(dir) {
            return Ok(());
        }
    }

    match &segment.kind {
        SegmentKind::Recursive => {
            // The zero-component case: `**` may also match nothing, so the
            // remaining segments are tried directly against `dir` first.
            match_segments(reader, dir, rest, depth, ctx, result)?;

            let entries = read_dir_or_handle(reader, dir, ctx)?;
            for entry in entries {
                if is_dir_entry(&entry, dir, ctx.follow_symlinks) {
                    let mut child = dir.to_path_buf();
                    child.push(pathbytes::to_path(&entry.name));
                    match_segments(reader, &child, segments, depth + 1, ctx, result)?;
                }
            }
            Ok(())
        }
        SegmentKind::Literal(bytes) => {
            let mut child = dir.to_path_buf();
            child.push(pathbytes::to_path(bytes));
            if !child.exists() {
                return Ok(());
            }
            if rest.is_empty() {
                emit(dir, bytes, child.is_dir(), ctx, result);
                Ok(())
            } else {
                match_segments(reader, &child, rest, depth + 1, ctx, result)
            }
        }
        SegmentKind::Magic(pattern_bytes) => {
            let entries = read_dir_or_handle(reader, dir, ctx)?;
            for entry in entries {
                if !fnmatch::matches_magic(
                    pattern_bytes,
                    &entry.name,
                    segment.first_byte_mask.as_ref(),
                    segment.fixed_suffix.as_deref(),
                    ctx.opts,
                ) {
                    continue;
                }
                if rest.is_empty() {
                    let is_dir = is_dir_entry(&entry, dir, ctx.follow_symlinks);
                    emit(dir, &entry.name, is_dir, ctx, result);
                } else if is_dir_entry(&entry, dir, ctx.follow_symlinks) {
                    let mut child = dir.to_path_buf();
                    child.push(pathbytes::to_path(&entry.name));
                    match_segments(reader, &child, rest, depth + 1, ctx, result)?;
                }
            }
            Ok(())
        }
    }
}

fn read_dir_or_handle(
    reader: &impl DirReader,
    dir: &Path,
    ctx: &mut WalkCtx,
) -> Result<Vec<WalkEntry>> {
    match reader.read_dir(dir) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            if ctx.flags.contains(Flags::ERR) {
                return Err(err);
            }
            if let Some(predicate) = ctx.error_predicate.as_deref_mut() {
                let errno = io_errno(&err);
                if predicate(dir, errno) {
                    return Err(WalkError::Aborted(dir.to_path_buf()));
                }
            }
            Ok(Vec::new())
        }
    }
}

fn io_errno(err: &WalkError) -> i32 {
    match err {
        WalkError::Io { source, .. } => source.raw_os_error().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sorted(result: &MatchResult) -> Vec<String> {
        result
            .paths()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/main.rs"), b"").unwrap();
        fs::write(dir.path().join("src/lib.rs"), b"").unwrap();
        fs::write(dir.path().join("src/nested/deep.rs"), b"").unwrap();
        fs::write(dir.path().join("README.md"), b"").unwrap();
        dir
    }

    #[test]
    fn literal_pattern_matches_single_file() {
        let dir = setup();
        let pattern = dir.path().join("README.md");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::empty(), &mut config, None).unwrap();
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn star_segment_matches_all_rs_files_in_one_dir() {
        let dir = setup();
        let pattern = dir.path().join("src/*.rs");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::empty(), &mut config, None).unwrap();
        assert_eq!(result.count(), 2);
    }

    #[test]
    fn recursive_segment_matches_nested_files() {
        let dir = setup();
        let pattern = dir.path().join("src/**/*.rs");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::empty(), &mut config, None).unwrap();
        assert_eq!(result.count(), 3);
    }

    #[test]
    fn no_match_returns_error() {
        let dir = setup();
        let pattern = dir.path().join("src/*.nonexistent");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let err = glob(&pattern_bytes, Flags::empty(), &mut config, None).unwrap_err();
        assert!(matches!(err, WalkError::Pattern(CoreError::NoMatch)));
    }

    #[test]
    fn nocheck_falls_back_to_literal_pattern() {
        let dir = setup();
        let pattern = dir.path().join("src/*.nonexistent");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::NOCHECK, &mut config, None).unwrap();
        assert_eq!(
            sorted(&result),
            vec![String::from_utf8_lossy(&pattern_bytes).into_owned()]
        );
    }

    #[test]
    fn mark_appends_slash_to_directory_matches() {
        let dir = setup();
        let pattern = dir.path().join("src/n*");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::MARK, &mut config, None).unwrap();
        let paths = sorted(&result);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("nested/"));
    }

    #[test]
    fn onlydir_filters_to_directories() {
        let dir = setup();
        let pattern = dir.path().join("src/*");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::from_flags(Flags::ONLYDIR);
        let result = glob(&pattern_bytes, Flags::ONLYDIR, &mut config, None).unwrap();
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn bracket_segment_with_first_byte_mask_rejects_non_members() {
        let dir = setup();
        // "[m]*.rs" only admits names starting with 'm', excluding the
        // sibling "lib.rs"; exercises the first_byte_mask fast-path reject
        // ahead of the full matcher.
        let pattern = dir.path().join("src/[m]*.rs");
        let pattern_bytes = pathbytes::path_to_bytes(&pattern);
        let mut config = GlobConfig::default();
        let result = glob(&pattern_bytes, Flags::empty(), &mut config, None).unwrap();
        assert_eq!(result.count(), 1);
        assert!(sorted(&result)[0].ends_with("main.rs"));
    }
}
