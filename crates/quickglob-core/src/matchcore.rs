//! Matches a compiled pattern against an already-known path, with no
//! filesystem access — the shared core behind the borrowed-mode
//! `match_paths` entry point (spec.md §6) exposed both here (for the
//! `cabi` FFI surface) and by `quickglob-walk::matchpaths` (which adds
//! logging and the Rust-native API around it).

use crate::error::Error;
use crate::flags::Flags;
use crate::fnmatch::{self, MatchOptions};
use crate::pattern::{self, CompiledPattern, SegmentKind};
use crate::result::MatchResult;

fn match_options(flags: Flags) -> MatchOptions {
    MatchOptions {
        no_escape: flags.contains(Flags::NOESCAPE),
        period: flags.contains(Flags::PERIOD),
        extglob: flags.contains(Flags::EXTGLOB),
    }
}

/// Splits a candidate path into its `/`-delimited components, dropping
/// empty components so a leading or trailing `/` doesn't desync the
/// segment count against a compiled expansion's stem.
fn split_components(path: &[u8]) -> Vec<&[u8]> {
    path.split(|&b| b == b'/').filter(|c| !c.is_empty()).collect()
}

/// Whether `candidate` satisfies one compiled expansion.
fn expansion_matches(expansion: &pattern::Expansion, candidate: &[u8], opts: MatchOptions) -> bool {
    let components = split_components(candidate);

    let prefix_components = split_components(&expansion.literal_prefix_dir);
    if components.len() < prefix_components.len() {
        return false;
    }
    if candidate.first() == Some(&b'/') && !expansion.absolute {
        return false;
    }
    for (want, got) in prefix_components.iter().zip(components.iter()) {
        if want != got {
            return false;
        }
    }

    match_stem(&expansion.stem, &components[prefix_components.len()..], opts)
}

fn match_stem(stem: &[crate::pattern::Segment], remaining: &[&[u8]], opts: MatchOptions) -> bool {
    let Some((segment, rest_segments)) = stem.split_first() else {
        return remaining.is_empty();
    };

    match &segment.kind {
        SegmentKind::Literal(bytes) => {
            let Some((&head, tail)) = remaining.split_first() else {
                return false;
            };
            head == bytes.as_slice() && match_stem(rest_segments, tail, opts)
        }
        SegmentKind::Magic(bytes) => {
            let Some((&head, tail)) = remaining.split_first() else {
                return false;
            };
            fnmatch::matches_magic(
                bytes,
                head,
                segment.first_byte_mask.as_ref(),
                segment.fixed_suffix.as_deref(),
                opts,
            ) && match_stem(rest_segments, tail, opts)
        }
        SegmentKind::Recursive => {
            // `**` matches zero or more components, including zero.
            for split in 0..=remaining.len() {
                if match_stem(rest_segments, &remaining[split..], opts) {
                    return true;
                }
            }
            false
        }
    }
}

/// If every expansion of a compiled pattern is a single MAGIC segment
/// ending in a fixed suffix (the shape `brace::expand` produces for
/// `*.{a,b,c}`), returns those suffixes in expansion order so a candidate's
/// final path component can be tested against all of them in one pass via
/// [`crate::simd::multi_suffix_mask`] before running the full matcher on
/// any single expansion.
fn uniform_suffix_fast_path(expansions: &[pattern::Expansion]) -> Option<Vec<&[u8]>> {
    if expansions.len() < 2 || expansions.len() > 16 {
        return None;
    }
    expansions
        .iter()
        .map(|e| {
            if e.stem.len() != 1 {
                return None;
            }
            e.stem[0].fixed_suffix.as_deref()
        })
        .collect()
}

/// Matches `pattern` against an in-memory list of candidate paths,
/// aliasing the caller's slices (`ownership_tag = BORROWED`).
pub fn match_paths(
    pattern: &[u8],
    candidates: &[&[u8]],
    flags: Flags,
) -> Result<MatchResult, Error> {
    let compiled: CompiledPattern = pattern::compile(pattern, flags)?;
    let opts = match_options(flags);

    let suffix_group = uniform_suffix_fast_path(&compiled.expansions);

    let mut result = MatchResult::new();

    for candidate in candidates {
        let is_match = if let Some(suffixes) = suffix_group.as_ref() {
            match split_components(candidate).last() {
                Some(&name) => {
                    let mask = crate::simd::multi_suffix_mask(name, suffixes);
                    mask != 0
                        && compiled.expansions.iter().enumerate().any(|(i, expansion)| {
                            mask & (1 << i) != 0 && expansion_matches(expansion, candidate, opts)
                        })
                }
                None => false,
            }
        } else {
            compiled
                .expansions
                .iter()
                .any(|expansion| expansion_matches(expansion, candidate, opts))
        };

        if is_match {
            result.append_borrowed(candidate);
        }
    }

    if !flags.contains(Flags::NOSORT) {
        result.sort_and_dedup();
    }

    if result.count() == 0 {
        if flags.contains(Flags::NOCHECK) || (flags.contains(Flags::NOMAGIC) && !compiled.magchar) {
            result.append_owned(pattern);
            return Ok(result);
        }
        return Err(Error::NoMatch);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_suffix_pattern() {
        let candidates: Vec<&[u8]> = vec![b"foo.txt", b"bar.c", b"baz.txt"];
        let result = match_paths(b"*.txt", &candidates, Flags::empty()).unwrap();
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(paths, vec![b"baz.txt".as_slice(), b"foo.txt".as_slice()]);
    }

    #[test]
    fn no_match_without_nocheck_is_error() {
        let candidates: Vec<&[u8]> = vec![b"foo.rs"];
        let err = match_paths(b"*.txt", &candidates, Flags::empty()).unwrap_err();
        assert_eq!(err, Error::NoMatch);
    }

    #[test]
    fn nocheck_falls_back_to_literal_pattern() {
        let candidates: Vec<&[u8]> = vec![b"foo.rs"];
        let result = match_paths(b"*.txt", &candidates, Flags::NOCHECK).unwrap();
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(paths, vec![b"*.txt".as_slice()]);
    }

    #[test]
    fn directory_prefix_and_recursive_segment() {
        let candidates: Vec<&[u8]> = vec![b"src/a/b.rs", b"src/b.rs", b"docs/b.rs"];
        let result = match_paths(b"src/**/*.rs", &candidates, Flags::empty()).unwrap();
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(
            paths,
            vec![b"src/a/b.rs".as_slice(), b"src/b.rs".as_slice()]
        );
    }

    #[test]
    fn brace_suffix_alternatives_use_multi_suffix_fast_path() {
        // "*.{rs,md,txt}" brace-expands into three single-segment MAGIC
        // expansions, each with its own `fixed_suffix` — exactly the shape
        // `uniform_suffix_fast_path` looks for.
        let candidates: Vec<&[u8]> = vec![b"main.rs", b"readme.md", b"data.bin", b"notes.txt"];
        let result = match_paths(b"*.{rs,md,txt}", &candidates, Flags::BRACE).unwrap();
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(
            paths,
            vec![
                b"main.rs".as_slice(),
                b"notes.txt".as_slice(),
                b"readme.md".as_slice(),
            ]
        );
    }
}
