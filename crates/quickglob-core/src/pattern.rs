//! The pattern compiler (`spec.md` §4.1): escape handling, tilde
//! expansion, brace recognition, and per-expansion lowering into
//! [`Segment`]s with precomputed fast-path metadata.

use crate::charclass::ByteSet;
use crate::error::Error;
use crate::flags::Flags;
use crate::{brace, tilde};

/// What a single `/`-delimited piece of a lowered expansion looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// No unescaped metacharacters; compared byte-for-byte.
    Literal(Vec<u8>),
    /// Contains `*`, `?`, `[`, or (with EXTGLOB) an extglob group sigil.
    Magic(Vec<u8>),
    /// Exactly `**`.
    Recursive,
}

/// One lowered path segment plus its precomputed fast-path metadata
/// (spec.md §4.1 step 4d).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Fixed suffix bytes after the last `*` in a MAGIC segment ending in
    /// a literal run, if any (the "suffix match" fast path).
    pub fixed_suffix: Option<Vec<u8>>,
    /// The set of admissible first bytes for a MAGIC segment, used to
    /// reject candidate names in O(1) before running the full matcher.
    pub first_byte_mask: Option<ByteSet>,
}

impl Segment {
    fn literal(bytes: Vec<u8>) -> Self {
        Segment {
            kind: SegmentKind::Literal(bytes),
            fixed_suffix: None,
            first_byte_mask: None,
        }
    }

    fn recursive() -> Self {
        Segment {
            kind: SegmentKind::Recursive,
            fixed_suffix: None,
            first_byte_mask: None,
        }
    }

    fn magic(bytes: Vec<u8>) -> Self {
        let fixed_suffix = trailing_literal_run(&bytes);
        let first_byte_mask = leading_admissible_set(&bytes);
        Segment {
            kind: SegmentKind::Magic(bytes),
            fixed_suffix,
            first_byte_mask,
        }
    }
}

/// One brace expansion, lowered into path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// `true` if the expansion began with `/` (an absolute anchor).
    pub absolute: bool,
    /// The longest run of LITERAL segments from the start, joined by `/`.
    /// Empty when the pattern begins with a MAGIC or RECURSIVE segment.
    pub literal_prefix_dir: Vec<u8>,
    /// Segments after `literal_prefix_dir`, the actual matching stem.
    pub stem: Vec<Segment>,
}

/// A fully compiled pattern: one or more expansions (brace-lazy; here
/// materialized since each expansion is cheap relative to the walk it
/// drives) plus the output-only MAGCHAR flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pub expansions: Vec<Expansion>,
    pub magchar: bool,
}

/// Compiles `pattern` under `flags`, per spec.md §4.1 steps 1–5.
///
/// An empty pattern is `NoMatch` unconditionally (spec.md §8 boundary
/// behaviors) — neither `NOCHECK` nor `NOMAGIC` rescues it, since there is
/// no literal to fall back to.
pub fn compile(pattern: &[u8], flags: Flags) -> Result<CompiledPattern, Error> {
    if flags.contains(Flags::ALTDIRFUNC) {
        return Err(Error::UnsupportedFlag("ALTDIRFUNC"));
    }
    if pattern.is_empty() {
        return Err(Error::NoMatch);
    }

    let after_tilde = apply_tilde(pattern, flags)?;

    let raw_expansions: Vec<Vec<u8>> = if flags.contains(Flags::BRACE) {
        brace::expand(&after_tilde).collect()
    } else {
        vec![after_tilde]
    };

    let mut expansions = Vec::with_capacity(raw_expansions.len());
    let mut magchar = false;
    for raw in raw_expansions {
        let expansion = lower_expansion(&raw, flags);
        if expansion
            .stem
            .iter()
            .any(|s| !matches!(s.kind, SegmentKind::Literal(_)))
        {
            magchar = true;
        }
        expansions.push(expansion);
    }

    Ok(CompiledPattern { expansions, magchar })
}

fn apply_tilde(pattern: &[u8], flags: Flags) -> Result<Vec<u8>, Error> {
    if !flags.contains(Flags::TILDE) {
        return Ok(pattern.to_vec());
    }
    let (expansion, consumed) = tilde::expand(pattern, flags.contains(Flags::TILDE_CHECK))?;
    match expansion {
        tilde::TildeExpansion::NotApplicable => Ok(pattern.to_vec()),
        tilde::TildeExpansion::Expanded(home) => {
            let mut out = home;
            out.extend_from_slice(&pattern[consumed..]);
            Ok(out)
        }
        tilde::TildeExpansion::Unresolved => {
            Err(Error::InvalidPattern(format!(
                "unresolved tilde prefix in {:?}",
                String::from_utf8_lossy(&pattern[..consumed])
            )))
        }
    }
}

/// Lowers one brace-expanded pattern string into segments, per step 4.
fn lower_expansion(raw: &[u8], flags: Flags) -> Expansion {
    let absolute = raw.first() == Some(&b'/');
    let parts = split_unescaped_slash(raw);

    let mut literal_prefix = Vec::new();
    let mut stem = Vec::new();
    let mut in_prefix = true;

    for part in parts {
        if part.is_empty() {
            continue;
        }
        let segment = classify(&part, flags);
        if in_prefix {
            if let SegmentKind::Literal(ref bytes) = segment.kind {
                if !literal_prefix.is_empty() {
                    literal_prefix.push(b'/');
                }
                literal_prefix.extend_from_slice(bytes);
                continue;
            }
            in_prefix = false;
        }
        stem.push(segment);
    }

    Expansion {
        absolute,
        literal_prefix_dir: literal_prefix,
        stem,
    }
}

/// Splits `raw` on `/` that is not escaped by a preceding `\`.
fn split_unescaped_slash(raw: &[u8]) -> Vec<Vec<u8>> {
    let mut parts = Vec::new();
    let mut cur = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'\\' if i + 1 < raw.len() => {
                cur.push(raw[i]);
                cur.push(raw[i + 1]);
                i += 2;
            }
            b'/' => {
                parts.push(std::mem::take(&mut cur));
                i += 1;
            }
            c => {
                cur.push(c);
                i += 1;
            }
        }
    }
    parts.push(cur);
    parts
}

fn classify(part: &[u8], flags: Flags) -> Segment {
    if part == b"**" {
        return Segment::recursive();
    }
    if is_magic(part, flags) {
        Segment::magic(part.to_vec())
    } else {
        Segment::literal(unescape(part))
    }
}

fn is_magic(part: &[u8], flags: Flags) -> bool {
    let mut i = 0;
    while i < part.len() {
        match part[i] {
            b'\\' if i + 1 < part.len() => i += 2,
            b'*' | b'?' | b'[' => return true,
            b'@' | b'!' | b'+'
                if flags.contains(Flags::EXTGLOB) && part.get(i + 1) == Some(&b'(') =>
            {
                return true;
            }
            _ => i += 1,
        }
    }
    false
}

/// Removes escaping backslashes from a segment already known to be
/// LITERAL, so the compiled literal compares against raw bytes directly.
fn unescape(part: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(part.len());
    let mut i = 0;
    while i < part.len() {
        if part[i] == b'\\' && i + 1 < part.len() {
            out.push(part[i + 1]);
            i += 2;
        } else {
            out.push(part[i]);
            i += 1;
        }
    }
    out
}

/// The fixed suffix after the last top-level `*` in a MAGIC segment, if
/// the segment ends in a literal run (spec.md §4.3's "suffix match").
fn trailing_literal_run(magic: &[u8]) -> Option<Vec<u8>> {
    let last_star = last_top_level_star(magic)?;
    let suffix = &magic[last_star + 1..];
    if suffix.is_empty() || contains_metachar(suffix) {
        None
    } else {
        Some(unescape(suffix))
    }
}

fn last_top_level_star(pattern: &[u8]) -> Option<usize> {
    let mut last = None;
    let mut i = 0;
    let mut depth = 0i32;
    while i < pattern.len() {
        match pattern[i] {
            b'\\' if i + 1 < pattern.len() => i += 1,
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'*' if depth == 0 => last = Some(i),
            _ => {}
        }
        i += 1;
    }
    last
}

fn contains_metachar(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 1,
            b'*' | b'?' | b'[' | b'(' => return true,
            _ => {}
        }
        i += 1;
    }
    false
}

/// The set of bytes that could legally start a match against `magic`,
/// used for the O(1) first-char reject fast path. Returns `None` when the
/// segment can start with anything (e.g. begins with `*`).
fn leading_admissible_set(magic: &[u8]) -> Option<ByteSet> {
    match magic.first()? {
        b'*' | b'?' => None,
        b'[' => {
            // Reuse fnmatch's own bracket parser so the two never drift.
            crate::fnmatch::first_byte_admissible_set(magic)
        }
        b'\\' if magic.len() > 1 => {
            let mut set = ByteSet::new();
            set.insert(magic[1]);
            Some(set)
        }
        &c => {
            let mut set = ByteSet::new();
            set.insert(c);
            Some(set)
        }
    }
}

impl CompiledPattern {
    /// Reconstructs a pattern string equivalent (not necessarily
    /// byte-identical, since escapes may be normalized) to the input that
    /// produced this `CompiledPattern`, joining expansions back with `{`/`}`
    /// the way spec.md §8's round-trip property expects of a single
    /// expansion's structure.
    pub fn to_pattern_string(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, expansion) in self.expansions.iter().enumerate() {
            if i > 0 {
                out.push(b',');
            }
            out.extend_from_slice(&expansion_to_bytes(expansion));
        }
        out
    }
}

fn expansion_to_bytes(expansion: &Expansion) -> Vec<u8> {
    let mut parts: Vec<&[u8]> = Vec::new();
    if !expansion.literal_prefix_dir.is_empty() {
        parts.push(&expansion.literal_prefix_dir);
    }
    let segment_bytes: Vec<Vec<u8>> = expansion
        .stem
        .iter()
        .map(|segment| match &segment.kind {
            SegmentKind::Literal(bytes) => bytes.clone(),
            SegmentKind::Magic(bytes) => bytes.clone(),
            SegmentKind::Recursive => b"**".to_vec(),
        })
        .collect();
    for bytes in &segment_bytes {
        parts.push(bytes);
    }
    let mut out = Vec::new();
    if expansion.absolute {
        out.push(b'/');
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_default(pattern: &str) -> CompiledPattern {
        compile(pattern.as_bytes(), Flags::empty()).unwrap()
    }

    #[test]
    fn plain_literal_has_no_magchar() {
        let compiled = compile_default("src/main.rs");
        assert!(!compiled.magchar);
        assert_eq!(compiled.expansions.len(), 1);
        assert_eq!(compiled.expansions[0].literal_prefix_dir, b"src/main.rs");
        assert!(compiled.expansions[0].stem.is_empty());
    }

    #[test]
    fn magic_segment_sets_magchar() {
        let compiled = compile_default("src/*.rs");
        assert!(compiled.magchar);
        assert_eq!(compiled.expansions[0].literal_prefix_dir, b"src");
        assert_eq!(compiled.expansions[0].stem.len(), 1);
        assert!(matches!(
            compiled.expansions[0].stem[0].kind,
            SegmentKind::Magic(_)
        ));
    }

    #[test]
    fn recursive_segment_is_classified() {
        let compiled = compile_default("src/**/*.rs");
        assert_eq!(compiled.expansions[0].stem.len(), 2);
        assert_eq!(compiled.expansions[0].stem[0].kind, SegmentKind::Recursive);
    }

    #[test]
    fn absolute_pattern_is_flagged() {
        let compiled = compile_default("/etc/*.conf");
        assert!(compiled.expansions[0].absolute);
        assert_eq!(compiled.expansions[0].literal_prefix_dir, b"etc");
    }

    #[test]
    fn brace_expansion_runs_through_compiler() {
        let compiled = compile(b"a/{b,c}/*.txt", Flags::BRACE).unwrap();
        assert_eq!(compiled.expansions.len(), 2);
        assert_eq!(compiled.expansions[0].literal_prefix_dir, b"a/b");
        assert_eq!(compiled.expansions[1].literal_prefix_dir, b"a/c");
    }

    #[test]
    fn suffix_fast_path_metadata() {
        let compiled = compile_default("*.txt");
        let segment = &compiled.expansions[0].stem[0];
        assert_eq!(segment.fixed_suffix, Some(b".txt".to_vec()));
    }

    #[test]
    fn no_fixed_suffix_when_pattern_ends_in_star() {
        let compiled = compile_default("a*b*");
        let segment = &compiled.expansions[0].stem[0];
        assert_eq!(segment.fixed_suffix, None);
    }

    #[test]
    fn first_byte_mask_for_bracket_segment() {
        let compiled = compile_default("[abc]*.rs");
        let segment = &compiled.expansions[0].stem[0];
        let mask = segment.first_byte_mask.as_ref().unwrap();
        assert!(mask.contains(b'a'));
        assert!(!mask.contains(b'd'));
    }

    #[test]
    fn unescapes_literal_segments() {
        let compiled = compile_default(r"a\ b/c");
        assert_eq!(compiled.expansions[0].literal_prefix_dir, b"a b/c");
    }

    #[test]
    fn extglob_group_is_magic_only_with_flag() {
        let without = compile_default("@(foo|bar)");
        assert!(!without.magchar);
        let with = compile(b"@(foo|bar)", Flags::EXTGLOB).unwrap();
        assert!(with.magchar);
    }

    #[test]
    fn empty_pattern_is_nomatch() {
        let err = compile(b"", Flags::empty()).unwrap_err();
        assert_eq!(err, Error::NoMatch);
    }

    #[test]
    fn empty_pattern_is_nomatch_even_with_nocheck() {
        // spec.md §8: empty pattern is NoMatch unconditionally; NOCHECK
        // rescues "no matches for a pattern", not "no pattern at all".
        let err = compile(b"", Flags::NOCHECK).unwrap_err();
        assert_eq!(err, Error::NoMatch);
    }

    #[test]
    fn altdirfunc_is_rejected() {
        let err = compile(b"*.rs", Flags::ALTDIRFUNC).unwrap_err();
        assert_eq!(err, Error::UnsupportedFlag("ALTDIRFUNC"));
    }

    #[test]
    fn unresolved_tilde_with_check_does_not_panic_at_end_of_pattern() {
        // The tilde run can extend to the very end of the pattern (no `/`
        // follows it); `apply_tilde` must not index one byte past it.
        let err = compile(b"~nonexistent_user_xyz", Flags::TILDE | Flags::TILDE_CHECK)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }
}
