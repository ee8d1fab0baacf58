//! Single-segment pattern-vs-name matching (`spec.md` §4.3).
//!
//! `fnmatch` never looks at `/` specially beyond refusing to let `*`/`?`
//! cross one — segments are produced by the pattern compiler by splitting
//! on `/` already, so a literal `/` simply never appears in either
//! argument here in practice. `**` is handled one layer up, by the
//! compiler/driver, since it has no meaning within a single segment.

use crate::charclass::{ByteSet, PosixClass};

/// Per-call matching behavior, distilled from [`crate::Flags`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchOptions {
    /// `NOESCAPE`: when true, `\` has no special meaning.
    pub no_escape: bool,
    /// `PERIOD`: when true, `*`/`?`/`[...]` may match a leading `.`.
    pub period: bool,
    /// `EXTGLOB`: when true, `@(`/`!(`/`?(`/`*(`/`+(` groups are recognized.
    pub extglob: bool,
}

/// Computes the set of bytes that can legally appear first when matching
/// `pattern`, which must begin with `[`. Used by the pattern compiler's
/// first-char-reject fast path (`spec.md` §4.3). Returns `None` if the
/// class is unterminated, since an unterminated `[` falls back to being a
/// literal byte (any byte set would be wrong).
pub fn first_byte_admissible_set(pattern: &[u8]) -> Option<crate::charclass::ByteSet> {
    let (class, _) = parse_bracket(pattern)?;
    let mut set = crate::charclass::ByteSet::new();
    for b in 0u16..=255 {
        if class.matches(b as u8) {
            set.insert(b as u8);
        }
    }
    Some(set)
}

/// Matches `pattern` against `name`, both single path segments (no `/`).
pub fn matches(pattern: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    if !opts.period && name.first() == Some(&b'.') && pattern.first() != Some(&b'.') {
        // A bare leading dot is only reachable through a literal '.' in the
        // pattern; `*`, `?`, and `[...]` must not claim it.
        if first_token_is_wild(pattern, opts) {
            return false;
        }
    }
    do_match(pattern, name, opts)
}

/// Same as [`matches`], but takes a MAGIC segment's precomputed fast-path
/// metadata (`spec.md` §4.1 step 4d / §4.3) and uses it to reject obvious
/// non-matches before running the backtracker: `first_byte_mask` is a
/// direct test of `name`'s first byte against the 256-bit admissibility
/// mask, and `fixed_suffix`, when present, is checked with
/// [`crate::simd::suffix_eq`]'s word-at-a-time comparison. Both checks are
/// necessary conditions for a match, so rejecting on them can never
/// disagree with what `matches` would independently decide.
pub fn matches_magic(
    pattern: &[u8],
    name: &[u8],
    first_byte_mask: Option<&ByteSet>,
    fixed_suffix: Option<&[u8]>,
    opts: MatchOptions,
) -> bool {
    if let Some(mask) = first_byte_mask {
        match name.first() {
            Some(&b) if mask.contains(b) => {}
            _ => return false,
        }
    }
    if let Some(suffix) = fixed_suffix {
        if !crate::simd::suffix_eq(name, suffix) {
            return false;
        }
    }
    matches(pattern, name, opts)
}

/// The necessary condition a name must satisfy right after a `*`, used to
/// skip straight to viable split points instead of trying every index.
enum RequiredFirstByte {
    Byte(u8),
    Set(ByteSet),
}

fn required_first_byte(pat: &[u8], opts: MatchOptions) -> Option<RequiredFirstByte> {
    match pat.first()? {
        b'*' | b'?' => None,
        b'[' => {
            let (class, _) = parse_bracket(pat)?;
            let mut set = ByteSet::new();
            for b in 0u16..=255 {
                if class.matches(b as u8) {
                    set.insert(b as u8);
                }
            }
            Some(RequiredFirstByte::Set(set))
        }
        b'@' | b'!' | b'+' if opts.extglob && pat.get(1) == Some(&b'(') => None,
        b'\\' if !opts.no_escape => pat.get(1).copied().map(RequiredFirstByte::Byte),
        &c => Some(RequiredFirstByte::Byte(c)),
    }
}

fn first_token_is_wild(pattern: &[u8], opts: MatchOptions) -> bool {
    match pattern.first() {
        Some(b'*') | Some(b'?') | Some(b'[') => true,
        Some(b'@') | Some(b'!') | Some(b'+')
            if opts.extglob && pattern.get(1) == Some(&b'(') =>
        {
            true
        }
        _ => false,
    }
}

fn do_match(mut pat: &[u8], mut name: &[u8], opts: MatchOptions) -> bool {
    loop {
        let Some(&pc) = pat.first() else {
            return name.is_empty();
        };
        match pc {
            b'*' if opts.extglob && pat.get(1) == Some(&b'(') => {
                return match_extglob(pc, pat, name, opts);
            }
            b'*' => {
                // Collapse consecutive stars; they are equivalent to one.
                while pat.first() == Some(&b'*') {
                    pat = &pat[1..];
                }
                if pat.is_empty() {
                    return true;
                }
                // The byte (or set of bytes) `pat` requires right after the
                // `*` is a necessary condition for any split point to work;
                // jump straight to candidate positions instead of trying
                // every index (spec.md §4.3's find-char fast path for
                // `*...X` forms).
                return match required_first_byte(pat, opts) {
                    Some(RequiredFirstByte::Byte(lit)) => {
                        let mut offset = 0usize;
                        while let Some(found) = crate::simd::find_char(&name[offset..], lit) {
                            let i = offset + found;
                            if do_match(pat, &name[i..], opts) {
                                return true;
                            }
                            offset = i + 1;
                        }
                        false
                    }
                    Some(RequiredFirstByte::Set(set)) => {
                        let mut offset = 0usize;
                        while let Some(found) = crate::simd::find_any_of_set(&name[offset..], &set)
                        {
                            let i = offset + found;
                            if do_match(pat, &name[i..], opts) {
                                return true;
                            }
                            offset = i + 1;
                        }
                        false
                    }
                    None => {
                        for i in 0..=name.len() {
                            if do_match(pat, &name[i..], opts) {
                                return true;
                            }
                        }
                        false
                    }
                };
            }
            b'?' => {
                let Some((_, rest)) = split_first(name) else {
                    return false;
                };
                pat = &pat[1..];
                name = rest;
            }
            b'[' => {
                let Some((class, consumed)) = parse_bracket(pat) else {
                    // Unterminated class: `[` is literal (spec.md §4.1 failure modes).
                    let Some((&nc, rest)) = name.split_first() else {
                        return false;
                    };
                    if nc != b'[' {
                        return false;
                    }
                    pat = &pat[1..];
                    name = rest;
                    continue;
                };
                let Some((&nc, rest)) = name.split_first() else {
                    return false;
                };
                if !class.matches(nc) {
                    return false;
                }
                pat = &pat[consumed..];
                name = rest;
            }
            b'\\' if !opts.no_escape => {
                let Some(&lit) = pat.get(1) else {
                    // Trailing lone backslash: treat as a literal backslash.
                    let Some((&nc, rest)) = name.split_first() else {
                        return false;
                    };
                    if nc != b'\\' {
                        return false;
                    }
                    pat = &pat[1..];
                    name = rest;
                    continue;
                };
                let Some((&nc, rest)) = name.split_first() else {
                    return false;
                };
                if nc != lit {
                    return false;
                }
                pat = &pat[2..];
                name = rest;
            }
            b'@' | b'!' | b'+' if opts.extglob && pat.get(1) == Some(&b'(') => {
                return match_extglob(pc, pat, name, opts);
            }
            c => {
                let Some((&nc, rest)) = name.split_first() else {
                    return false;
                };
                if nc != c {
                    return false;
                }
                pat = &pat[1..];
                name = rest;
            }
        }
    }
}

fn split_first(name: &[u8]) -> Option<(u8, &[u8])> {
    name.split_first().map(|(&b, rest)| (b, rest))
}

/// Parses a `[...]` bracket expression starting at `pat[0] == b'['`.
///
/// Returns the matcher and how many bytes of `pat` it consumed, or `None`
/// if the class is unterminated (caller falls back to treating `[` as a
/// literal byte, per `spec.md`'s failure-mode note).
fn parse_bracket(pat: &[u8]) -> Option<(BracketClass, usize)> {
    debug_assert_eq!(pat.first(), Some(&b'['));
    let mut i = 1;
    let negate = matches!(pat.get(i), Some(b'!') | Some(b'^'));
    if negate {
        i += 1;
    }
    let mut set = crate::charclass::ByteSet::new();
    let mut posix_classes = Vec::new();
    let mut first = true;
    loop {
        let &b = pat.get(i)?;
        if b == b']' && !first {
            i += 1;
            break;
        }
        first = false;
        if b == b'[' && pat.get(i + 1) == Some(&b':') {
            if let Some(end) = find_posix_class_end(pat, i + 2) {
                let name = std::str::from_utf8(&pat[i + 2..end]).ok()?;
                if let Some(class) = PosixClass::from_name(name) {
                    posix_classes.push(class);
                    i = end + 2;
                    continue;
                }
            }
        }
        // a-z style range, but not at the very end ("[a-]" means 'a' and '-').
        if pat.get(i + 1) == Some(&b'-') && pat.get(i + 2).is_some() && pat[i + 2] != b']' {
            let hi = pat[i + 2];
            set.insert_range(b, hi);
            i += 3;
            continue;
        }
        set.insert(b);
        i += 1;
    }
    Some((
        BracketClass {
            set,
            posix_classes,
            negate,
        },
        i,
    ))
}

fn find_posix_class_end(pat: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    loop {
        if pat.get(i) == Some(&b':') && pat.get(i + 1) == Some(&b']') {
            return Some(i);
        }
        if i >= pat.len() {
            return None;
        }
        i += 1;
    }
}

struct BracketClass {
    set: crate::charclass::ByteSet,
    posix_classes: Vec<PosixClass>,
    negate: bool,
}

impl BracketClass {
    fn matches(&self, byte: u8) -> bool {
        let hit = self.set.contains(byte) || self.posix_classes.iter().any(|c| c.matches(byte));
        hit != self.negate
    }
}

// --- Extended glob (EXTGLOB) groups: @(a|b), !(a|b), ?(a|b), *(a|b), +(a|b) ---

fn match_extglob(kind: u8, pat: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    debug_assert_eq!(pat.get(1), Some(&b'('));
    let Some(close) = find_matching_paren(pat, 1) else {
        // Unbalanced: treat the leading sigil as a literal character.
        return do_match(&pat[1..], name, opts) && name.first() == Some(&kind);
    };
    let body = &pat[2..close];
    let rest = &pat[close + 1..];
    let alts = split_top_level_alts(body);

    match kind {
        b'@' => alts.iter().any(|alt| try_alt_then_rest(alt, rest, name, opts)),
        b'?' => do_match(rest, name, opts) || alts.iter().any(|alt| try_alt_then_rest(alt, rest, name, opts)),
        b'+' => one_or_more(&alts, rest, name, opts),
        b'!' => negate_group(&alts, rest, name, opts),
        b'*' => zero_or_more(&alts, rest, name, opts),
        _ => unreachable!("caller only dispatches @!?* +"),
    }
}

fn try_alt_then_rest(alt: &[u8], rest: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    for i in 0..=name.len() {
        if do_match(alt, &name[..i], opts) && do_match(rest, &name[i..], opts) {
            return true;
        }
    }
    false
}

fn zero_or_more(alts: &[&[u8]], rest: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    if do_match(rest, name, opts) {
        return true;
    }
    for i in 1..=name.len() {
        for alt in alts {
            if do_match(alt, &name[..i], opts) && zero_or_more(alts, rest, &name[i..], opts) {
                return true;
            }
        }
    }
    false
}

fn one_or_more(alts: &[&[u8]], rest: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    for i in 1..=name.len() {
        for alt in alts {
            if do_match(alt, &name[..i], opts) && zero_or_more(alts, rest, &name[i..], opts) {
                return true;
            }
        }
    }
    false
}

/// `!(alts)`: the consumed prefix must not equal any alternative.
///
/// Bash's own semantics for `!()` followed by more pattern are famously
/// ambiguous; this implementation tries every split point and accepts the
/// first where the prefix is excluded and the remainder matches, which
/// agrees with bash on every case `spec.md`'s test matrix exercises.
fn negate_group(alts: &[&[u8]], rest: &[u8], name: &[u8], opts: MatchOptions) -> bool {
    for i in 0..=name.len() {
        let candidate = &name[..i];
        let excluded = alts.iter().any(|alt| do_match(alt, candidate, opts));
        if !excluded && do_match(rest, &name[i..], opts) {
            return true;
        }
    }
    false
}

/// Given `pat[open] == b'('`, finds the index of the matching `)`.
fn find_matching_paren(pat: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut i = open;
    let mut in_bracket = false;
    while i < pat.len() {
        match pat[i] {
            b'\\' if i + 1 < pat.len() => i += 1,
            b'[' if !in_bracket => in_bracket = true,
            b']' if in_bracket => in_bracket = false,
            b'(' if !in_bracket => depth += 1,
            b')' if !in_bracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits `body` on top-level `|`, respecting nested groups and brackets.
fn split_top_level_alts(body: &[u8]) -> Vec<&[u8]> {
    let mut alts = Vec::new();
    let mut depth = 0i32;
    let mut in_bracket = false;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < body.len() {
        match body[i] {
            b'\\' if i + 1 < body.len() => i += 1,
            b'[' if !in_bracket => in_bracket = true,
            b']' if in_bracket => in_bracket = false,
            b'(' if !in_bracket => depth += 1,
            b')' if !in_bracket => depth -= 1,
            b'|' if !in_bracket && depth == 0 => {
                alts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    alts.push(&body[start..]);
    alts
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn opts() -> MatchOptions {
        MatchOptions::default()
    }

    #[test_case("abc", "abc", true)]
    #[test_case("abc", "abd", false)]
    #[test_case("*", "anything", true)]
    #[test_case("*.txt", "a.txt", true)]
    #[test_case("*.txt", "a.md", false)]
    #[test_case("a?c", "abc", true)]
    #[test_case("a?c", "ac", false)]
    #[test_case("a*b*c*d*e*", "axbxcxdxexxx", true)]
    #[test_case("*[0-9].txt", "file1.txt", true)]
    #[test_case("*[0-9].txt", "file.txt", false)]
    #[test_case("*\\*.txt", "lit*.txt", true)]
    fn basic_wildcards(pattern: &str, name: &str, expect: bool) {
        assert_eq!(matches(pattern.as_bytes(), name.as_bytes(), opts()), expect);
    }

    #[test]
    fn literal_equality() {
        assert!(matches(b"foo", b"foo", opts()));
        assert!(!matches(b"foo", b"foobar", opts()));
        assert!(!matches(b"", b"x", opts()));
        assert!(matches(b"", b"", opts()));
    }

    #[test]
    fn matches_magic_agrees_with_matches() {
        let mut mask = ByteSet::new();
        mask.insert(b'a');
        mask.insert(b'b');
        assert!(matches_magic(b"[ab]*.txt", b"a.txt", Some(&mask), Some(b".txt"), opts()));
        // First-byte reject: 'c' is outside the mask even though the full
        // matcher would also reject it; the fast path must agree.
        assert!(!matches_magic(b"[ab]*.txt", b"c.txt", Some(&mask), Some(b".txt"), opts()));
        // Suffix reject: right first byte, wrong ending.
        assert!(!matches_magic(b"[ab]*.txt", b"a.md", Some(&mask), Some(b".txt"), opts()));
    }

    #[test]
    fn matches_magic_without_metadata_falls_back_to_matches() {
        assert!(matches_magic(b"*.rs", b"main.rs", None, None, opts()));
        assert!(!matches_magic(b"*.rs", b"main.md", None, None, opts()));
    }

    #[test_case("[abc]", "b", true)]
    #[test_case("[abc]", "d", false)]
    #[test_case("[a-z]", "m", true)]
    #[test_case("[a-z]", "M", false)]
    #[test_case("[!abc]", "d", true)]
    #[test_case("[^abc]", "a", false)]
    #[test_case("[:alpha:]", "x", false)] // not a bracket form, literal chars
    #[test_case("[[:digit:]]", "5", true)]
    #[test_case("[[:digit:]]", "x", false)]
    fn bracket_expressions(pattern: &str, name: &str, expect: bool) {
        assert_eq!(matches(pattern.as_bytes(), name.as_bytes(), opts()), expect);
    }

    #[test]
    fn bracket_close_as_first_member() {
        // `[]]` is the class containing only `]`.
        assert!(matches(b"[]]", b"]", opts()));
        assert!(!matches(b"[]]", b"x", opts()));
    }

    #[test]
    fn bracket_leading_bang_is_literal() {
        // `[!]` is a literal class containing `!`.
        assert!(matches(b"[!]", b"!", opts()));
    }

    #[test]
    fn bracket_trailing_dash_is_literal() {
        // `[a-]` contains `a` and `-`.
        assert!(matches(b"[a-]", b"a", opts()));
        assert!(matches(b"[a-]", b"-", opts()));
        assert!(!matches(b"[a-]", b"b", opts()));
    }

    #[test]
    fn unterminated_class_is_literal() {
        assert!(matches(b"[abc", b"[abc", opts()));
    }

    #[test]
    fn leading_dot_requires_period_flag() {
        let default = opts();
        assert!(!matches(b"*", b".hidden", default));
        assert!(matches(b".*", b".hidden", default));

        let with_period = MatchOptions {
            period: true,
            ..opts()
        };
        assert!(matches(b"*", b".hidden", with_period));
    }

    #[test]
    fn escape_suppresses_metacharacter() {
        assert!(matches(b"a\\*b", b"a*b", opts()));
        assert!(!matches(b"a\\*b", b"axb", opts()));

        let no_escape = MatchOptions {
            no_escape: true,
            ..opts()
        };
        assert!(matches(b"a\\*b", b"a\\xb", no_escape));
    }

    fn extglob_opts() -> MatchOptions {
        MatchOptions {
            extglob: true,
            ..opts()
        }
    }

    #[test_case("@(foo|bar)", "foo", true)]
    #[test_case("@(foo|bar)", "bar", true)]
    #[test_case("@(foo|bar)", "baz", false)]
    #[test_case("?(foo)bar", "bar", true)]
    #[test_case("?(foo)bar", "foobar", true)]
    #[test_case("?(foo)bar", "foofoobar", false)]
    #[test_case("*(foo)bar", "bar", true)]
    #[test_case("*(foo)bar", "foofoobar", true)]
    #[test_case("+(foo)bar", "bar", false)]
    #[test_case("+(foo)bar", "foobar", true)]
    #[test_case("+(foo)bar", "foofoobar", true)]
    #[test_case("!(foo)", "bar", true)]
    #[test_case("!(foo)", "foo", false)]
    fn extglob_groups(pattern: &str, name: &str, expect: bool) {
        assert_eq!(
            matches(pattern.as_bytes(), name.as_bytes(), extglob_opts()),
            expect
        );
    }
}
