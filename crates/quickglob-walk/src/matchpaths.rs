//! The borrowed-mode entry point (`spec.md` §6): matches a pattern
//! against an in-memory list of paths rather than walking a filesystem.
//!
//! Thin wrapper over `quickglob_core::match_paths` that adds the same
//! structured-logging summary the driver emits, grounded on
//! `pixi_glob::GlobSetIgnore::collect_matching`'s `tracing::info!` call
//! with `{includes, matched, elapsed_ms}` fields after a walk.

use std::time::Instant;

use quickglob_core::{Flags, MatchResult};

use crate::error::{Result, WalkError};

/// Matches `pattern` against `candidates`, aliasing their memory
/// (`ownership_tag = BORROWED`); `candidates` must outlive the returned
/// `MatchResult`.
pub fn match_paths(pattern: &[u8], candidates: &[&[u8]], flags: Flags) -> Result<MatchResult> {
    let start = Instant::now();
    let result = quickglob_core::match_paths(pattern, candidates, flags).map_err(WalkError::from);

    match &result {
        Ok(matched) => tracing::debug!(
            pattern = %String::from_utf8_lossy(pattern),
            candidates = candidates.len(),
            matched = matched.count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "match_paths completed",
        ),
        Err(err) => tracing::debug!(
            pattern = %String::from_utf8_lossy(pattern),
            candidates = candidates.len(),
            error = %err,
            "match_paths failed",
        ),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_match_reports_results() {
        let candidates: Vec<&[u8]> = vec![b"a.txt", b"b.rs", b"c.txt"];
        let result = match_paths(b"*.txt", &candidates, Flags::empty()).unwrap();
        assert_eq!(result.count(), 2);
    }
}
