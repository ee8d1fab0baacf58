//! The `GITIGNORE` predicate (`spec.md` §1, §4.5, §6), behind the
//! `gitignore` feature.
//!
//! Declared out of scope as its own subsystem by `spec.md` ("the
//! `.gitignore` parser (consumed as a predicate)"), but the flag is part
//! of the ABI and the driver's step 4 explicitly consults it. Grounded on
//! `pixi_glob::GlobSetIgnore`, which wraps the `ignore` crate for exactly
//! this predicate role rather than hand-rolling `.gitignore` parsing.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// A compiled `.gitignore` predicate rooted at one directory, consulted
/// before the walker descends into a subtree.
pub struct GitignorePruner {
    matcher: Gitignore,
}

impl GitignorePruner {
    /// Builds a pruner from the single `.gitignore` file at `root`, if any.
    ///
    /// Nested `.gitignore` files in subdirectories are not independently
    /// consulted — this is a thin predicate adapter, not a full `git`-style
    /// ignore resolver (spec.md §1 places `.gitignore` parsing itself out
    /// of scope). Good enough for the common "one `.gitignore` at the
    /// search root" case the `GITIGNORE` flag targets.
    pub fn build(root: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        // A missing or unreadable .gitignore is not an error here: it
        // just means nothing is pruned, matching `git status` on a
        // repository with no ignore file at all.
        let _ = builder.add(root.join(".gitignore"));
        let matcher = builder.build().unwrap_or_else(|_| Gitignore::empty());
        GitignorePruner { matcher }
    }

    /// Whether `dir` (and everything under it) should be skipped.
    pub fn should_prune(&self, dir: &Path) -> bool {
        self.matcher.matched(dir, true).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prunes_directory_listed_in_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), b"target/\n").unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let pruner = GitignorePruner::build(dir.path());
        assert!(pruner.should_prune(&dir.path().join("target")));
        assert!(!pruner.should_prune(&dir.path().join("src")));
    }

    #[test]
    fn no_gitignore_prunes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("anything")).unwrap();
        let pruner = GitignorePruner::build(dir.path());
        assert!(!pruner.should_prune(&dir.path().join("anything")));
    }
}
