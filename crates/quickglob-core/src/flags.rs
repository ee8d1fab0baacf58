//! The flag bitmask that drives every stage of the engine.
//!
//! Numeric values below `0x8000` are part of the public C ABI and must never
//! change; see `spec.md` §6. `GITIGNORE` and `EXTGLOB` are non-ABI
//! extensions occupying bits the POSIX set does not use.

use std::fmt;

bitflags::bitflags! {
    /// Options controlling pattern compilation, matching, and walking.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
    pub struct Flags: u32 {
        /// Abort the walk (rather than skip) on an unreadable directory.
        const ERR          = 0x0001;
        /// Append `/` to directory matches.
        const MARK         = 0x0002;
        /// Do not sort the final result.
        const NOSORT       = 0x0004;
        /// Reserve leading null slots in the result table.
        const DOOFFS       = 0x0008;
        /// Return the pattern itself, unmodified, when there are no matches.
        const NOCHECK      = 0x0010;
        /// Append to a previously populated result table instead of starting fresh.
        const APPEND       = 0x0020;
        /// Disable `\` as an escape character.
        const NOESCAPE     = 0x0040;
        /// Allow `*`/`?`/`[...]` to match a leading `.`.
        const PERIOD       = 0x0080;
        /// Output-only: set by the compiler when the pattern contained any magic character.
        const MAGCHAR      = 0x0100;
        /// Unimplemented; rejected with [`crate::Error::UnsupportedFlag`].
        const ALTDIRFUNC   = 0x0200;
        /// Enable `{a,b,c}` brace expansion.
        const BRACE        = 0x0400;
        /// Return the pattern itself when there are no matches and it had no magic characters.
        const NOMAGIC      = 0x0800;
        /// Enable `~`/`~user` expansion.
        const TILDE        = 0x1000;
        /// Only match directories.
        const ONLYDIR      = 0x2000;
        /// With `TILDE`, fail with `InvalidPattern` rather than falling back to a literal `~user`.
        const TILDE_CHECK  = 0x4000;
        /// Non-ABI extension: prune subtrees using `.gitignore` rules while walking.
        const GITIGNORE    = 0x8000;
        /// Non-ABI extension: enable `@(...)`, `!(...)`, `?(...)`, `*(...)`, `+(...)`.
        const EXTGLOB      = 0x1_0000;
    }
}

impl Flags {
    /// The "recommended" superset: shell-like behavior without surprises.
    pub const RECOMMENDED: Flags = Flags::BRACE
        .union(Flags::TILDE)
        .union(Flags::MARK)
        .union(Flags::NOSORT);
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abi_values_are_frozen() {
        assert_eq!(Flags::ERR.bits(), 0x0001);
        assert_eq!(Flags::MARK.bits(), 0x0002);
        assert_eq!(Flags::NOSORT.bits(), 0x0004);
        assert_eq!(Flags::DOOFFS.bits(), 0x0008);
        assert_eq!(Flags::NOCHECK.bits(), 0x0010);
        assert_eq!(Flags::APPEND.bits(), 0x0020);
        assert_eq!(Flags::NOESCAPE.bits(), 0x0040);
        assert_eq!(Flags::PERIOD.bits(), 0x0080);
        assert_eq!(Flags::MAGCHAR.bits(), 0x0100);
        assert_eq!(Flags::ALTDIRFUNC.bits(), 0x0200);
        assert_eq!(Flags::BRACE.bits(), 0x0400);
        assert_eq!(Flags::NOMAGIC.bits(), 0x0800);
        assert_eq!(Flags::TILDE.bits(), 0x1000);
        assert_eq!(Flags::ONLYDIR.bits(), 0x2000);
        assert_eq!(Flags::TILDE_CHECK.bits(), 0x4000);
    }

    #[test]
    fn display_lists_set_names() {
        let flags = Flags::BRACE | Flags::TILDE;
        let rendered = flags.to_string();
        assert!(rendered.contains("BRACE"));
        assert!(rendered.contains("TILDE"));
    }
}
