//! The result table (`spec.md` §3, §4.6, §6): the `MatchResult` C-ABI
//! layout and the owned-bytes arena backing it.

use bumpalo::Bump;

/// Dictates the deallocation contract for a [`MatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipTag {
    /// Every path's bytes live in this result's own arena.
    Owned,
    /// Every path's bytes alias caller-owned memory; only the pointer and
    /// length arrays belong to this result.
    Borrowed,
    /// A mix of owned and borrowed slots (`APPEND` across owning and
    /// borrowed calls on the same table).
    Mixed,
}

/// One appended path: either arena-owned bytes or a borrowed slice whose
/// lifetime the caller is responsible for.
enum Slot {
    Owned(*const u8, usize),
    Borrowed(*const u8, usize),
}

impl Slot {
    fn as_ptr_len(&self) -> (*const u8, usize) {
        match *self {
            Slot::Owned(ptr, len) => (ptr, len),
            Slot::Borrowed(ptr, len) => (ptr, len),
        }
    }
}

/// The match result table: `count` matched paths plus `offset_reserve`
/// leading null slots, backed by an arena for any owned byte strings.
///
/// This is the Rust-native representation; [`crate::ffi`] projects it into
/// the flat C-ABI struct (`paths`/`lengths` pointer pairs) on demand.
pub struct MatchResult {
    arena: Bump,
    slots: Vec<Slot>,
    offset_reserve: usize,
    any_owned: bool,
    any_borrowed: bool,
}

impl MatchResult {
    pub fn new() -> Self {
        MatchResult {
            arena: Bump::new(),
            slots: Vec::new(),
            offset_reserve: 0,
            any_owned: false,
            any_borrowed: false,
        }
    }

    /// Pre-fills `offset_reserve` leading null slots (DOOFFS).
    pub fn reserve(&mut self, offset_reserve: usize) {
        self.offset_reserve = offset_reserve;
    }

    /// Copies `bytes` into the owned arena and records it as a match.
    pub fn append_owned(&mut self, bytes: &[u8]) {
        let copy = self.arena.alloc_slice_copy(bytes);
        self.slots
            .push(Slot::Owned(copy.as_ptr(), copy.len()));
        self.any_owned = true;
    }

    /// Records a caller-owned slice as a match, aliasing its memory.
    ///
    /// # Safety contract
    /// The caller must keep `bytes` alive until this `MatchResult` is
    /// released, per spec.md §6's borrowed-mode entry point note.
    pub fn append_borrowed(&mut self, bytes: &[u8]) {
        self.slots.push(Slot::Borrowed(bytes.as_ptr(), bytes.len()));
        self.any_borrowed = true;
    }

    /// Number of matched paths (excludes `offset_reserve` null slots).
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn offset_reserve(&self) -> usize {
        self.offset_reserve
    }

    pub fn ownership_tag(&self) -> OwnershipTag {
        match (self.any_owned, self.any_borrowed) {
            (true, true) => OwnershipTag::Mixed,
            (false, true) => OwnershipTag::Borrowed,
            _ => OwnershipTag::Owned,
        }
    }

    /// Iterates matched paths as byte slices, in append order.
    pub fn paths(&self) -> impl Iterator<Item = &[u8]> {
        self.slots.iter().map(|slot| {
            let (ptr, len) = slot.as_ptr_len();
            // SAFETY: owned slots point into `self.arena`, alive as long as
            // `self`; borrowed slots are the caller's contract to uphold
            // per `append_borrowed`'s doc comment.
            unsafe { std::slice::from_raw_parts(ptr, len) }
        })
    }

    /// Appends every path currently held as an owned, arena-backed copy,
    /// used by `seal()` to materialize the final sorted/deduplicated
    /// region before the C-ABI view is built.
    pub fn paths_owned_strings(&self) -> Vec<Vec<u8>> {
        self.paths().map(|p| p.to_vec()).collect()
    }

    /// Sorts the appended region (after `offset_reserve`) byte-lexicographically
    /// and removes duplicates, per spec.md §4.5 step 5's ordering rule.
    ///
    /// Reorders the existing `Slot`s in place by the bytes they point to,
    /// rather than copying everything into the owned arena: a `BORROWED`
    /// or `MIXED` table must keep aliasing the caller's memory after
    /// sorting (spec.md §8 scenario S6), not silently become `OWNED`.
    pub fn sort_and_dedup(&mut self) {
        // SAFETY: every slot's (ptr, len) was recorded by `append_owned`
        // (pointing into `self.arena`, alive as long as `self`) or
        // `append_borrowed` (the caller's contract to keep alive until
        // release) — both already valid for reads of this length.
        let bytes_of = |slot: &Slot| -> &[u8] {
            let (ptr, len) = slot.as_ptr_len();
            unsafe { std::slice::from_raw_parts(ptr, len) }
        };
        self.slots.sort_by(|a, b| bytes_of(a).cmp(bytes_of(b)));
        self.slots.dedup_by(|a, b| bytes_of(a) == bytes_of(b));
    }

    /// No-op placeholder for the conceptual "append trailing null
    /// sentinel" step; the sentinel itself is materialized by
    /// [`crate::ffi`] when it builds the flat pointer array, since a
    /// Rust-native `MatchResult` has no pointer array to terminate.
    pub fn seal(&mut self) {}
}

impl Default for MatchResult {
    fn default() -> Self {
        Self::new()
    }
}

// `release()` has no Rust-native counterpart: the arena and slot vector
// drop normally, and per-slot Borrowed pointers are never owned by
// `MatchResult` to begin with. The explicit ownership-tag-driven release
// semantics from spec.md §4.6 apply at the FFI boundary in `ffi.rs`, where
// a caller-visible C struct genuinely needs to know what to free.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_append_round_trips_bytes() {
        let mut result = MatchResult::new();
        result.append_owned(b"foo.txt");
        result.append_owned(b"bar.txt");
        assert_eq!(result.count(), 2);
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(paths, vec![b"foo.txt".as_slice(), b"bar.txt".as_slice()]);
        assert_eq!(result.ownership_tag(), OwnershipTag::Owned);
    }

    #[test]
    fn borrowed_append_sets_tag() {
        let data = vec![b"a.txt".to_vec(), b"b.txt".to_vec()];
        let mut result = MatchResult::new();
        for entry in &data {
            result.append_borrowed(entry);
        }
        assert_eq!(result.ownership_tag(), OwnershipTag::Borrowed);
        assert_eq!(result.count(), 2);
    }

    #[test]
    fn mixed_append_sets_mixed_tag() {
        let borrowed = b"c.txt".to_vec();
        let mut result = MatchResult::new();
        result.append_owned(b"a.txt");
        result.append_borrowed(&borrowed);
        assert_eq!(result.ownership_tag(), OwnershipTag::Mixed);
    }

    #[test]
    fn reserve_tracks_offset_without_affecting_count() {
        let mut result = MatchResult::new();
        result.reserve(3);
        result.append_owned(b"x");
        assert_eq!(result.offset_reserve(), 3);
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn sort_and_dedup_orders_bytes_and_removes_duplicates() {
        let mut result = MatchResult::new();
        for p in [b"b.txt".as_slice(), b"a.txt", b"a.txt", b"c.txt"] {
            result.append_owned(p);
        }
        result.sort_and_dedup();
        let paths: Vec<&[u8]> = result.paths().collect();
        assert_eq!(
            paths,
            vec![b"a.txt".as_slice(), b"b.txt".as_slice(), b"c.txt".as_slice()]
        );
    }
}
