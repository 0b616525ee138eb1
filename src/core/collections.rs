//! Optimized collection aliases used throughout the crate.

use rustc_hash::{FxBuildHasher, FxHashSet};
use smallvec::SmallVec;

/// Optimized `HashSet` for visited-record tracking in traversals and walks.
///
/// Uses `rustc_hash::FxHasher`, which is fast but not DoS-resistant; keys are
/// always internal arena keys, never attacker-controlled data.
pub type FastHashSet<T> = FxHashSet<T>;

/// Build hasher that instantiates [`FastHashSet`]'s hasher.
pub type FastBuildHasher = FxBuildHasher;

/// Small-optimized Vec that stays on the stack for up to `N` elements and
/// falls back to the heap beyond that.
///
/// Typical sizes here: `N=8` for vertex rings, `N=16` for flip worklists.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashSet`] pre-sized for `capacity` elements.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}
