//! Ghost resolution: which referenced ids live on other ranks.
//!
//! A ghost is any id that appears as a neighbor of an owned point but is not
//! itself owned. Ghosts are returned in ascending id order so the overlap map
//! layout is reproducible across runs and rank counts.

use std::collections::BTreeSet;

use hashbrown::HashSet;

use crate::data::neighbor_table::NeighborTable;
use crate::ids::GlobalId;

/// Ascending, duplicate-free list of ghost ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostSet {
    ids: Vec<GlobalId>,
}

impl GhostSet {
    #[inline]
    pub fn as_slice(&self) -> &[GlobalId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// **O(log n)** membership test.
    pub fn contains(&self, gid: GlobalId) -> bool {
        self.ids.binary_search(&gid).is_ok()
    }

    pub fn into_vec(self) -> Vec<GlobalId> {
        self.ids
    }
}

/// Collect the ids referenced by `table` that are not in `owned`.
///
/// Builds a hash set over `owned` once, then tests every neighbor entry
/// exactly once.
///
/// # Complexity
/// **O(n + m log g)** for `n` owned ids, `m` neighbor entries and `g` ghosts.
pub fn shared_global_ids(owned: &[GlobalId], table: &NeighborTable<'_>) -> GhostSet {
    let owned: HashSet<GlobalId> = owned.iter().copied().collect();
    let shared: BTreeSet<GlobalId> = table
        .all_neighbors()
        .filter(|gid| !owned.contains(gid))
        .collect();
    GhostSet {
        ids: shared.into_iter().collect(),
    }
}
