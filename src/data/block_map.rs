//! BlockMap: an index space assigning global ids to local elements of varying size.
//!
//! A `BlockMap` lists the global ids present on this rank in a fixed local
//! order. Each id is an *element* with a block size (number of scalar *points*
//! it owns in a vector built on the map). It provides:
//! - a global-to-local lookup built once at construction ([`BlockMap::lid`]),
//! - contiguous point offsets in element order (prefix sums of block sizes),
//! - global sizes learned through one collective over the communicator.
//!
//! Construction is collective: every rank of the communicator must build its
//! maps in the same sequence.

use hashbrown::HashMap;

use crate::algs::communicator::Communicator;
use crate::algs::wire::{WireMapCounts, allgather_counts};
use crate::debug_invariants::DebugInvariants;
use crate::disc_error::DiscretizationError;
use crate::ids::GlobalId;

/// # Invariants
///
/// - Each global id appears exactly once in `gids`, and `lids` maps it back
///   to its position.
/// - Every element size is `> 0`.
/// - `first_point` has `len + 1` entries, starts at 0, and steps by the
///   element sizes; its last entry is the local point count.
#[derive(Clone, Debug)]
pub struct BlockMap {
    gids: Vec<GlobalId>,
    element_sizes: Vec<usize>,
    first_point: Vec<usize>,
    lids: HashMap<GlobalId, usize>,
    num_global_elements: u64,
    num_global_points: u64,
    global_element_base: u64,
    rank: usize,
    num_ranks: usize,
}

impl BlockMap {
    /// Build a map where every element has the same `block_size`.
    ///
    /// # Errors
    /// - [`DiscretizationError::ZeroSizeElement`] if `block_size == 0` and the
    ///   map is non-empty.
    /// - [`DiscretizationError::DuplicateGlobalId`] if an id repeats.
    /// - [`DiscretizationError::CommError`] if the size collective fails.
    pub fn with_block_size<C: Communicator>(
        comm: &C,
        gids: Vec<GlobalId>,
        block_size: usize,
    ) -> Result<Self, DiscretizationError> {
        let sizes = vec![block_size; gids.len()];
        Self::with_element_sizes(comm, gids, sizes)
    }

    /// Build a map with an explicit block size per element.
    ///
    /// # Errors
    /// As [`with_block_size`](Self::with_block_size), plus
    /// [`DiscretizationError::LengthMismatch`] if `sizes.len() != gids.len()`.
    pub fn with_element_sizes<C: Communicator>(
        comm: &C,
        gids: Vec<GlobalId>,
        sizes: Vec<usize>,
    ) -> Result<Self, DiscretizationError> {
        if sizes.len() != gids.len() {
            return Err(DiscretizationError::LengthMismatch {
                what: "map element sizes",
                expected: gids.len(),
                got: sizes.len(),
            });
        }

        let mut lids = HashMap::with_capacity(gids.len());
        let mut first_point = Vec::with_capacity(gids.len() + 1);
        let mut total = 0usize;
        first_point.push(0);
        for (lid, (&gid, &size)) in gids.iter().zip(&sizes).enumerate() {
            if size == 0 {
                return Err(DiscretizationError::ZeroSizeElement(gid));
            }
            if lids.insert(gid, lid).is_some() {
                return Err(DiscretizationError::DuplicateGlobalId(gid));
            }
            total += size;
            first_point.push(total);
        }

        let counts = allgather_counts(comm, WireMapCounts::new(gids.len(), total))?;
        let me = comm.rank();
        let global_element_base = counts.iter().take(me).map(|c| c.elements()).sum();
        let num_global_elements = counts.iter().map(|c| c.elements()).sum();
        let num_global_points = counts.iter().map(|c| c.points()).sum();

        let map = BlockMap {
            gids,
            element_sizes: sizes,
            first_point,
            lids,
            num_global_elements,
            num_global_points,
            global_element_base,
            rank: me,
            num_ranks: comm.size(),
        };
        map.debug_assert_invariants();
        Ok(map)
    }

    /// Local offset of `gid`, or `None` if this rank's map does not hold it.
    ///
    /// # Complexity
    /// **O(1)** expected.
    #[inline]
    pub fn lid(&self, gid: GlobalId) -> Option<usize> {
        self.lids.get(&gid).copied()
    }

    /// Global id at local offset `lid`.
    #[inline]
    pub fn gid(&self, lid: usize) -> Option<GlobalId> {
        self.gids.get(lid).copied()
    }

    /// Whether `gid` is present in this rank's map.
    #[inline]
    pub fn contains(&self, gid: GlobalId) -> bool {
        self.lids.contains_key(&gid)
    }

    /// Global ids in local order.
    #[inline]
    pub fn my_global_elements(&self) -> &[GlobalId] {
        &self.gids
    }

    /// Number of elements on this rank.
    #[inline]
    pub fn num_my_elements(&self) -> usize {
        self.gids.len()
    }

    /// Number of scalar points on this rank (sum of element sizes).
    #[inline]
    pub fn num_my_points(&self) -> usize {
        self.first_point.last().copied().unwrap_or(0)
    }

    /// Block size of each element, in local order.
    #[inline]
    pub fn element_sizes(&self) -> &[usize] {
        &self.element_sizes
    }

    /// Block size of the element at `lid`.
    #[inline]
    pub fn element_size(&self, lid: usize) -> Option<usize> {
        self.element_sizes.get(lid).copied()
    }

    /// First point offset of the element at `lid`.
    #[inline]
    pub fn first_point_in_element(&self, lid: usize) -> Option<usize> {
        if lid < self.gids.len() {
            self.first_point.get(lid).copied()
        } else {
            None
        }
    }

    /// Point offsets, `num_my_elements() + 1` entries.
    #[inline]
    pub fn first_point_offsets(&self) -> &[usize] {
        &self.first_point
    }

    /// The common block size, if every element has the same size.
    ///
    /// An empty map reports `None`.
    pub fn constant_block_size(&self) -> Option<usize> {
        let first = *self.element_sizes.first()?;
        self.element_sizes
            .iter()
            .all(|&s| s == first)
            .then_some(first)
    }

    /// Sum of element counts over all ranks.
    #[inline]
    pub fn num_global_elements(&self) -> u64 {
        self.num_global_elements
    }

    /// Sum of point counts over all ranks.
    #[inline]
    pub fn num_global_points(&self) -> u64 {
        self.num_global_points
    }

    /// Number of elements held by lower ranks.
    #[inline]
    pub fn global_element_base(&self) -> u64 {
        self.global_element_base
    }

    /// Rank this map was built on.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of ranks in the communicator this map was built on.
    #[inline]
    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    /// Same ids in the same order with the same element sizes.
    pub fn same_layout(&self, other: &BlockMap) -> bool {
        self.gids == other.gids && self.element_sizes == other.element_sizes
    }

    /// Same ids in the same order, regardless of element sizes.
    pub fn same_elements(&self, other: &BlockMap) -> bool {
        self.gids == other.gids
    }
}

impl DebugInvariants for BlockMap {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "BlockMap invalid");
    }

    fn validate_invariants(&self) -> Result<(), DiscretizationError> {
        let broken = |detail: String| DiscretizationError::InvariantViolation {
            what: "BlockMap",
            detail,
        };

        if self.lids.len() != self.gids.len() || self.element_sizes.len() != self.gids.len() {
            return Err(broken(format!(
                "{} ids, {} lookup entries, {} sizes",
                self.gids.len(),
                self.lids.len(),
                self.element_sizes.len()
            )));
        }
        for (lid, &gid) in self.gids.iter().enumerate() {
            if self.lids.get(&gid) != Some(&lid) {
                return Err(broken(format!("id {gid} does not map back to offset {lid}")));
            }
        }
        if self.first_point.len() != self.gids.len() + 1 || self.first_point.first() != Some(&0) {
            return Err(broken("point offsets do not start at 0".into()));
        }
        for (lid, (w, &size)) in self.first_point.windows(2).zip(&self.element_sizes).enumerate() {
            if size == 0 {
                return Err(DiscretizationError::ZeroSizeElement(self.gids[lid]));
            }
            if w[1] != w[0] + size {
                return Err(broken(format!("point offsets not contiguous at element {lid}")));
            }
        }
        if self.global_element_base + self.gids.len() as u64 > self.num_global_elements {
            return Err(broken("local elements exceed global element count".into()));
        }
        Ok(())
    }
}
