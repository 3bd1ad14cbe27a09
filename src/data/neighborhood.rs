//! Neighborhood data in overlap-local indices.
//!
//! [`NeighborhoodData`] is what downstream kernels iterate: for each owned
//! point, a count followed by the *local* offsets of its neighbors in the
//! overlap map. The layout mirrors the global table exactly, so the pointer
//! table is shared between both.

use crate::debug_invariants::DebugInvariants;
use crate::disc_error::DiscretizationError;

/// Localized neighbor lists of the owned points.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NeighborhoodData {
    owned_ids: Vec<usize>,
    neighborhood_ptr: Vec<usize>,
    neighborhood_list: Vec<usize>,
}

impl NeighborhoodData {
    pub(crate) fn from_parts(
        owned_ids: Vec<usize>,
        neighborhood_ptr: Vec<usize>,
        neighborhood_list: Vec<usize>,
    ) -> Self {
        Self {
            owned_ids,
            neighborhood_ptr,
            neighborhood_list,
        }
    }

    /// Number of owned points.
    #[inline]
    pub fn num_owned(&self) -> usize {
        self.owned_ids.len()
    }

    /// Overlap-local offset of each owned point, in owned order.
    #[inline]
    pub fn owned_ids(&self) -> &[usize] {
        &self.owned_ids
    }

    /// Base offset of each owned point's record in [`neighborhood_list`](Self::neighborhood_list).
    #[inline]
    pub fn neighborhood_ptr(&self) -> &[usize] {
        &self.neighborhood_ptr
    }

    /// Flattened `[k, lid, .., k, lid, ..]` list.
    #[inline]
    pub fn neighborhood_list(&self) -> &[usize] {
        &self.neighborhood_list
    }

    /// Length of the flattened list, counts included.
    #[inline]
    pub fn neighborhood_list_size(&self) -> usize {
        self.neighborhood_list.len()
    }

    /// Neighbor count of owned point `i`.
    pub fn num_neighbors(&self, i: usize) -> Option<usize> {
        let base = *self.neighborhood_ptr.get(i)?;
        self.neighborhood_list.get(base).copied()
    }

    /// Overlap-local neighbor offsets of owned point `i`.
    pub fn neighbors(&self, i: usize) -> Option<&[usize]> {
        let base = *self.neighborhood_ptr.get(i)?;
        let k = *self.neighborhood_list.get(base)?;
        self.neighborhood_list.get(base + 1..base + 1 + k)
    }
}

impl DebugInvariants for NeighborhoodData {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "NeighborhoodData invalid");
    }

    fn validate_invariants(&self) -> Result<(), DiscretizationError> {
        let broken = |detail: String| DiscretizationError::InvariantViolation {
            what: "NeighborhoodData",
            detail,
        };
        if self.neighborhood_ptr.len() != self.owned_ids.len() {
            return Err(broken(format!(
                "{} owned ids but {} record pointers",
                self.owned_ids.len(),
                self.neighborhood_ptr.len()
            )));
        }
        let mut expected = 0usize;
        for (i, &base) in self.neighborhood_ptr.iter().enumerate() {
            if base != expected {
                return Err(broken(format!(
                    "record {i} starts at {base}, expected {expected}"
                )));
            }
            let k = *self
                .neighborhood_list
                .get(base)
                .ok_or_else(|| broken(format!("record {i} starts past end of list")))?;
            expected = base + 1 + k;
        }
        if expected != self.neighborhood_list.len() {
            return Err(broken(format!(
                "records cover {expected} entries, list holds {}",
                self.neighborhood_list.len()
            )));
        }
        Ok(())
    }
}
