//! Validated view over a flattened, global-id neighbor table.
//!
//! The table stores, for every owned point in owned order, a count `k`
//! followed by `k` global ids:
//!
//! ```text
//! [k_0, n_0_0, .., n_0_{k_0-1}, k_1, n_1_0, .., k_2, ..]
//! ```
//!
//! `NeighborTable` borrows the raw buffer, checks the layout once and keeps
//! the per-point base offsets so later passes can index records directly.

use crate::disc_error::DiscretizationError;
use crate::ids::GlobalId;

/// Borrowed neighbor table with precomputed record offsets.
#[derive(Clone, Debug)]
pub struct NeighborTable<'a> {
    raw: &'a [i64],
    ptr: Vec<usize>,
}

impl<'a> NeighborTable<'a> {
    /// Validate `raw` as the neighbor table of `num_points` owned points.
    ///
    /// # Errors
    /// - `MalformedNeighborhood` if a count is negative, a record runs past
    ///   the end of the buffer, or entries remain after the last record.
    /// - `LengthMismatch` if the table holds fewer records than points.
    /// - `NegativeGlobalId` if a neighbor value is negative.
    pub fn new(raw: &'a [i64], num_points: usize) -> Result<Self, DiscretizationError> {
        let mut ptr = Vec::with_capacity(num_points);
        let mut offset = 0usize;
        for point in 0..num_points {
            let Some(&count) = raw.get(offset) else {
                return Err(DiscretizationError::LengthMismatch {
                    what: "neighborhood records",
                    expected: num_points,
                    got: point,
                });
            };
            let count = usize::try_from(count).map_err(|_| {
                DiscretizationError::MalformedNeighborhood {
                    point,
                    offset,
                    reason: "negative neighbor count",
                }
            })?;
            let end = offset + 1 + count;
            let Some(values) = raw.get(offset + 1..end) else {
                return Err(DiscretizationError::MalformedNeighborhood {
                    point,
                    offset,
                    reason: "neighbor record runs past end of table",
                });
            };
            if let Some(&bad) = values.iter().find(|&&v| v < 0) {
                return Err(DiscretizationError::NegativeGlobalId(bad));
            }
            ptr.push(offset);
            offset = end;
        }
        if offset != raw.len() {
            return Err(DiscretizationError::MalformedNeighborhood {
                point: num_points,
                offset,
                reason: "trailing entries after last neighbor record",
            });
        }
        Ok(Self { raw, ptr })
    }

    /// Number of owned points (records).
    #[inline]
    pub fn num_points(&self) -> usize {
        self.ptr.len()
    }

    /// Total table length, counts included: Σ(1 + k_i).
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the table has no entries at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Base offset of each point's record.
    #[inline]
    pub fn ptr(&self) -> &[usize] {
        &self.ptr
    }

    /// The raw buffer this view validated.
    #[inline]
    pub fn raw(&self) -> &'a [i64] {
        self.raw
    }

    /// Neighbor count `k_i` of point `i`, read from the table.
    ///
    /// # Panics
    /// Panics if `i >= num_points()`.
    #[inline]
    pub fn num_neighbors(&self, i: usize) -> usize {
        // validated non-negative in `new`
        self.raw[self.ptr[i]] as usize
    }

    /// Neighbor ids of point `i`.
    ///
    /// # Panics
    /// Panics if `i >= num_points()`.
    pub fn neighbors(&self, i: usize) -> impl ExactSizeIterator<Item = GlobalId> + 'a {
        let base = self.ptr[i];
        let k = self.num_neighbors(i);
        self.raw[base + 1..base + 1 + k]
            .iter()
            .map(|&v| GlobalId::from_u64(v as u64))
    }

    /// Every neighbor value of every point, in table order.
    pub fn all_neighbors(&self) -> impl Iterator<Item = GlobalId> + '_ {
        (0..self.num_points()).flat_map(move |i| self.neighbors(i))
    }

    /// Σ k_i over all points.
    pub fn total_neighbors(&self) -> usize {
        self.raw.len() - self.ptr.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_variable_length_records() {
        let raw = [2, 21, 22, 0, 1, 21];
        let t = NeighborTable::new(&raw, 3).unwrap();
        assert_eq!(t.ptr(), &[0, 3, 4]);
        assert_eq!(t.num_neighbors(1), 0);
        assert_eq!(
            t.neighbors(0).map(GlobalId::get).collect::<Vec<_>>(),
            vec![21, 22]
        );
        assert_eq!(t.total_neighbors(), 3);
        assert_eq!(t.all_neighbors().count(), 3);
    }

    #[test]
    fn negative_count_is_malformed() {
        let raw = [1, 5, -1];
        assert!(matches!(
            NeighborTable::new(&raw, 2),
            Err(DiscretizationError::MalformedNeighborhood { point: 1, offset: 2, .. })
        ));
    }

    #[test]
    fn overrun_and_trailing_entries_are_malformed() {
        assert!(matches!(
            NeighborTable::new(&[3, 1, 2], 1),
            Err(DiscretizationError::MalformedNeighborhood { point: 0, .. })
        ));
        assert!(matches!(
            NeighborTable::new(&[1, 1, 7], 1),
            Err(DiscretizationError::MalformedNeighborhood { point: 1, offset: 2, .. })
        ));
    }

    #[test]
    fn too_few_records() {
        assert_eq!(
            NeighborTable::new(&[0], 2).unwrap_err(),
            DiscretizationError::LengthMismatch {
                what: "neighborhood records",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn negative_neighbor_is_rejected() {
        assert_eq!(
            NeighborTable::new(&[1, -4], 1).unwrap_err(),
            DiscretizationError::NegativeGlobalId(-4)
        );
    }

    #[test]
    fn empty_table_for_no_points() {
        let t = NeighborTable::new(&[], 0).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.total_neighbors(), 0);
    }
}
