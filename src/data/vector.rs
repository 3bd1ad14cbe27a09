//! Per-point field storage laid out by a [`BlockMap`].

use crate::data::block_map::BlockMap;
use crate::disc_error::DiscretizationError;

/// A vector of `f64` values materialised from a contiguous buffer under a map.
///
/// The vector copies the map's point offsets at construction, so element
/// access does not need the map afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockVector {
    values: Vec<f64>,
    offsets: Vec<usize>,
}

impl BlockVector {
    /// Copy `buf` into a new vector laid out by `map`.
    ///
    /// # Errors
    /// Returns `Err(LengthMismatch)` if `buf.len() != map.num_my_points()`.
    pub fn copy_from(map: &BlockMap, buf: &[f64]) -> Result<Self, DiscretizationError> {
        if buf.len() != map.num_my_points() {
            return Err(DiscretizationError::LengthMismatch {
                what: "vector buffer",
                expected: map.num_my_points(),
                got: buf.len(),
            });
        }
        Ok(Self {
            values: buf.to_vec(),
            offsets: map.first_point_offsets().to_vec(),
        })
    }

    /// A zero-filled vector laid out by `map`.
    pub fn zeros(map: &BlockMap) -> Self {
        Self {
            values: vec![0.0; map.num_my_points()],
            offsets: map.first_point_offsets().to_vec(),
        }
    }

    /// All values, element after element.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of scalar values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of map elements.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The values belonging to the element at local offset `lid`.
    pub fn element(&self, lid: usize) -> Option<&[f64]> {
        let lo = *self.offsets.get(lid)?;
        let hi = *self.offsets.get(lid + 1)?;
        self.values.get(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::ids::GlobalId;

    fn map3() -> BlockMap {
        let ids = [5u64, 9].into_iter().map(GlobalId::from_u64).collect();
        BlockMap::with_block_size(&NoComm, ids, 3).unwrap()
    }

    #[test]
    fn elements_slice_by_block() {
        let v = BlockVector::copy_from(&map3(), &[0., 1., 2., 3., 4., 5.]).unwrap();
        assert_eq!(v.num_elements(), 2);
        assert_eq!(v.element(1), Some(&[3., 4., 5.][..]));
        assert_eq!(v.element(2), None);
    }

    #[test]
    fn wrong_buffer_length_is_rejected() {
        let err = BlockVector::copy_from(&map3(), &[0.; 5]).unwrap_err();
        assert_eq!(
            err,
            DiscretizationError::LengthMismatch {
                what: "vector buffer",
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn zeros_match_layout() {
        let v = BlockVector::zeros(&map3());
        assert_eq!(v.len(), 6);
        assert!(v.values().iter().all(|&x| x == 0.0));
    }
}
