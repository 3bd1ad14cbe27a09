//! The per-rank point cloud handed over by a decomposition source.
//!
//! Generating the cloud and balancing it across ranks happen upstream; this
//! crate only consumes the result.

use crate::disc_error::DiscretizationError;

/// Points owned by one rank, with their candidate neighbor lists.
///
/// All per-point buffers are in the same owned-point order:
/// - `global_ids[i]`: raw id of point `i` (negative means unassigned and is rejected),
/// - `positions[3 * i..3 * i + 3]`: coordinates,
/// - `volumes[i]`: cell volume,
/// - `neighborhood`: flattened `[k_i, ids..]` records, global ids.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decomposition {
    pub dimension: usize,
    pub global_ids: Vec<i64>,
    pub positions: Vec<f64>,
    pub volumes: Vec<f64>,
    pub neighborhood: Vec<i64>,
    /// Horizon used to build the neighbor lists, if the source knows it.
    pub horizon: Option<f64>,
}

impl Decomposition {
    /// Number of owned points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.global_ids.len()
    }

    /// Check dimension and per-point buffer lengths.
    ///
    /// The neighbor table layout is checked separately when it is walked.
    pub fn check_layout(&self) -> Result<(), DiscretizationError> {
        if self.dimension != 3 {
            return Err(DiscretizationError::UnsupportedDimension(self.dimension));
        }
        let n = self.num_points();
        if self.positions.len() != 3 * n {
            return Err(DiscretizationError::LengthMismatch {
                what: "positions",
                expected: 3 * n,
                got: self.positions.len(),
            });
        }
        if self.volumes.len() != n {
            return Err(DiscretizationError::LengthMismatch {
                what: "volumes",
                expected: n,
                got: self.volumes.len(),
            });
        }
        Ok(())
    }
}

/// Anything that can produce this rank's [`Decomposition`].
pub trait DecompositionSource {
    fn decomposition(
        &mut self,
        rank: usize,
        num_ranks: usize,
    ) -> Result<Decomposition, DiscretizationError>;
}

/// A ready-made decomposition is its own source.
impl DecompositionSource for Decomposition {
    fn decomposition(
        &mut self,
        _rank: usize,
        _num_ranks: usize,
    ) -> Result<Decomposition, DiscretizationError> {
        Ok(self.clone())
    }
}

impl<F> DecompositionSource for F
where
    F: FnMut(usize, usize) -> Result<Decomposition, DiscretizationError>,
{
    fn decomposition(
        &mut self,
        rank: usize,
        num_ranks: usize,
    ) -> Result<Decomposition, DiscretizationError> {
        self(rank, num_ranks)
    }
}
