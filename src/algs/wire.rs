//! Fixed, little-endian wire records exchanged during map construction.

use bytemuck::{Pod, Zeroable};

use crate::algs::communicator::Communicator;
use crate::disc_error::DiscretizationError;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// Per-rank map sizes, gathered from every rank when a map is built.
///
/// All fields are stored pre-LE with `.to_le()` and decoded with `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct WireMapCounts {
    pub elements_le: u64,
    pub points_le: u64,
}

impl WireMapCounts {
    pub fn new(elements: usize, points: usize) -> Self {
        Self {
            elements_le: (elements as u64).to_le(),
            points_le: (points as u64).to_le(),
        }
    }
    pub fn elements(&self) -> u64 {
        u64::from_le(self.elements_le)
    }
    pub fn points(&self) -> u64 {
        u64::from_le(self.points_le)
    }
}

/// Gather every rank's map counts, ordered by rank.
pub fn allgather_counts<C>(
    comm: &C,
    mine: WireMapCounts,
) -> Result<Vec<WireMapCounts>, DiscretizationError>
where
    C: Communicator,
{
    let n = comm.size().max(1);
    let mut all = vec![WireMapCounts::default(); n];
    comm.allgather(cast_slice(std::slice::from_ref(&mine)), cast_slice_mut(&mut all))?;
    Ok(all)
}
