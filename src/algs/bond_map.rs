//! Bond index space: one variable-size element per owned point with neighbors.
//!
//! Per-bond data (damage, bond-level constitutive state, ..) is keyed by a map
//! whose element for point `i` has one slot per neighbor. A map element cannot
//! have size zero, so points without neighbors are left out entirely.

use crate::algs::communicator::Communicator;
use crate::data::block_map::BlockMap;
use crate::data::neighbor_table::NeighborTable;
use crate::disc_error::DiscretizationError;
use crate::ids::GlobalId;

/// Result of [`bond_map`].
#[derive(Clone, Debug)]
pub struct BondSpace {
    /// Map over owned ids with at least one neighbor, element size = neighbor count.
    pub map: BlockMap,
    /// Σ k_i over all owned points.
    pub num_bonds: usize,
}

/// Build the bond map of the owned points.
///
/// Only neighbor counts are read, so the table may hold global or local ids.
///
/// # Errors
/// `LengthMismatch` if `owned` and `table` disagree on the point count, or any
/// error from map construction.
pub fn bond_map<C: Communicator>(
    comm: &C,
    owned: &[GlobalId],
    table: &NeighborTable<'_>,
) -> Result<BondSpace, DiscretizationError> {
    if owned.len() != table.num_points() {
        return Err(DiscretizationError::LengthMismatch {
            what: "neighborhood records",
            expected: owned.len(),
            got: table.num_points(),
        });
    }

    let mut ids = vec![GlobalId::from_u64(0); owned.len()];
    let mut sizes = vec![0usize; owned.len()];
    let mut num_elements = 0usize;
    let mut num_skipped = 0usize;
    let mut num_bonds = 0usize;
    for (i, &gid) in owned.iter().enumerate() {
        let k = table.num_neighbors(i);
        if k > 0 {
            ids[i - num_skipped] = gid;
            sizes[i - num_skipped] = k;
            num_elements += 1;
        } else {
            num_skipped += 1;
        }
        num_bonds += k;
    }
    ids.truncate(num_elements);
    sizes.truncate(num_elements);

    if num_skipped > 0 {
        log::debug!(
            "rank {}: {num_skipped} owned point(s) without neighbors left out of the bond map",
            comm.rank()
        );
    }

    let map = BlockMap::with_element_sizes(comm, ids, sizes)?;
    Ok(BondSpace { map, num_bonds })
}
