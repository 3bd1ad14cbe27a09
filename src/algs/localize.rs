//! Rewrite a global-id neighbor table into overlap-local offsets.
//!
//! The input table is only borrowed; the localized table is a new buffer with
//! the identical layout. Counts are copied verbatim and every neighbor id is
//! replaced by its offset in the overlap map. Every neighbor of an owned point
//! is either owned or a ghost, so a lookup miss means the table and the
//! overlap map were built from different inputs and the whole build fails.

use crate::data::block_map::BlockMap;
use crate::data::neighbor_table::NeighborTable;
use crate::data::neighborhood::NeighborhoodData;
use crate::debug_invariants::DebugInvariants;
use crate::disc_error::DiscretizationError;
use crate::ids::GlobalId;

/// Build the [`NeighborhoodData`] of the owned points against `overlap`.
///
/// # Errors
/// - `LengthMismatch` if `owned` and `table` disagree on the point count.
/// - `UnresolvedNeighbor` if an owned id or neighbor id is missing from
///   `overlap`.
pub fn localize(
    owned: &[GlobalId],
    table: &NeighborTable<'_>,
    overlap: &BlockMap,
) -> Result<NeighborhoodData, DiscretizationError> {
    if owned.len() != table.num_points() {
        return Err(DiscretizationError::LengthMismatch {
            what: "neighborhood records",
            expected: owned.len(),
            got: table.num_points(),
        });
    }

    let owned_ids = owned
        .iter()
        .map(|&gid| {
            overlap.lid(gid).ok_or(DiscretizationError::UnresolvedNeighbor {
                point: gid,
                neighbor: gid,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let raw = table.raw();
    let mut list = vec![0usize; raw.len()];
    let mut ptr = Vec::with_capacity(owned.len());
    let mut offset = 0usize;
    for (i, &point) in owned.iter().enumerate() {
        let k = table.num_neighbors(i);
        ptr.push(offset);
        list[offset] = k;
        for (slot, neighbor) in list[offset + 1..offset + 1 + k]
            .iter_mut()
            .zip(table.neighbors(i))
        {
            *slot = overlap
                .lid(neighbor)
                .ok_or(DiscretizationError::UnresolvedNeighbor { point, neighbor })?;
        }
        offset += 1 + k;
    }

    let data = NeighborhoodData::from_parts(owned_ids, ptr, list);
    data.debug_assert_invariants();
    Ok(data)
}
