//! Owned and overlap index spaces.
//!
//! Both spaces are [`BlockMap`]s with a constant block size of 1 (scalar data)
//! or 3 (R3 vector data). The overlap space lists the owned ids first, in
//! the order supplied, followed by the ghosts in the order the ghost resolver
//! produced them.

use crate::algs::communicator::Communicator;
use crate::algs::ghosts::GhostSet;
use crate::data::block_map::BlockMap;
use crate::disc_error::DiscretizationError;
use crate::ids::GlobalId;

/// Scalar-per-point block size.
pub const SCALAR: usize = 1;
/// Vector-per-point block size.
pub const VECTOR: usize = 3;

/// Reject block sizes other than [`SCALAR`] and [`VECTOR`].
pub fn check_block_size(block_size: usize) -> Result<(), DiscretizationError> {
    match block_size {
        SCALAR | VECTOR => Ok(()),
        other => Err(DiscretizationError::InvalidBlockSize(other)),
    }
}

/// Map over exactly the owned ids, in supplied order.
///
/// Ids are not reordered or deduplicated; a repeated id is reported by the map
/// as `DuplicateGlobalId`.
pub fn owned_map<C: Communicator>(
    comm: &C,
    owned: &[GlobalId],
    block_size: usize,
) -> Result<BlockMap, DiscretizationError> {
    check_block_size(block_size)?;
    BlockMap::with_block_size(comm, owned.to_vec(), block_size)
}

/// Map over the owned ids followed by the ghost ids.
pub fn overlap_map<C: Communicator>(
    comm: &C,
    owned: &[GlobalId],
    ghosts: &GhostSet,
    block_size: usize,
) -> Result<BlockMap, DiscretizationError> {
    check_block_size(block_size)?;
    let mut ids = Vec::with_capacity(owned.len() + ghosts.len());
    ids.extend_from_slice(owned);
    ids.extend_from_slice(ghosts.as_slice());
    BlockMap::with_block_size(comm, ids, block_size)
}

/// Owned/overlap map pair at one block size.
#[derive(Clone, Debug)]
pub struct IndexSpaces {
    pub owned: BlockMap,
    pub overlap: BlockMap,
}

impl IndexSpaces {
    /// Build the owned and overlap maps at `block_size`.
    pub fn build<C: Communicator>(
        comm: &C,
        owned: &[GlobalId],
        ghosts: &GhostSet,
        block_size: usize,
    ) -> Result<Self, DiscretizationError> {
        let owned_space = owned_map(comm, owned, block_size)?;
        let overlap_space = overlap_map(comm, owned, ghosts, block_size)?;
        log::debug!(
            "rank {}: block size {block_size}: {} owned, {} overlap elements",
            comm.rank(),
            owned_space.num_my_elements(),
            overlap_space.num_my_elements()
        );
        Ok(Self {
            owned: owned_space,
            overlap: overlap_space,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::algs::ghosts::shared_global_ids;
    use crate::data::neighbor_table::NeighborTable;

    fn gids(raw: &[u64]) -> Vec<GlobalId> {
        raw.iter().copied().map(GlobalId::from_u64).collect()
    }

    #[test]
    fn only_scalar_and_vector_blocks() {
        assert!(check_block_size(1).is_ok());
        assert!(check_block_size(3).is_ok());
        for bad in [0, 2, 4] {
            assert_eq!(
                owned_map(&NoComm, &gids(&[1]), bad).unwrap_err(),
                DiscretizationError::InvalidBlockSize(bad)
            );
        }
    }

    #[test]
    fn overlap_is_owned_then_ghosts() {
        let owned = gids(&[12, 10, 11]);
        let raw = [2, 40, 11, 1, 35, 0];
        let table = NeighborTable::new(&raw, 3).unwrap();
        let ghosts = shared_global_ids(&owned, &table);
        let spaces = IndexSpaces::build(&NoComm, &owned, &ghosts, VECTOR).unwrap();
        assert_eq!(spaces.owned.my_global_elements(), owned.as_slice());
        assert_eq!(
            spaces.overlap.my_global_elements(),
            gids(&[12, 10, 11, 35, 40]).as_slice()
        );
        assert_eq!(spaces.overlap.num_my_points(), 15);
    }

    #[test]
    fn duplicate_owned_id_fails() {
        assert_eq!(
            owned_map(&NoComm, &gids(&[3, 3]), SCALAR).unwrap_err(),
            DiscretizationError::DuplicateGlobalId(GlobalId::from_u64(3))
        );
    }
}
