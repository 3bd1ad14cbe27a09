//! QuickGridDiscretization: the assembled per-rank discretization.
//!
//! Construction runs a fixed pipeline over one rank's [`Decomposition`]:
//!
//! 1. reject anything that is not 3D, check buffer lengths and the
//!    neighbor table layout;
//! 2. resolve ghosts from the neighbor table;
//! 3. build owned and overlap maps at block sizes 1 and 3;
//! 4. localize the neighbor table against the scalar overlap map;
//! 5. build the bond map;
//! 6. copy positions and volumes into vectors over the owned maps.
//!
//! Map construction is collective, so every rank of the communicator must
//! construct its discretization at the same time. Nothing is mutated after
//! construction.

use itertools::Itertools;

use crate::algs::bond_map::bond_map;
use crate::algs::communicator::Communicator;
use crate::algs::ghosts::shared_global_ids;
use crate::algs::index_space::{IndexSpaces, SCALAR, VECTOR, check_block_size};
use crate::algs::localize::localize;
use crate::data::block_map::BlockMap;
use crate::data::neighbor_table::NeighborTable;
use crate::data::neighborhood::NeighborhoodData;
use crate::data::vector::BlockVector;
use crate::debug_invariants::DebugInvariants;
use crate::disc_error::DiscretizationError;
use crate::discretization::config::{DiscretizationConfig, check_horizon};
use crate::discretization::decomposition::{Decomposition, DecompositionSource};
use crate::ids::GlobalId;

#[derive(Clone, Debug)]
pub struct QuickGridDiscretization {
    scalar: IndexSpaces,
    vector: IndexSpaces,
    bond_map: BlockMap,
    initial_x: BlockVector,
    cell_volume: BlockVector,
    neighborhood: NeighborhoodData,
    num_bonds: usize,
    horizon: Option<f64>,
    rank: usize,
    num_ranks: usize,
}

impl QuickGridDiscretization {
    /// Assemble a discretization from an already computed decomposition.
    ///
    /// # Errors
    /// - Configuration errors (`UnsupportedDimension`, `LengthMismatch`,
    ///   `MalformedNeighborhood`) before any map is built.
    /// - `NegativeGlobalId`, `DuplicateGlobalId`, `UnresolvedNeighbor` for
    ///   corrupted ids.
    /// - `CommError` from map construction, unchanged.
    pub fn new<C: Communicator>(
        comm: &C,
        decomp: &Decomposition,
    ) -> Result<Self, DiscretizationError> {
        Self::build(comm, decomp, decomp.horizon, false)
    }

    /// Pull this rank's decomposition from `source` and assemble it.
    ///
    /// The configured horizon, when set, takes precedence over the one the
    /// source reports.
    pub fn from_source<C, S>(
        comm: &C,
        config: &DiscretizationConfig,
        source: &mut S,
    ) -> Result<Self, DiscretizationError>
    where
        C: Communicator,
        S: DecompositionSource + ?Sized,
    {
        config.validate()?;
        let decomp = source.decomposition(comm.rank(), comm.size())?;
        let horizon = config.horizon.or(decomp.horizon);
        Self::build(comm, &decomp, horizon, config.check_invariants)
    }

    fn build<C: Communicator>(
        comm: &C,
        decomp: &Decomposition,
        horizon: Option<f64>,
        check_invariants: bool,
    ) -> Result<Self, DiscretizationError> {
        decomp.check_layout()?;
        if let Some(h) = horizon {
            check_horizon(h)?;
        }
        let owned = GlobalId::from_raw_slice(&decomp.global_ids)?;
        let table = NeighborTable::new(&decomp.neighborhood, owned.len())?;

        let ghosts = shared_global_ids(&owned, &table);
        log::debug!(
            "rank {}: {} owned points reference {} ghost(s)",
            comm.rank(),
            owned.len(),
            ghosts.len()
        );

        let scalar = IndexSpaces::build(comm, &owned, &ghosts, SCALAR)?;
        let vector = IndexSpaces::build(comm, &owned, &ghosts, VECTOR)?;
        drop(ghosts);

        let neighborhood = localize(&owned, &table, &scalar.overlap)?;
        let bonds = bond_map(comm, &owned, &table)?;

        let initial_x = BlockVector::copy_from(&vector.owned, &decomp.positions)?;
        let cell_volume = BlockVector::copy_from(&scalar.owned, &decomp.volumes)?;

        let disc = Self {
            scalar,
            vector,
            bond_map: bonds.map,
            initial_x,
            cell_volume,
            neighborhood,
            num_bonds: bonds.num_bonds,
            horizon,
            rank: comm.rank(),
            num_ranks: comm.size(),
        };
        disc.enforce_invariants(check_invariants)?;

        log::info!(
            "rank {}/{}: discretization with {} owned, {} ghost, {} bonds",
            disc.rank,
            disc.num_ranks,
            disc.num_owned(),
            disc.ghost_ids().len(),
            disc.num_bonds
        );
        Ok(disc)
    }

    /// Owned map at block size `d` (1 or 3).
    pub fn map(&self, d: usize) -> Result<&BlockMap, DiscretizationError> {
        check_block_size(d)?;
        Ok(if d == SCALAR {
            &self.scalar.owned
        } else {
            &self.vector.owned
        })
    }

    /// Owned-plus-ghost map at block size `d` (1 or 3).
    pub fn overlap_map(&self, d: usize) -> Result<&BlockMap, DiscretizationError> {
        check_block_size(d)?;
        Ok(if d == SCALAR {
            &self.scalar.overlap
        } else {
            &self.vector.overlap
        })
    }

    /// Map keyed by owned points with at least one neighbor, one slot per bond.
    #[inline]
    pub fn bond_map(&self) -> &BlockMap {
        &self.bond_map
    }

    /// Reference positions of the owned points, over `map(3)`.
    #[inline]
    pub fn initial_x(&self) -> &BlockVector {
        &self.initial_x
    }

    /// Cell volumes of the owned points, over `map(1)`.
    #[inline]
    pub fn cell_volume(&self) -> &BlockVector {
        &self.cell_volume
    }

    /// Neighbor lists in overlap-local offsets.
    #[inline]
    pub fn neighborhood_data(&self) -> &NeighborhoodData {
        &self.neighborhood
    }

    /// Total number of bonds of the owned points.
    #[inline]
    pub fn num_bonds(&self) -> usize {
        self.num_bonds
    }

    #[inline]
    pub fn horizon(&self) -> Option<f64> {
        self.horizon
    }

    #[inline]
    pub fn num_owned(&self) -> usize {
        self.scalar.owned.num_my_elements()
    }

    /// Ghost ids, ascending; the tail of the overlap map.
    pub fn ghost_ids(&self) -> &[GlobalId] {
        &self.scalar.overlap.my_global_elements()[self.num_owned()..]
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }
}

impl DebugInvariants for QuickGridDiscretization {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "QuickGridDiscretization invalid");
    }

    fn validate_invariants(&self) -> Result<(), DiscretizationError> {
        let broken = |detail: String| DiscretizationError::InvariantViolation {
            what: "QuickGridDiscretization",
            detail,
        };
        for map in [
            &self.scalar.owned,
            &self.scalar.overlap,
            &self.vector.owned,
            &self.vector.overlap,
            &self.bond_map,
        ] {
            map.validate_invariants()?;
        }
        self.neighborhood.validate_invariants()?;

        if !self.scalar.owned.same_elements(&self.vector.owned)
            || !self.scalar.overlap.same_elements(&self.vector.overlap)
        {
            return Err(broken("scalar and vector maps list different ids".into()));
        }
        let owned = self.scalar.owned.my_global_elements();
        if self.scalar.overlap.my_global_elements().get(..owned.len()) != Some(owned) {
            return Err(broken("overlap map does not start with the owned ids".into()));
        }
        if !self.ghost_ids().iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(broken("ghost ids are not strictly ascending".into()));
        }
        if self.bond_map.num_my_points() != self.num_bonds {
            return Err(broken(format!(
                "bond map holds {} slots for {} bonds",
                self.bond_map.num_my_points(),
                self.num_bonds
            )));
        }
        if self.neighborhood.num_owned() != owned.len() {
            return Err(broken("neighborhood and owned map disagree on point count".into()));
        }
        let overlap_len = self.scalar.overlap.num_my_elements();
        for i in 0..self.neighborhood.num_owned() {
            let lids = self.neighborhood.neighbors(i).unwrap_or_default();
            if let Some(&bad) = lids.iter().find(|&&lid| lid >= overlap_len) {
                return Err(broken(format!(
                    "point {i} has local neighbor {bad} outside the overlap map"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;

    fn example() -> Decomposition {
        Decomposition {
            dimension: 3,
            global_ids: vec![10, 11, 12],
            positions: (0..9).map(f64::from).collect(),
            volumes: vec![1.0, 2.0, 3.0],
            neighborhood: vec![2, 21, 22, 0, 1, 21],
            horizon: Some(0.5),
        }
    }

    fn gids(raw: &[u64]) -> Vec<GlobalId> {
        raw.iter().copied().map(GlobalId::from_u64).collect()
    }

    #[test]
    fn assembles_the_reference_example() {
        let disc = QuickGridDiscretization::new(&NoComm, &example()).unwrap();
        assert_eq!(disc.ghost_ids(), gids(&[21, 22]).as_slice());
        assert_eq!(
            disc.overlap_map(1).unwrap().my_global_elements(),
            gids(&[10, 11, 12, 21, 22]).as_slice()
        );
        assert_eq!(disc.neighborhood_data().neighbors(0), Some(&[3, 4][..]));
        assert_eq!(disc.bond_map().my_global_elements(), gids(&[10, 12]).as_slice());
        assert_eq!(disc.bond_map().element_sizes(), &[2, 1]);
        assert_eq!(disc.num_bonds(), 3);
        assert_eq!(disc.horizon(), Some(0.5));
        disc.validate_invariants().unwrap();
    }

    #[test]
    fn vectors_follow_owned_maps() {
        let disc = QuickGridDiscretization::new(&NoComm, &example()).unwrap();
        assert_eq!(disc.initial_x().element(2), Some(&[6.0, 7.0, 8.0][..]));
        assert_eq!(disc.cell_volume().values(), &[1.0, 2.0, 3.0]);
        assert_eq!(disc.map(3).unwrap().num_my_points(), 9);
        assert_eq!(disc.overlap_map(3).unwrap().num_my_points(), 15);
    }

    #[test]
    fn only_block_sizes_one_and_three() {
        let disc = QuickGridDiscretization::new(&NoComm, &example()).unwrap();
        assert_eq!(disc.map(2).unwrap_err(), DiscretizationError::InvalidBlockSize(2));
        assert_eq!(
            disc.overlap_map(0).unwrap_err(),
            DiscretizationError::InvalidBlockSize(0)
        );
    }

    #[test]
    fn two_dimensional_input_is_rejected() {
        let mut d = example();
        d.dimension = 2;
        let err = QuickGridDiscretization::new(&NoComm, &d).unwrap_err();
        assert_eq!(err, DiscretizationError::UnsupportedDimension(2));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn config_horizon_overrides_source() {
        let cfg = DiscretizationConfig {
            horizon: Some(1.25),
            check_invariants: true,
            ..Default::default()
        };
        let mut src = example();
        let disc = QuickGridDiscretization::from_source(&NoComm, &cfg, &mut src).unwrap();
        assert_eq!(disc.horizon(), Some(1.25));
    }

    #[test]
    fn wrong_type_fails_before_reading_source() {
        let cfg = DiscretizationConfig {
            kind: "Exodus".into(),
            ..Default::default()
        };
        let mut src = |_: usize, _: usize| -> Result<Decomposition, DiscretizationError> {
            panic!("source must not be queried")
        };
        assert_eq!(
            QuickGridDiscretization::from_source(&NoComm, &cfg, &mut src).unwrap_err(),
            DiscretizationError::WrongDiscretizationType("Exodus".into())
        );
    }

    #[test]
    fn negative_owned_id_is_rejected() {
        let mut d = example();
        d.global_ids[1] = -1;
        assert_eq!(
            QuickGridDiscretization::new(&NoComm, &d).unwrap_err(),
            DiscretizationError::NegativeGlobalId(-1)
        );
    }
}
