#![cfg_attr(docsrs, feature(doc_cfg))]
//! # pd-discretization
//!
//! pd-discretization builds the per-rank bookkeeping a parallel meshfree
//! (peridynamic) code needs before it can compute: given the points a rank
//! owns and their neighbor lists in *global* ids, it produces
//!
//! - owned and overlap (owned + ghost) index spaces, at one and three values per point,
//! - the neighbor lists rewritten into overlap-local offsets,
//! - a bond index space over the points that have neighbors,
//! - reference positions and cell volumes laid out on the owned maps.
//!
//! ## Features
//! - Ghost resolution purely from neighbor connectivity
//! - Deterministic overlap layout: owned ids in input order, then ghosts ascending
//! - Pluggable communication backends (serial, threads, MPI) for the map collectives
//! - Invariant checking in debug builds, or always with `check-invariants`
//!
//! ## Usage
//! ```rust
//! # fn try_main() -> Result<(), pd_discretization::disc_error::DiscretizationError> {
//! use pd_discretization::prelude::*;
//!
//! let decomp = Decomposition {
//!     dimension: 3,
//!     global_ids: vec![10, 11, 12],
//!     positions: vec![0.0; 9],
//!     volumes: vec![1.0; 3],
//!     neighborhood: vec![2, 21, 22, 0, 1, 21],
//!     horizon: None,
//! };
//! let disc = QuickGridDiscretization::new(&NoComm, &decomp)?;
//! assert_eq!(disc.num_bonds(), 3);
//! assert_eq!(disc.neighborhood_data().neighbors(0), Some(&[3, 4][..]));
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! Only three-dimensional decompositions are supported.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod disc_error;
pub mod discretization;
pub mod ids;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::data::block_map::BlockMap;
    pub use crate::data::neighborhood::NeighborhoodData;
    pub use crate::data::vector::BlockVector;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::disc_error::DiscretizationError;
    pub use crate::discretization::{
        Decomposition, DecompositionSource, DiscretizationConfig, QuickGridDiscretization,
    };
    pub use crate::ids::GlobalId;
}
