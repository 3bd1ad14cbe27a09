//! Construction algorithms and the communication layer they run on.

pub mod bond_map;
pub mod communicator;
pub mod ghosts;
pub mod index_space;
pub mod localize;
pub mod wire;

pub use bond_map::{BondSpace, bond_map};
pub use ghosts::{GhostSet, shared_global_ids};
pub use index_space::{IndexSpaces, overlap_map, owned_map};
pub use localize::localize;
