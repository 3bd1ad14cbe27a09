//! Data module: index spaces, neighbor tables and per-point vectors
#![warn(missing_docs)]

pub mod block_map;
pub mod neighbor_table;
pub mod neighborhood;
pub mod vector;

pub use block_map::BlockMap;
pub use neighbor_table::NeighborTable;
pub use neighborhood::NeighborhoodData;
pub use vector::BlockVector;
