//! Discretization assembly: configuration, decomposition input, and the
//! assembled per-rank [`QuickGridDiscretization`].

pub mod config;
pub mod decomposition;
pub mod quick_grid;

pub use config::{DiscretizationConfig, QUICK_GRID_TYPE};
pub use decomposition::{Decomposition, DecompositionSource};
pub use quick_grid::QuickGridDiscretization;
