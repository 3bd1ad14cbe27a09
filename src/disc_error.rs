//! DiscretizationError: unified error type for pd-discretization public APIs
//!
//! Every fallible operation in the crate returns this type. Nothing in the
//! construction pipeline is retried: each variant either describes malformed
//! input, a broken internal invariant, or a failure reported by the
//! communication layer.

use thiserror::Error;

use crate::ids::GlobalId;

/// Unified error type for discretization construction and queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscretizationError {
    /// The decomposition is not three-dimensional.
    #[error("Invalid dimension in decomposition (only 3D is supported), got {0}")]
    UnsupportedDimension(usize),
    /// The configuration names a discretization type other than QuickGrid.
    #[error("Invalid discretization type `{0}` (expected `PdQuickGrid`)")]
    WrongDiscretizationType(String),
    /// A configuration value is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The flattened neighbor table does not follow the count-then-ids layout.
    #[error("Malformed neighborhood at point {point} (table offset {offset}): {reason}")]
    MalformedNeighborhood {
        point: usize,
        offset: usize,
        reason: &'static str,
    },
    /// A per-point buffer has the wrong number of entries.
    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// A global identifier was negative; negative values mean "unassigned".
    #[error("Global id must be non-negative, got {0}")]
    NegativeGlobalId(i64),
    /// Only scalar (1) and vector (3) block sizes are supported.
    #[error("Block size {0} is not supported (only 1 or 3)")]
    InvalidBlockSize(usize),
    /// A map element was given a block size of zero.
    #[error("Map element {0} has zero block size")]
    ZeroSizeElement(GlobalId),
    /// The same global id was listed twice in one map.
    #[error("Global id {0} appears more than once in a map")]
    DuplicateGlobalId(GlobalId),
    /// A neighbor id could not be found in the overlap map.
    #[error("Neighbor {neighbor} of owned point {point} is missing from the overlap map")]
    UnresolvedNeighbor { point: GlobalId, neighbor: GlobalId },
    /// A constructed structure failed its internal consistency checks.
    #[error("Invariant violation in {what}: {detail}")]
    InvariantViolation { what: &'static str, detail: String },
    /// The communication layer failed during a collective.
    #[error("Communication error (rank {rank}): {source}")]
    CommError {
        rank: usize,
        #[source]
        source: CommFailure,
    },
}

/// Message carried by [`DiscretizationError::CommError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CommFailure(pub String);

impl From<String> for CommFailure {
    fn from(msg: String) -> Self {
        CommFailure(msg)
    }
}

impl From<&str> for CommFailure {
    fn from(msg: &str) -> Self {
        CommFailure(msg.to_string())
    }
}

impl DiscretizationError {
    /// Whether the error was raised before any map construction, i.e. the
    /// input or configuration itself is unusable.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DiscretizationError::UnsupportedDimension(_)
                | DiscretizationError::WrongDiscretizationType(_)
                | DiscretizationError::InvalidParameter { .. }
                | DiscretizationError::MalformedNeighborhood { .. }
                | DiscretizationError::LengthMismatch { .. }
        )
    }
}
