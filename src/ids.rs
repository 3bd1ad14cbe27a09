//! `GlobalId`: the process-wide identifier of a point
//!
//! Decomposition sources hand out identifiers as signed integers so that
//! negative values can mark "unassigned" slots. Inside the crate every
//! identifier is a validated, non-negative [`GlobalId`]; the conversion is the
//! one place where negative values are rejected.

use std::fmt;

use crate::disc_error::DiscretizationError;

/// A validated, non-negative global point identifier.
///
/// Identifiers are unique across all processes but need not be contiguous.
/// `GlobalId` orders by its raw value, which is what makes the ghost ordering
/// ascending.
///
/// # Memory layout
/// `repr(transparent)` over `u64`, so slices of ids can be shipped over a
/// communicator as plain `u64` words.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct GlobalId(u64);

impl GlobalId {
    /// Validate a raw identifier coming from a decomposition source.
    ///
    /// # Errors
    /// Returns [`DiscretizationError::NegativeGlobalId`] if `raw < 0`.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), pd_discretization::disc_error::DiscretizationError> {
    /// use pd_discretization::ids::GlobalId;
    /// let g = GlobalId::new(42)?;
    /// assert_eq!(g.get(), 42);
    /// assert!(GlobalId::new(-1).is_err());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn new(raw: i64) -> Result<Self, DiscretizationError> {
        u64::try_from(raw)
            .map(GlobalId)
            .map_err(|_| DiscretizationError::NegativeGlobalId(raw))
    }

    /// Wrap an unsigned identifier; always valid.
    #[inline]
    pub const fn from_u64(raw: u64) -> Self {
        GlobalId(raw)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Validate a whole slice of raw identifiers, preserving order.
    ///
    /// Fails on the first negative entry.
    pub fn from_raw_slice(raw: &[i64]) -> Result<Vec<GlobalId>, DiscretizationError> {
        raw.iter().map(|&r| GlobalId::new(r)).collect()
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobalId").field(&self.0).finish()
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
