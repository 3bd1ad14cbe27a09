//! Construction options for a [`QuickGridDiscretization`](super::QuickGridDiscretization).
//!
//! The struct derives `serde` so it can be embedded in whatever input format
//! the caller reads; this crate does no parsing itself.

use crate::disc_error::DiscretizationError;

/// Discretization type accepted by this crate.
pub const QUICK_GRID_TYPE: &str = "PdQuickGrid";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiscretizationConfig {
    /// Must be [`QUICK_GRID_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Neighborhood horizon; overrides the value reported by the source.
    pub horizon: Option<f64>,
    /// Validate every constructed structure and fail with
    /// `InvariantViolation` instead of only asserting in debug builds.
    pub check_invariants: bool,
}

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            kind: QUICK_GRID_TYPE.to_string(),
            horizon: None,
            check_invariants: false,
        }
    }
}

impl DiscretizationConfig {
    /// Check the type tag and the horizon, if one is set.
    pub fn validate(&self) -> Result<(), DiscretizationError> {
        if self.kind != QUICK_GRID_TYPE {
            return Err(DiscretizationError::WrongDiscretizationType(self.kind.clone()));
        }
        if let Some(h) = self.horizon {
            check_horizon(h)?;
        }
        Ok(())
    }
}

pub(crate) fn check_horizon(h: f64) -> Result<(), DiscretizationError> {
    if h.is_finite() && h > 0.0 {
        Ok(())
    } else {
        Err(DiscretizationError::InvalidParameter {
            name: "horizon",
            reason: format!("must be positive and finite, got {h}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quick_grid() {
        let cfg = DiscretizationConfig::default();
        assert_eq!(cfg.kind, "PdQuickGrid");
        cfg.validate().unwrap();
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: DiscretizationConfig =
            serde_json::from_str(r#"{ "type": "PdQuickGrid", "horizon": 0.35 }"#).unwrap();
        assert_eq!(cfg.horizon, Some(0.35));
        assert!(!cfg.check_invariants);
    }

    #[test]
    fn other_types_are_rejected() {
        let cfg: DiscretizationConfig = serde_json::from_str(r#"{ "type": "Exodus" }"#).unwrap();
        assert_eq!(
            cfg.validate(),
            Err(DiscretizationError::WrongDiscretizationType("Exodus".into()))
        );
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        let cfg = DiscretizationConfig {
            horizon: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(DiscretizationError::InvalidParameter { name: "horizon", .. })
        ));
    }
}
