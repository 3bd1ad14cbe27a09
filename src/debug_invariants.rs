//! Post-construction consistency checks.
//!
//! Every structure the assembler produces can check itself. The checks run as
//! panicking assertions in debug builds or with the `check-invariants`
//! feature, and can be turned into a hard error at runtime with
//! [`DebugInvariants::enforce_invariants`].

use crate::disc_error::DiscretizationError;

/// Self-validation of a constructed structure.
pub trait DebugInvariants {
    /// Panic on a broken invariant, if checks are compiled in.
    fn debug_assert_invariants(&self);

    /// Validate invariants and return the first violation found.
    fn validate_invariants(&self) -> Result<(), DiscretizationError>;

    /// Validate and return the violation when `strict`, otherwise only
    /// assert as [`debug_assert_invariants`](Self::debug_assert_invariants) does.
    fn enforce_invariants(&self, strict: bool) -> Result<(), DiscretizationError> {
        if strict {
            self.validate_invariants()
        } else {
            self.debug_assert_invariants();
            Ok(())
        }
    }
}

/// Whether `debug_invariants!` checks are compiled in.
#[inline]
pub const fn invariants_enabled() -> bool {
    cfg!(any(debug_assertions, feature = "check-invariants"))
}

/// Panic with `$what` as context if `$check` returns an error and invariant
/// checks are enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($check:expr, $what:literal) => {
        if $crate::debug_invariants::invariants_enabled() {
            if let Err(e) = $check {
                panic!(concat!("[invariants] ", $what, ": {}"), e);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl DebugInvariants for Broken {
        fn debug_assert_invariants(&self) {
            crate::debug_invariants!(self.validate_invariants(), "Broken invalid");
        }

        fn validate_invariants(&self) -> Result<(), DiscretizationError> {
            Err(DiscretizationError::InvariantViolation {
                what: "Broken",
                detail: "always".into(),
            })
        }
    }

    #[test]
    fn strict_enforcement_returns_the_violation() {
        assert!(matches!(
            Broken.enforce_invariants(true),
            Err(DiscretizationError::InvariantViolation { what: "Broken", .. })
        ));
    }

    #[test]
    #[cfg_attr(not(debug_assertions), ignore)]
    #[should_panic(expected = "[invariants] Broken invalid")]
    fn lenient_enforcement_asserts_in_debug() {
        let _ = Broken.enforce_invariants(false);
    }
}
