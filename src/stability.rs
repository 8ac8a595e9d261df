//! Checks run before any operator is assembled.

use crate::{Float, SimError};

/// Explicit schemes here are only stable for `0 <= cfl <= 1`.
pub fn validate_cfl(cfl: Float) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&cfl) {
        Ok(())
    } else {
        Err(SimError::UnstableScheme { cfl })
    }
}

pub fn validate_domain(x0: Float, xf: Float) -> Result<(), SimError> {
    if x0.is_finite() && xf.is_finite() && x0 < xf {
        Ok(())
    } else {
        Err(SimError::InvalidDomain { x0, xf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfl_bounds_are_inclusive() {
        assert!(validate_cfl(0.0).is_ok());
        assert!(validate_cfl(1.0).is_ok());
        assert!(validate_cfl(0.5).is_ok());
    }

    #[test]
    fn cfl_outside_unit_interval_is_unstable() {
        for cfl in [-0.0001, 1.0001, Float::NAN, Float::INFINITY] {
            assert!(matches!(
                validate_cfl(cfl),
                Err(SimError::UnstableScheme { .. })
            ));
        }
    }

    #[test]
    fn domain_must_be_increasing() {
        assert!(validate_domain(-1e-9, 1e-9).is_ok());
        assert!(validate_domain(-1e9, 1e9).is_ok());
        assert!(matches!(
            validate_domain(0.0, 0.0),
            Err(SimError::InvalidDomain { .. })
        ));
        assert!(matches!(
            validate_domain(1.0, -1.0),
            Err(SimError::InvalidDomain { .. })
        ));
    }
}
