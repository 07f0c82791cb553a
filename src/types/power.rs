// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power setpoint limits.

use crate::error::ValidationError;

/// Charge ceiling shared by all Venus variants, in watts.
const CHARGE_LIMIT_W: i32 = 1200;

/// Power setpoint limits for a deployment.
///
/// Venus variants differ in how much power they may feed back: the discharge
/// bound is the configured maximum output power of the installed device,
/// while the charge bound is a fixed 1200 W across variants. Setpoints are
/// signed: positive charges the battery, negative discharges it.
///
/// # Examples
///
/// ```
/// use venusr_lib::types::PowerLimits;
///
/// // A Venus E rated for 2500 W output
/// let limits = PowerLimits::new(2500);
/// assert!(limits.validate_setpoint(-2500).is_ok());
/// assert!(limits.validate_setpoint(1200).is_ok());
/// assert!(limits.validate_setpoint(-2501).is_err());
/// assert!(limits.validate_setpoint(1201).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerLimits {
    max_output_power_w: u16,
}

impl PowerLimits {
    /// Charge bound in watts, identical for all variants.
    pub const CHARGE_LIMIT_W: i32 = CHARGE_LIMIT_W;

    /// Creates limits for a device with the given maximum output power.
    #[must_use]
    pub const fn new(max_output_power_w: u16) -> Self {
        Self { max_output_power_w }
    }

    /// Returns the configured maximum output power in watts.
    #[must_use]
    pub const fn max_output_power_w(&self) -> u16 {
        self.max_output_power_w
    }

    /// Returns the discharge bound as a signed setpoint (negative).
    #[must_use]
    pub fn discharge_limit_w(&self) -> i32 {
        -i32::from(self.max_output_power_w)
    }

    /// Validates a signed power setpoint against these limits.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::PowerOutOfRange` if the setpoint lies
    /// outside `[-max_output_power, 1200]`.
    pub fn validate_setpoint(&self, power_w: i32) -> Result<(), ValidationError> {
        let min = self.discharge_limit_w();
        if !(min..=CHARGE_LIMIT_W).contains(&power_w) {
            return Err(ValidationError::PowerOutOfRange {
                min,
                max: CHARGE_LIMIT_W,
                actual: power_w,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_accept_full_range() {
        let limits = PowerLimits::new(2500);
        for power in [-2500, -1, 0, 1, 1200] {
            assert!(limits.validate_setpoint(power).is_ok(), "power {power}");
        }
    }

    #[test]
    fn limits_reject_out_of_range() {
        let limits = PowerLimits::new(2500);
        assert!(limits.validate_setpoint(-2501).is_err());
        assert!(limits.validate_setpoint(1201).is_err());
    }

    #[test]
    fn discharge_bound_tracks_output_power() {
        assert_eq!(PowerLimits::new(800).discharge_limit_w(), -800);
        assert_eq!(PowerLimits::new(2500).discharge_limit_w(), -2500);
    }

    #[test]
    fn charge_bound_is_fixed() {
        // The charge ceiling does not depend on the output rating
        let small = PowerLimits::new(800);
        assert!(small.validate_setpoint(1200).is_ok());
        assert!(small.validate_setpoint(1201).is_err());
    }

    #[test]
    fn error_reports_bounds() {
        let err = PowerLimits::new(800).validate_setpoint(-900).unwrap_err();
        assert_eq!(
            err.to_string(),
            "power setpoint -900 W is out of range [-800, 1200]"
        );
    }
}
