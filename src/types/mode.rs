// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating modes and mode configurations.
//!
//! This module provides the operating mode enum and the configuration
//! payloads for the modes that take parameters.
//!
//! # Types
//!
//! - [`OperatingMode`] - The five operating modes of a Venus device
//! - [`ManualModeConfig`] - Schedule slot written by manual mode
//! - [`PassiveModeConfig`] - Setpoint and countdown for passive mode
//!
//! # Device Methods
//!
//! Use these types with the mode setters on
//! [`VenusDevice`](crate::VenusDevice):
//! [`set_auto_mode()`](crate::VenusDevice::set_auto_mode),
//! [`set_ai_mode()`](crate::VenusDevice::set_ai_mode),
//! [`set_manual_mode()`](crate::VenusDevice::set_manual_mode),
//! [`set_passive_mode()`](crate::VenusDevice::set_passive_mode) and
//! [`set_ups_mode()`](crate::VenusDevice::set_ups_mode).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ValidationError;
use crate::types::power::PowerLimits;
use crate::types::schedule::{PeriodIndex, ScheduleTime, Weekdays};

// =============================================================================
// OperatingMode
// =============================================================================

/// Operating mode of a Venus device.
///
/// The first four modes are selectable through the vendor app and carry a
/// selector level for host automation systems. UPS mode is accepted by the
/// firmware but absent from the published API, so it has no selector level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Self-consumption: the device balances household load on its own.
    Auto,
    /// Tariff-driven optimisation by the vendor cloud.
    Ai,
    /// Scheduled charge/discharge windows programmed per period.
    Manual,
    /// Direct setpoint control with a countdown, for external controllers.
    Passive,
    /// Backup power mode. Not in the published API, but firmware accepts it.
    Ups,
}

impl OperatingMode {
    /// Returns all operating modes for iteration.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Auto, Self::Ai, Self::Manual, Self::Passive, Self::Ups]
    }

    /// Returns the mode name used on the wire.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Ai => "AI",
            Self::Manual => "Manual",
            Self::Passive => "Passive",
            Self::Ups => "UPS",
        }
    }

    /// Returns the selector level for host automation systems.
    ///
    /// Levels follow the vendor app ordering: Auto = 10, AI = 20,
    /// Manual = 30, Passive = 40. UPS has no selector level.
    #[must_use]
    pub const fn selector_level(&self) -> Option<u8> {
        match self {
            Self::Auto => Some(10),
            Self::Ai => Some(20),
            Self::Manual => Some(30),
            Self::Passive => Some(40),
            Self::Ups => None,
        }
    }

    /// Looks up the mode for a selector level.
    #[must_use]
    pub const fn from_selector_level(level: u8) -> Option<Self> {
        match level {
            10 => Some(Self::Auto),
            20 => Some(Self::Ai),
            30 => Some(Self::Manual),
            40 => Some(Self::Passive),
            _ => None,
        }
    }

    /// Parses a mode name as reported by the device.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.wire_name() == name)
    }
}

impl FromStr for OperatingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| ValidationError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// =============================================================================
// ManualModeConfig
// =============================================================================

/// Configuration for one manual mode schedule slot.
///
/// Positive power charges the battery, negative power discharges it. The
/// period index, time window and weekday set are validated at construction
/// of their types; the window ordering and the power setpoint are validated
/// against the device limits by [`validate`](Self::validate) before anything
/// is sent.
///
/// # Examples
///
/// ```
/// use venusr_lib::types::{
///     ManualModeConfig, PeriodIndex, PowerLimits, ScheduleTime, Weekdays,
/// };
///
/// let config = ManualModeConfig::new(
///     PeriodIndex::new(9).unwrap(),
///     "06:00".parse().unwrap(),
///     "22:00".parse().unwrap(),
///     "0111110".parse().unwrap(),
///     -800,
/// );
///
/// let limits = PowerLimits::new(2500);
/// assert!(config.validate(&limits).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualModeConfig {
    period: PeriodIndex,
    start: ScheduleTime,
    end: ScheduleTime,
    weekdays: Weekdays,
    power_w: i32,
    enabled: bool,
}

impl ManualModeConfig {
    /// Creates a new manual mode configuration with the slot enabled.
    #[must_use]
    pub const fn new(
        period: PeriodIndex,
        start: ScheduleTime,
        end: ScheduleTime,
        weekdays: Weekdays,
        power_w: i32,
    ) -> Self {
        Self {
            period,
            start,
            end,
            weekdays,
            power_w,
            enabled: true,
        }
    }

    /// Sets whether the schedule slot is enabled.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the schedule slot index.
    #[must_use]
    pub const fn period(&self) -> PeriodIndex {
        self.period
    }

    /// Returns the start of the daily window.
    #[must_use]
    pub const fn start(&self) -> ScheduleTime {
        self.start
    }

    /// Returns the end of the daily window.
    #[must_use]
    pub const fn end(&self) -> ScheduleTime {
        self.end
    }

    /// Returns the weekdays the slot applies to.
    #[must_use]
    pub const fn weekdays(&self) -> Weekdays {
        self.weekdays
    }

    /// Returns the power setpoint in watts.
    #[must_use]
    pub const fn power_w(&self) -> i32 {
        self.power_w
    }

    /// Returns whether the slot is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validates the window ordering and the power setpoint.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyScheduleWindow` if the window does not
    /// start strictly before it ends, or `ValidationError::PowerOutOfRange`
    /// if the setpoint exceeds the device limits.
    pub fn validate(&self, limits: &PowerLimits) -> Result<(), ValidationError> {
        if self.start >= self.end {
            return Err(ValidationError::EmptyScheduleWindow {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        limits.validate_setpoint(self.power_w)
    }
}

// =============================================================================
// PassiveModeConfig
// =============================================================================

/// Countdown applied when none is given explicitly.
const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(300);

/// Configuration for passive mode.
///
/// Passive mode hands setpoint control to an external controller: the device
/// holds `power_w` until the countdown elapses, then falls back to its
/// previous behaviour. Positive power charges, negative power discharges.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use venusr_lib::types::PassiveModeConfig;
///
/// let config = PassiveModeConfig::new(-400);
/// assert_eq!(config.countdown(), Duration::from_secs(300));
///
/// let short = PassiveModeConfig::new(-400).with_countdown(Duration::from_secs(60));
/// assert_eq!(short.countdown(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveModeConfig {
    power_w: i32,
    countdown: Duration,
}

impl PassiveModeConfig {
    /// Creates a new passive mode configuration with the default
    /// 300 second countdown.
    #[must_use]
    pub const fn new(power_w: i32) -> Self {
        Self {
            power_w,
            countdown: DEFAULT_COUNTDOWN,
        }
    }

    /// Sets the countdown after which the device leaves the setpoint.
    ///
    /// The device works in whole seconds; sub-second precision is truncated.
    #[must_use]
    pub const fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = countdown;
        self
    }

    /// Returns the power setpoint in watts.
    #[must_use]
    pub const fn power_w(&self) -> i32 {
        self.power_w
    }

    /// Returns the countdown duration.
    #[must_use]
    pub const fn countdown(&self) -> Duration {
        self.countdown
    }

    /// Validates the power setpoint.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::PowerOutOfRange` if the setpoint exceeds
    /// the device limits.
    pub fn validate(&self, limits: &PowerLimits) -> Result<(), ValidationError> {
        limits.validate_setpoint(self.power_w)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PowerLimits {
        PowerLimits::new(2500)
    }

    fn schedule(start: &str, end: &str, power: i32) -> ManualModeConfig {
        ManualModeConfig::new(
            PeriodIndex::new(0).unwrap(),
            start.parse().unwrap(),
            end.parse().unwrap(),
            Weekdays::all(),
            power,
        )
    }

    // -------------------------------------------------------------------------
    // OperatingMode Tests
    // -------------------------------------------------------------------------

    #[test]
    fn mode_wire_names() {
        assert_eq!(OperatingMode::Auto.wire_name(), "Auto");
        assert_eq!(OperatingMode::Ai.wire_name(), "AI");
        assert_eq!(OperatingMode::Manual.wire_name(), "Manual");
        assert_eq!(OperatingMode::Passive.wire_name(), "Passive");
        assert_eq!(OperatingMode::Ups.wire_name(), "UPS");
    }

    #[test]
    fn mode_selector_levels() {
        assert_eq!(OperatingMode::Auto.selector_level(), Some(10));
        assert_eq!(OperatingMode::Ai.selector_level(), Some(20));
        assert_eq!(OperatingMode::Manual.selector_level(), Some(30));
        assert_eq!(OperatingMode::Passive.selector_level(), Some(40));
        assert_eq!(OperatingMode::Ups.selector_level(), None);
    }

    #[test]
    fn mode_selector_level_round_trip() {
        for mode in OperatingMode::all() {
            if let Some(level) = mode.selector_level() {
                assert_eq!(OperatingMode::from_selector_level(level), Some(*mode));
            }
        }
        assert_eq!(OperatingMode::from_selector_level(50), None);
    }

    #[test]
    fn mode_wire_round_trip() {
        for mode in OperatingMode::all() {
            assert_eq!(OperatingMode::from_wire(mode.wire_name()), Some(*mode));
        }
    }

    #[test]
    fn mode_from_str_rejects_unknown() {
        let err = "Eco".parse::<OperatingMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown operating mode: Eco");
    }

    #[test]
    fn mode_display_matches_wire_name() {
        assert_eq!(OperatingMode::Passive.to_string(), "Passive");
    }

    // -------------------------------------------------------------------------
    // ManualModeConfig Tests
    // -------------------------------------------------------------------------

    #[test]
    fn manual_config_accessors() {
        let config = schedule("06:00", "22:00", -800).with_enabled(false);
        assert_eq!(config.period().value(), 0);
        assert_eq!(config.start().to_string(), "06:00");
        assert_eq!(config.end().to_string(), "22:00");
        assert_eq!(config.weekdays(), Weekdays::all());
        assert_eq!(config.power_w(), -800);
        assert!(!config.is_enabled());
    }

    #[test]
    fn manual_config_enabled_by_default() {
        assert!(schedule("06:00", "22:00", 0).is_enabled());
    }

    #[test]
    fn manual_config_valid() {
        assert!(schedule("06:00", "22:00", -800).validate(&limits()).is_ok());
    }

    #[test]
    fn manual_config_rejects_inverted_window() {
        let err = schedule("22:00", "06:00", -800)
            .validate(&limits())
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyScheduleWindow { .. }));
    }

    #[test]
    fn manual_config_rejects_zero_length_window() {
        let err = schedule("12:00", "12:00", -800)
            .validate(&limits())
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyScheduleWindow { .. }));
    }

    #[test]
    fn manual_config_rejects_excessive_discharge() {
        let err = schedule("06:00", "22:00", -2501)
            .validate(&limits())
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::PowerOutOfRange {
                min: -2500,
                max: 1200,
                actual: -2501
            }
        ));
    }

    #[test]
    fn manual_config_rejects_excessive_charge() {
        let err = schedule("06:00", "22:00", 1201)
            .validate(&limits())
            .unwrap_err();
        assert!(matches!(err, ValidationError::PowerOutOfRange { .. }));
    }

    #[test]
    fn manual_config_accepts_boundary_setpoints() {
        assert!(schedule("06:00", "22:00", 1200).validate(&limits()).is_ok());
        assert!(
            schedule("06:00", "22:00", -2500)
                .validate(&limits())
                .is_ok()
        );
    }

    // -------------------------------------------------------------------------
    // PassiveModeConfig Tests
    // -------------------------------------------------------------------------

    #[test]
    fn passive_config_default_countdown() {
        let config = PassiveModeConfig::new(-400);
        assert_eq!(config.power_w(), -400);
        assert_eq!(config.countdown(), Duration::from_secs(300));
    }

    #[test]
    fn passive_config_custom_countdown() {
        let config = PassiveModeConfig::new(200).with_countdown(Duration::from_secs(60));
        assert_eq!(config.countdown(), Duration::from_secs(60));
    }

    #[test]
    fn passive_config_validates_power_only() {
        assert!(PassiveModeConfig::new(1200).validate(&limits()).is_ok());
        assert!(PassiveModeConfig::new(1300).validate(&limits()).is_err());
        assert!(PassiveModeConfig::new(-2501).validate(&limits()).is_err());
    }
}
