// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Venus device control.
//!
//! This module provides type-safe representations of values used in Venus
//! commands. Each type ensures values are within their valid ranges at
//! construction time, preventing runtime errors.
//!
//! # Types
//!
//! - [`OperatingMode`] - The five operating modes
//! - [`ManualModeConfig`] / [`PassiveModeConfig`] - Mode configurations
//! - [`PeriodIndex`] - Manual schedule slot (0-9)
//! - [`ScheduleTime`] - Minute-resolution time of day
//! - [`Weekdays`] - Weekday set for schedule slots
//! - [`PowerLimits`] - Signed setpoint bounds for a deployment

mod mode;
mod power;
mod schedule;

pub use mode::{ManualModeConfig, OperatingMode, PassiveModeConfig};
pub use power::PowerLimits;
pub use schedule::{PeriodIndex, ScheduleTime, Weekdays};
