// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode change command.
//!
//! All mode changes go through the single `ES.SetMode` method; the `config`
//! object carries the mode name plus exactly one mode-specific block.

use serde_json::{Value, json};

use crate::command::Command;
use crate::types::{ManualModeConfig, OperatingMode, PassiveModeConfig};

/// Command to change the operating mode (`ES.SetMode`).
///
/// Constructors build the exact `config` payload for each mode. Validation
/// of setpoints against device limits happens in
/// [`VenusDevice`](crate::VenusDevice) before the command is constructed;
/// this type only shapes the wire payload.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use venusr_lib::command::{Command, SetModeCommand};
///
/// let cmd = SetModeCommand::auto();
/// assert_eq!(cmd.method(), "ES.SetMode");
/// assert_eq!(
///     cmd.params(),
///     json!({"id": 0, "config": {"mode": "Auto", "auto_cfg": {"enable": 1}}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetModeCommand {
    mode: OperatingMode,
    params: Value,
}

impl SetModeCommand {
    /// Switch to self-consumption (auto) mode.
    #[must_use]
    pub fn auto() -> Self {
        Self {
            mode: OperatingMode::Auto,
            params: json!({
                "id": 0,
                "config": {
                    "mode": OperatingMode::Auto.wire_name(),
                    "auto_cfg": {"enable": 1},
                }
            }),
        }
    }

    /// Switch to AI optimisation mode.
    #[must_use]
    pub fn ai() -> Self {
        Self {
            mode: OperatingMode::Ai,
            params: json!({
                "id": 0,
                "config": {
                    "mode": OperatingMode::Ai.wire_name(),
                    "ai_cfg": {"enable": 1},
                }
            }),
        }
    }

    /// Program one manual mode schedule slot.
    #[must_use]
    pub fn manual(config: &ManualModeConfig) -> Self {
        Self {
            mode: OperatingMode::Manual,
            params: json!({
                "id": 0,
                "config": {
                    "mode": OperatingMode::Manual.wire_name(),
                    "manual_cfg": {
                        "time_num": config.period().value(),
                        "start_time": config.start().to_string(),
                        "end_time": config.end().to_string(),
                        "week_set": config.weekdays().bits(),
                        "power": config.power_w(),
                        "enable": u8::from(config.is_enabled()),
                    }
                }
            }),
        }
    }

    /// Switch to passive mode with a direct setpoint.
    #[must_use]
    pub fn passive(config: &PassiveModeConfig) -> Self {
        Self {
            mode: OperatingMode::Passive,
            params: json!({
                "id": 0,
                "config": {
                    "mode": OperatingMode::Passive.wire_name(),
                    "passive_cfg": {
                        "power": config.power_w(),
                        "cd_time": config.countdown().as_secs(),
                    }
                }
            }),
        }
    }

    /// Switch to UPS (backup power) mode.
    #[must_use]
    pub fn ups(power_w: i32) -> Self {
        Self {
            mode: OperatingMode::Ups,
            params: json!({
                "id": 0,
                "config": {
                    "mode": OperatingMode::Ups.wire_name(),
                    "ups_cfg": {
                        "power": power_w,
                        "enable": 1,
                    }
                }
            }),
        }
    }

    /// Returns the target operating mode.
    #[must_use]
    pub const fn mode(&self) -> OperatingMode {
        self.mode
    }
}

impl Command for SetModeCommand {
    fn method(&self) -> &'static str {
        "ES.SetMode"
    }

    fn params(&self) -> Value {
        self.params.clone()
    }
}
