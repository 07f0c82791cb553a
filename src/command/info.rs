// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity and connectivity query commands.

use serde_json::{Value, json};

use crate::command::Command;

/// Command to query device identity (`Marstek.GetDevice`).
///
/// Unlike the status queries this method addresses the device by its BLE
/// MAC, which is printed on the unit and shown in the vendor app.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use venusr_lib::command::{Command, GetDeviceCommand};
///
/// let cmd = GetDeviceCommand::new("ac4d16021234");
/// assert_eq!(cmd.method(), "Marstek.GetDevice");
/// assert_eq!(cmd.params(), json!({"ble_mac": "ac4d16021234"}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeviceCommand {
    ble_mac: String,
}

impl GetDeviceCommand {
    /// Creates a new device identity query for the given BLE MAC.
    #[must_use]
    pub fn new(ble_mac: impl Into<String>) -> Self {
        Self {
            ble_mac: ble_mac.into(),
        }
    }

    /// Returns the BLE MAC being queried.
    #[must_use]
    pub fn ble_mac(&self) -> &str {
        &self.ble_mac
    }
}

impl Command for GetDeviceCommand {
    fn method(&self) -> &'static str {
        "Marstek.GetDevice"
    }

    fn params(&self) -> Value {
        json!({"ble_mac": self.ble_mac})
    }
}

/// Command to query Wi-Fi connection state (`Wifi.GetStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WifiStatusCommand;

impl WifiStatusCommand {
    /// Creates a new Wi-Fi status query.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Command for WifiStatusCommand {
    fn method(&self) -> &'static str {
        "Wifi.GetStatus"
    }
}

/// Command to query Bluetooth state (`BLE.GetStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BleStatusCommand;

impl BleStatusCommand {
    /// Creates a new Bluetooth status query.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Command for BleStatusCommand {
    fn method(&self) -> &'static str {
        "BLE.GetStatus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_device_addresses_by_ble_mac() {
        let cmd = GetDeviceCommand::new("ac4d16021234");
        assert_eq!(cmd.method(), "Marstek.GetDevice");
        assert_eq!(cmd.ble_mac(), "ac4d16021234");
        // No placeholder id in this params shape
        assert_eq!(cmd.params(), json!({"ble_mac": "ac4d16021234"}));
    }

    #[test]
    fn connectivity_queries_use_placeholder_params() {
        assert_eq!(WifiStatusCommand::new().method(), "Wifi.GetStatus");
        assert_eq!(WifiStatusCommand::new().params(), json!({"id": 0}));
        assert_eq!(BleStatusCommand::new().method(), "BLE.GetStatus");
        assert_eq!(BleStatusCommand::new().params(), json!({"id": 0}));
    }
}
