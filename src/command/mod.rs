// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Venus command definitions.
//!
//! This module provides typed representations of the JSON-RPC methods a
//! Venus device understands.
//!
//! # Available Commands
//!
//! | Command Type | Method | Purpose |
//! |-------------|--------|---------|
//! | [`StatusCommand`] | `Bat.GetStatus`, `PV.GetStatus`, `EM.GetStatus`, `ES.GetStatus`, `ES.GetMode` | Query one status group |
//! | [`SetModeCommand`] | `ES.SetMode` | Change the operating mode |
//! | [`GetDeviceCommand`] | `Marstek.GetDevice` | Query device identity |
//! | [`WifiStatusCommand`] | `Wifi.GetStatus` | Query Wi-Fi connection state |
//! | [`BleStatusCommand`] | `BLE.GetStatus` | Query Bluetooth state |
//!
//! # Command Structure
//!
//! Each command consists of:
//! - A method name (e.g., `"Bat.GetStatus"`, `"ES.SetMode"`)
//! - A params object; most queries send the placeholder `{"id": 0}`
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use venusr_lib::command::{Command, StatusCommand};
//!
//! let cmd = StatusCommand::battery();
//! assert_eq!(cmd.method(), "Bat.GetStatus");
//! assert_eq!(cmd.params(), json!({"id": 0}));
//! ```

mod info;
mod mode;
mod status;

pub use info::{BleStatusCommand, GetDeviceCommand, WifiStatusCommand};
pub use mode::SetModeCommand;
pub use status::{StatusCommand, StatusGroup};

use serde_json::{Value, json};

/// A command that can be sent to a Venus device.
///
/// Commands are serialized into the JSON-RPC request envelope by the
/// transport.
pub trait Command {
    /// Returns the JSON-RPC method name.
    ///
    /// For example, `"Bat.GetStatus"` or `"ES.SetMode"`.
    fn method(&self) -> &'static str;

    /// Returns the method parameters.
    ///
    /// Most query methods take the placeholder object `{"id": 0}`, which is
    /// the default.
    fn params(&self) -> Value {
        json!({"id": 0})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_is_placeholder_object() {
        struct Probe;
        impl Command for Probe {
            fn method(&self) -> &'static str {
                "Probe.GetStatus"
            }
        }

        assert_eq!(Probe.params(), json!({"id": 0}));
    }
}
