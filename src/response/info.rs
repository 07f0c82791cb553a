// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity and connectivity response parsing.

use serde::Deserialize;

/// Device identity from `Marstek.GetDevice`.
///
/// # Examples
///
/// ```
/// use venusr_lib::response::DeviceInfo;
///
/// let json = r#"{
///     "device": "VenusE",
///     "ver": 147,
///     "ble_mac": "123456789012",
///     "wifi_name": "MY_HOME",
///     "ip": "192.168.1.11"
/// }"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.device.as_deref(), Some("VenusE"));
/// assert_eq!(info.ver, Some(147));
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeviceInfo {
    /// Device model name.
    pub device: Option<String>,

    /// Firmware version number.
    pub ver: Option<i64>,

    /// BLE MAC address, without separators.
    pub ble_mac: Option<String>,

    /// Wi-Fi MAC address, without separators.
    pub wifi_mac: Option<String>,

    /// Name of the Wi-Fi network the device is joined to.
    pub wifi_name: Option<String>,

    /// IPv4 address on the local network.
    pub ip: Option<String>,
}

/// Wi-Fi station status from `Wifi.GetStatus`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WifiStatus {
    /// Network name.
    pub ssid: Option<String>,

    /// Signal strength in dBm.
    pub rssi: Option<i32>,

    /// Station IPv4 address.
    pub sta_ip: Option<String>,

    /// Gateway address.
    pub sta_gate: Option<String>,

    /// Subnet mask.
    pub sta_mask: Option<String>,

    /// DNS server address.
    pub sta_dns: Option<String>,

    /// Wi-Fi MAC address, reported by newer firmware.
    pub wifi_mac: Option<String>,
}

/// Bluetooth status from `BLE.GetStatus`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BleStatus {
    /// Connection state, `"connect"` or `"disconnect"`.
    pub state: Option<String>,

    /// BLE MAC address, without separators.
    pub ble_mac: Option<String>,
}

impl BleStatus {
    /// Returns whether a BLE client is connected, if the state was reported.
    #[must_use]
    pub fn is_connected(&self) -> Option<bool> {
        self.state
            .as_deref()
            .map(|state| state.eq_ignore_ascii_case("connect"))
    }
}
