// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status response parsing.
//!
//! Every field is optional: firmware revisions differ in which keys they
//! report, and a status read should not fail because one reading is
//! missing. Flags are deserialized leniently since some revisions report
//! booleans and others 0/1.

use serde::Deserialize;

use crate::response::truthy_flag;

/// Battery status from `Bat.GetStatus`.
///
/// # Examples
///
/// ```
/// use venusr_lib::response::BatteryStatus;
///
/// let json = r#"{
///     "soc": 98,
///     "charg_flag": true,
///     "dischrg_flag": true,
///     "bat_temp": 25.0,
///     "bat_capacity": 2508.0,
///     "rated_capacity": 2560.0
/// }"#;
/// let status: BatteryStatus = serde_json::from_str(json).unwrap();
/// assert_eq!(status.soc, Some(98.0));
/// assert_eq!(status.charg_flag, Some(true));
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BatteryStatus {
    /// State of charge in percent.
    pub soc: Option<f64>,

    /// Whether charging is currently permitted.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub charg_flag: Option<bool>,

    /// Whether discharging is currently permitted.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub dischrg_flag: Option<bool>,

    /// Battery temperature in °C.
    pub bat_temp: Option<f64>,

    /// Remaining capacity in Wh.
    pub bat_capacity: Option<f64>,

    /// Rated capacity in Wh.
    pub rated_capacity: Option<f64>,
}

/// Photovoltaic status from `PV.GetStatus`.
///
/// Single-input firmware reports the flat `pv_power`/`pv_voltage`/
/// `pv_current` keys; four-string firmware reports per-string keys
/// (`pv1_power` through `pv4_state`). Both shapes parse, unreported keys
/// stay `None`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PvStatus {
    /// Total PV power in W (single-input firmware).
    pub pv_power: Option<f64>,

    /// PV voltage in V (single-input firmware).
    pub pv_voltage: Option<f64>,

    /// PV current in A (single-input firmware).
    pub pv_current: Option<f64>,

    /// String 1 power in W.
    pub pv1_power: Option<f64>,
    /// String 1 voltage in V.
    pub pv1_voltage: Option<f64>,
    /// String 1 current in A.
    pub pv1_current: Option<f64>,
    /// String 1 producing state.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub pv1_state: Option<bool>,

    /// String 2 power in W.
    pub pv2_power: Option<f64>,
    /// String 2 voltage in V.
    pub pv2_voltage: Option<f64>,
    /// String 2 current in A.
    pub pv2_current: Option<f64>,
    /// String 2 producing state.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub pv2_state: Option<bool>,

    /// String 3 power in W.
    pub pv3_power: Option<f64>,
    /// String 3 voltage in V.
    pub pv3_voltage: Option<f64>,
    /// String 3 current in A.
    pub pv3_current: Option<f64>,
    /// String 3 producing state.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub pv3_state: Option<bool>,

    /// String 4 power in W.
    pub pv4_power: Option<f64>,
    /// String 4 voltage in V.
    pub pv4_voltage: Option<f64>,
    /// String 4 current in A.
    pub pv4_current: Option<f64>,
    /// String 4 producing state.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub pv4_state: Option<bool>,
}

/// Energy meter status from `EM.GetStatus`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmStatus {
    /// Whether the CT meter link is up.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub ct_state: Option<bool>,

    /// Phase A power in W.
    pub a_power: Option<f64>,

    /// Phase B power in W.
    pub b_power: Option<f64>,

    /// Phase C power in W.
    pub c_power: Option<f64>,

    /// Total power in W.
    pub total_power: Option<f64>,

    /// Total imported energy in 0.1 kWh steps, on newer firmware.
    pub input_energy: Option<f64>,

    /// Total exported energy in 0.1 kWh steps, on newer firmware.
    pub output_energy: Option<f64>,
}

/// Energy system status from `ES.GetStatus`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EsStatus {
    /// System state of charge in percent.
    pub bat_soc: Option<f64>,

    /// Total battery capacity in Wh.
    pub bat_cap: Option<f64>,

    /// PV charging power in W.
    pub pv_power: Option<f64>,

    /// On-grid port power in W.
    pub ongrid_power: Option<f64>,

    /// Off-grid port power in W.
    pub offgrid_power: Option<f64>,

    /// Battery power in W. Documented but not reported by current firmware.
    pub bat_power: Option<f64>,

    /// Total PV energy generated.
    pub total_pv_energy: Option<f64>,

    /// Total energy delivered to the grid.
    pub total_grid_output_energy: Option<f64>,

    /// Total energy drawn from the grid.
    pub total_grid_input_energy: Option<f64>,

    /// Total off-grid energy consumed.
    pub total_load_energy: Option<f64>,
}
