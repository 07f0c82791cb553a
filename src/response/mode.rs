// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode response parsing.

use serde::Deserialize;

use crate::error::ParseError;
use crate::response::truthy_flag;
use crate::types::OperatingMode;

/// Operating mode report from `ES.GetMode`.
///
/// Besides the mode name the device echoes a few readings that are also
/// reported by `ES.GetStatus`, and in Auto and AI modes it appends the
/// energy meter readings it is regulating against.
///
/// # Examples
///
/// ```
/// use venusr_lib::response::EsMode;
/// use venusr_lib::types::OperatingMode;
///
/// let json = r#"{"mode": "Passive", "ongrid_power": 100, "bat_soc": 98}"#;
/// let report: EsMode = serde_json::from_str(json).unwrap();
/// assert_eq!(report.operating_mode().unwrap(), OperatingMode::Passive);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EsMode {
    /// Mode name as reported on the wire.
    pub mode: Option<String>,

    /// On-grid port power echo in W.
    pub ongrid_power: Option<f64>,

    /// Off-grid port power echo in W.
    pub offgrid_power: Option<f64>,

    /// State of charge echo in percent.
    pub bat_soc: Option<f64>,

    /// CT meter link state, echoed in Auto and AI modes.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub ct_state: Option<bool>,

    /// Phase A meter power in W, echoed in Auto and AI modes.
    pub a_power: Option<f64>,

    /// Phase B meter power in W, echoed in Auto and AI modes.
    pub b_power: Option<f64>,

    /// Phase C meter power in W, echoed in Auto and AI modes.
    pub c_power: Option<f64>,

    /// Total meter power in W, echoed in Auto and AI modes.
    pub total_power: Option<f64>,
}

impl EsMode {
    /// Parses the reported mode name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] when the reply carried no mode
    /// and [`ParseError::UnexpectedFormat`] when the name is not a known
    /// operating mode.
    pub fn operating_mode(&self) -> Result<OperatingMode, ParseError> {
        let text = self
            .mode
            .as_deref()
            .ok_or_else(|| ParseError::MissingField("mode".to_string()))?;
        OperatingMode::from_wire(text)
            .ok_or_else(|| ParseError::UnexpectedFormat(format!("unknown operating mode: {text}")))
    }
}

/// Acknowledgement of an `ES.SetMode` command.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SetModeResult {
    /// Whether the device accepted the mode change.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub set_result: Option<bool>,
}
