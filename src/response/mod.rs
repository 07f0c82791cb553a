// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed parsing of Venus JSON replies.
//!
//! Each structure corresponds to the `result` object of one status or
//! info command. Every field is optional so a reply from an older or newer
//! firmware revision still parses; unknown keys are ignored.

mod info;
mod mode;
mod status;

pub use info::{BleStatus, DeviceInfo, WifiStatus};
pub use mode::{EsMode, SetModeResult};
pub use status::{BatteryStatus, EmStatus, EsStatus, PvStatus};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a flag that firmware reports either as a boolean or as a
/// 0/1 number. Values of any other type become `None`.
pub(crate) fn truthy_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(flag) => Some(flag),
        Value::Number(n) => n.as_f64().map(|x| x.abs() > f64::EPSILON),
        _ => None,
    }))
}
