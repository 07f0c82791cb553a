// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field descriptor registry for the Venus status surface.
//!
//! Every value the device reports maps to exactly one canonical field
//! described here: its wire key, a stable slot number, the value kind, the
//! display scale, a human-readable label, and the command that
//! authoritatively produces it. The registry is built once (usually from
//! [`FieldRegistry::venus_defaults`]) and then shared immutably by the
//! resolver and the device facade.
//!
//! # Examples
//!
//! ```
//! use venusr_lib::telemetry::{FieldRegistry, SourceTag};
//!
//! let registry = FieldRegistry::venus_defaults();
//! let soc = registry.by_key("soc").unwrap();
//! assert_eq!(soc.slot(), 1);
//! assert_eq!(soc.source(), SourceTag::Bat);
//! assert_eq!(soc.label(), "Battery SOC");
//! ```

use std::fmt;

// ========== Source Tags ==========

/// Identifies which part of the device API produced (or consumes) a field.
///
/// Status payloads are resolved under the tag of the command that fetched
/// them; the tag drives the duplicate-key handling in the resolver. The
/// `Mm`/`Pm`/`Sm` tags mark fields that never arrive in a status payload
/// and are only written locally (mode dispatch write-backs and staged
/// schedule intent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    /// `Bat.GetStatus` payloads.
    Bat,
    /// `PV.GetStatus` payloads.
    Pv,
    /// `EM.GetStatus` payloads.
    Ems,
    /// `ES.GetMode` payloads.
    Esm,
    /// `ES.GetStatus` payloads.
    Ess,
    /// Locally staged manual-mode schedule values.
    Mm,
    /// Locally staged passive-mode values.
    Pm,
    /// The mode selector, written back after a successful mode change.
    Sm,
}

impl SourceTag {
    /// Returns the short code used in logs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bat => "BAT",
            Self::Pv => "PV",
            Self::Ems => "EMS",
            Self::Esm => "ESM",
            Self::Ess => "ESS",
            Self::Mm => "MM",
            Self::Pm => "PM",
            Self::Sm => "SM",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ========== Field Kinds ==========

/// The value kind of a canonical field, driving its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Instantaneous numeric reading (power, voltage, current, temperature).
    Gauge,
    /// State-of-charge style 0–100 reading.
    Percentage,
    /// Accumulating total (energy, capacity).
    Counter,
    /// Boolean state rendered as 0/1.
    Flag,
    /// Free-form text.
    Text,
    /// Mode selector level, written by mode dispatch rather than polling.
    Selector,
}

/// Display scale applied to numeric readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldScale {
    /// Raw wire value, rendered with no decimals.
    Unit,
    /// Wire value × 0.1, rendered with one decimal.
    Tenth,
}

impl FieldScale {
    /// Returns the multiplier applied to the raw wire value.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Unit => 1.0,
            Self::Tenth => 0.1,
        }
    }
}

// ========== Descriptors ==========

/// Describes one canonical field of the Venus status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    key: &'static str,
    slot: u8,
    kind: FieldKind,
    scale: FieldScale,
    label: &'static str,
    source: SourceTag,
    active: bool,
}

impl FieldDescriptor {
    /// Returns the canonical wire key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the stable slot number (1–50), usable as a store key.
    #[must_use]
    pub const fn slot(&self) -> u8 {
        self.slot
    }

    /// Returns the value kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the display scale.
    #[must_use]
    pub const fn scale(&self) -> FieldScale {
        self.scale
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the authoritative source of this field.
    #[must_use]
    pub const fn source(&self) -> SourceTag {
        self.source
    }

    /// Returns whether the field is resolved and stored.
    ///
    /// Inactive fields are silently skipped by the resolver.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

const fn field(
    slot: u8,
    key: &'static str,
    kind: FieldKind,
    scale: FieldScale,
    label: &'static str,
    source: SourceTag,
) -> FieldDescriptor {
    FieldDescriptor {
        key,
        slot,
        kind,
        scale,
        label,
        source,
        active: true,
    }
}

use FieldKind::{Counter, Flag, Gauge, Percentage, Selector, Text};
use FieldScale::{Tenth, Unit};

const VENUS_FIELDS: [FieldDescriptor; 50] = [
    // Bat.GetStatus
    field(1, "soc", Percentage, Unit, "Battery SOC", SourceTag::Bat),
    field(2, "charg_flag", Flag, Unit, "Charge permission", SourceTag::Bat),
    field(3, "dischrg_flag", Flag, Unit, "Discharge permission", SourceTag::Bat),
    field(4, "bat_temp", Gauge, Unit, "Battery temperature", SourceTag::Bat),
    field(5, "bat_capacity", Counter, Unit, "Remaining Capacity", SourceTag::Bat),
    field(6, "rated_capacity", Counter, Unit, "Rated Capacity", SourceTag::Bat),
    // PV.GetStatus, four strings
    field(7, "pv1_power", Gauge, Unit, "PV1 power", SourceTag::Pv),
    field(8, "pv1_voltage", Gauge, Unit, "PV1 voltage", SourceTag::Pv),
    field(9, "pv1_current", Gauge, Unit, "PV1 current", SourceTag::Pv),
    field(10, "pv1_state", Flag, Unit, "PV1 state", SourceTag::Pv),
    field(11, "pv2_power", Gauge, Unit, "PV2 power", SourceTag::Pv),
    field(12, "pv2_voltage", Gauge, Unit, "PV2 voltage", SourceTag::Pv),
    field(13, "pv2_current", Gauge, Unit, "PV2 current", SourceTag::Pv),
    field(14, "pv2_state", Flag, Unit, "PV2 state", SourceTag::Pv),
    field(15, "pv3_power", Gauge, Unit, "PV3 power", SourceTag::Pv),
    field(16, "pv3_voltage", Gauge, Unit, "PV3 voltage", SourceTag::Pv),
    field(17, "pv3_current", Gauge, Unit, "PV3 current", SourceTag::Pv),
    field(18, "pv3_state", Flag, Unit, "PV3 state", SourceTag::Pv),
    field(19, "pv4_power", Gauge, Unit, "PV4 power", SourceTag::Pv),
    field(20, "pv4_voltage", Gauge, Unit, "PV4 voltage", SourceTag::Pv),
    field(21, "pv4_current", Gauge, Unit, "PV4 current", SourceTag::Pv),
    field(22, "pv4_state", Flag, Unit, "PV4 state", SourceTag::Pv),
    // ES.GetMode
    field(23, "mode", Text, Unit, "ES mode", SourceTag::Esm),
    field(24, "ongrid_power", Gauge, Unit, "ES on-grid power", SourceTag::Esm),
    field(25, "offgrid_power", Gauge, Unit, "ES off-grid power", SourceTag::Esm),
    field(26, "bat_soc", Percentage, Unit, "ES Battery Soc", SourceTag::Esm),
    // ES.GetStatus; shared keys carry the es_ qualifier
    field(27, "es_bat_soc", Percentage, Unit, "ES Total SOC", SourceTag::Ess),
    field(28, "bat_cap", Counter, Unit, "ES Total capacity", SourceTag::Ess),
    field(29, "pv_power", Gauge, Unit, "ES PV charging power", SourceTag::Ess),
    field(30, "es_ongrid_power", Gauge, Unit, "ES on-grid power", SourceTag::Ess),
    field(31, "es_offgrid_power", Gauge, Unit, "ES off-grid power", SourceTag::Ess),
    field(32, "total_pv_energy", Counter, Unit, "ES Total PV energy generated", SourceTag::Ess),
    field(
        33,
        "total_grid_output_energy",
        Counter,
        Unit,
        "ES Total grid output energy",
        SourceTag::Ess,
    ),
    field(
        34,
        "total_grid_input_energy",
        Counter,
        Unit,
        "ES Total grid input energy",
        SourceTag::Ess,
    ),
    field(
        35,
        "total_load_energy",
        Counter,
        Unit,
        "ES Total off-grid energy consumed",
        SourceTag::Ess,
    ),
    // EM.GetStatus
    field(36, "ct_state", Flag, Unit, "P1 CT state", SourceTag::Ems),
    field(37, "a_power", Gauge, Unit, "P1 Phase A power", SourceTag::Ems),
    field(38, "b_power", Gauge, Unit, "P1 Phase B power", SourceTag::Ems),
    field(39, "c_power", Gauge, Unit, "P1 Phase C power", SourceTag::Ems),
    field(40, "total_power", Gauge, Unit, "P1 Total power", SourceTag::Ems),
    field(41, "input_energy", Counter, Tenth, "P1 Total input energy", SourceTag::Ems),
    field(42, "output_energy", Counter, Tenth, "P1 Total output energy", SourceTag::Ems),
    // Staged manual-mode schedule intent
    field(43, "time_period", Text, Unit, "Manual Mode periodnr", SourceTag::Mm),
    field(44, "start_time", Text, Unit, "Manual Mode starttime", SourceTag::Mm),
    field(45, "end_time", Text, Unit, "Manual Mode endtime", SourceTag::Mm),
    field(46, "week_set", Text, Unit, "Manual Mode weekdays", SourceTag::Mm),
    field(47, "mm_power", Gauge, Unit, "Manual Mode power", SourceTag::Mm),
    // Staged passive-mode intent
    field(48, "pm_power", Gauge, Unit, "Passive Mode power", SourceTag::Pm),
    field(49, "countdown", Text, Unit, "Passive Mode countdown s", SourceTag::Pm),
    // Mode selector, written back by mode dispatch
    field(50, "mode_select", Selector, Unit, "Select Marstek mode", SourceTag::Sm),
];

// ========== Registry ==========

/// Immutable table of canonical field descriptors.
///
/// Deactivate unused fields with [`deactivate`](Self::deactivate) before
/// handing the registry to a device; after that the registry is only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    /// Returns the full Venus field table.
    #[must_use]
    pub fn venus_defaults() -> Self {
        Self {
            fields: VENUS_FIELDS.to_vec(),
        }
    }

    /// Marks the field with the given canonical key as inactive.
    ///
    /// Returns `false` when no field carries that key.
    pub fn deactivate(&mut self, key: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(descriptor) => {
                descriptor.active = false;
                true
            }
            None => false,
        }
    }

    /// Looks up a descriptor by its canonical key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Looks up a descriptor by its slot number.
    #[must_use]
    pub fn by_slot(&self, slot: u8) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.slot == slot)
    }

    /// Iterates over all descriptors in slot order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Returns the number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the registry holds no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::venus_defaults()
    }
}
