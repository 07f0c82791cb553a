// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status query commands.
//!
//! This module provides commands for querying the status groups a Venus
//! device reports.

use crate::command::Command;
use crate::telemetry::SourceTag;

/// Status group to query.
///
/// Each group maps to one JSON-RPC method and tags the payload with the
/// source the field resolver uses to canonicalize keys. The declaration
/// order is the order a poll cycle queries the groups in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusGroup {
    /// Battery pack state (`Bat.GetStatus`).
    Battery,
    /// Solar string measurements (`PV.GetStatus`).
    Photovoltaic,
    /// Grid-side P1 meter readings (`EM.GetStatus`).
    EnergyMeter,
    /// Aggregated energy system state (`ES.GetStatus`).
    EnergySystem,
    /// Operating mode report (`ES.GetMode`).
    Mode,
}

impl StatusGroup {
    /// Returns all status groups in poll order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Battery,
            Self::Photovoltaic,
            Self::EnergyMeter,
            Self::EnergySystem,
            Self::Mode,
        ]
    }

    /// Returns the JSON-RPC method for this group.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Battery => "Bat.GetStatus",
            Self::Photovoltaic => "PV.GetStatus",
            Self::EnergyMeter => "EM.GetStatus",
            Self::EnergySystem => "ES.GetStatus",
            Self::Mode => "ES.GetMode",
        }
    }

    /// Returns the source tag the resolver applies to this group's payload.
    #[must_use]
    pub const fn source(&self) -> SourceTag {
        match self {
            Self::Battery => SourceTag::Bat,
            Self::Photovoltaic => SourceTag::Pv,
            Self::EnergyMeter => SourceTag::Ems,
            Self::EnergySystem => SourceTag::Ess,
            Self::Mode => SourceTag::Esm,
        }
    }
}

/// Command to query one status group.
///
/// # Examples
///
/// ```
/// use venusr_lib::command::{Command, StatusCommand, StatusGroup};
///
/// let cmd = StatusCommand::energy_system();
/// assert_eq!(cmd.method(), "ES.GetStatus");
/// assert_eq!(cmd.group(), StatusGroup::EnergySystem);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCommand {
    group: StatusGroup,
}

impl StatusCommand {
    /// Creates a new status command for the specified group.
    #[must_use]
    pub const fn new(group: StatusGroup) -> Self {
        Self { group }
    }

    /// Query battery pack state.
    #[must_use]
    pub const fn battery() -> Self {
        Self::new(StatusGroup::Battery)
    }

    /// Query solar string measurements.
    #[must_use]
    pub const fn photovoltaic() -> Self {
        Self::new(StatusGroup::Photovoltaic)
    }

    /// Query grid-side P1 meter readings.
    #[must_use]
    pub const fn energy_meter() -> Self {
        Self::new(StatusGroup::EnergyMeter)
    }

    /// Query aggregated energy system state.
    #[must_use]
    pub const fn energy_system() -> Self {
        Self::new(StatusGroup::EnergySystem)
    }

    /// Query the operating mode report.
    #[must_use]
    pub const fn mode() -> Self {
        Self::new(StatusGroup::Mode)
    }

    /// Returns the group being queried.
    #[must_use]
    pub const fn group(&self) -> StatusGroup {
        self.group
    }
}

impl Command for StatusCommand {
    fn method(&self) -> &'static str {
        self.group.method()
    }
}
