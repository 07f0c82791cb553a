// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `VenusR` Lib - A Rust library to monitor and control Marstek Venus home
//! batteries.
//!
//! This library provides async APIs to interact with Marstek Venus energy
//! storage systems via the local-network UDP API (one JSON request per
//! datagram, one JSON reply per datagram).
//!
//! # Supported Features
//!
//! - **Status queries**: battery, photovoltaic, P1 meter, energy system and
//!   connectivity readings
//! - **Mode control**: Auto, AI, Manual, Passive and the undocumented UPS
//!   mode, with setpoints validated before anything is sent
//! - **Canonical telemetry**: raw payload keys resolved into a stable field
//!   table with per-field scaling and text rendering
//! - **Heartbeat polling**: a poll orchestrator with busy skip and heartbeat
//!   coalescing for hosts that schedule from a fixed-rate callback
//!
//! # Quick Start
//!
//! ## Reading Status
//!
//! ```no_run
//! use venusr_lib::VenusDevice;
//!
//! #[tokio::main]
//! async fn main() -> venusr_lib::Result<()> {
//!     // The output rating depends on the installed variant (800 W for a
//!     // Venus C, 2500 W for a Venus E) and bounds discharge setpoints.
//!     let device = VenusDevice::udp("192.168.1.11")
//!         .with_max_output_power(800)
//!         .build()?;
//!
//!     let battery = device.get_battery_status().await?;
//!     println!("State of charge: {:?} %", battery.soc);
//!
//!     let mode = device.get_operating_mode().await?;
//!     println!("Operating mode: {mode}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Changing the Operating Mode
//!
//! ```no_run
//! use venusr_lib::VenusDevice;
//! use venusr_lib::types::{ManualModeConfig, PeriodIndex};
//!
//! #[tokio::main]
//! async fn main() -> venusr_lib::Result<()> {
//!     let device = VenusDevice::udp("192.168.1.11")
//!         .with_max_output_power(800)
//!         .build()?;
//!
//!     // Discharge 500 W on weekdays between 08:00 and 22:00, slot 9
//!     let schedule = ManualModeConfig::new(
//!         PeriodIndex::new(9)?,
//!         "08:00".parse()?,
//!         "22:00".parse()?,
//!         "0111110".parse()?,
//!         -500,
//!     );
//!     device.set_manual_mode(&schedule).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Heartbeat Polling
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use venusr_lib::VenusDevice;
//! use venusr_lib::poll::{PollOptions, PollTick, Poller};
//!
//! #[tokio::main]
//! async fn main() -> venusr_lib::Result<()> {
//!     let device = Arc::new(
//!         VenusDevice::udp("192.168.1.11")
//!             .with_max_output_power(800)
//!             .build()?,
//!     );
//!
//!     // Poll once a minute from a 10 second heartbeat
//!     let options = PollOptions::new().with_heartbeats_per_cycle(6);
//!     let poller = Poller::new(Arc::clone(&device), options);
//!
//!     loop {
//!         if let PollTick::Completed(report) = poller.tick().await {
//!             println!("{} fields updated", report.applied_fields());
//!         }
//!         tokio::time::sleep(Duration::from_secs(10)).await;
//!     }
//! }
//! ```

pub mod command;
mod device;
pub mod error;
pub mod poll;
pub mod protocol;
pub mod response;
pub mod telemetry;
pub mod types;

pub use command::{
    BleStatusCommand, Command, GetDeviceCommand, SetModeCommand, StatusCommand, StatusGroup,
    WifiStatusCommand,
};
pub use device::{VenusDevice, VenusDeviceBuilder};
pub use error::{DeviceError, Error, ParseError, Result, TransportError, ValidationError};
pub use poll::{GroupOutcome, PollOptions, PollReport, PollTick, Poller};
pub use protocol::{ErrorObject, Transport, UdpClient, UdpConfig};
pub use response::{
    BatteryStatus, BleStatus, DeviceInfo, EmStatus, EsMode, EsStatus, PvStatus, SetModeResult,
    WifiStatus,
};
pub use telemetry::{
    FieldDescriptor, FieldKind, FieldRegistry, FieldSample, FieldScale, FieldStore, SourceTag,
};
pub use types::{
    ManualModeConfig, OperatingMode, PassiveModeConfig, PeriodIndex, PowerLimits, ScheduleTime,
    Weekdays,
};
