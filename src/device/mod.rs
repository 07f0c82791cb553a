// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level facade for a Venus battery.
//!
//! [`VenusDevice`] ties the transport, the field registry and the field
//! store together: typed status getters for one-shot reads, resolved group
//! fetches for polling, and validated mode changes.
//!
//! # Examples
//!
//! ```no_run
//! use venusr_lib::VenusDevice;
//!
//! # async fn example() -> venusr_lib::Result<()> {
//! let device = VenusDevice::udp("192.168.1.11")
//!     .with_max_output_power(800)
//!     .build()?;
//!
//! let battery = device.get_battery_status().await?;
//! println!("State of charge: {:?} %", battery.soc);
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::VenusDeviceBuilder;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::command::{
    BleStatusCommand, GetDeviceCommand, SetModeCommand, StatusCommand, StatusGroup,
    WifiStatusCommand,
};
use crate::error::{DeviceError, Error, ParseError};
use crate::protocol::{Transport, UdpClient, UdpConfig};
use crate::response::{
    BatteryStatus, BleStatus, DeviceInfo, EmStatus, EsMode, EsStatus, PvStatus, SetModeResult,
    WifiStatus,
};
use crate::telemetry::{FieldRegistry, FieldResolver, FieldStore, ResolvedBatch};
use crate::types::{ManualModeConfig, OperatingMode, PassiveModeConfig, PowerLimits};

/// A Marstek Venus battery reached over a [`Transport`].
///
/// # Type Parameter
///
/// The type parameter `T` is the transport implementation; production code
/// uses [`UdpClient`], tests can substitute a scripted transport.
///
/// # Creating a Device
///
/// Use [`VenusDevice::udp`] or [`VenusDevice::udp_config`] to create a
/// builder:
///
/// ```no_run
/// use venusr_lib::VenusDevice;
/// use venusr_lib::protocol::UdpConfig;
///
/// # fn example() -> venusr_lib::Result<()> {
/// let device = VenusDevice::udp("192.168.1.11")
///     .with_max_output_power(800)
///     .build()?;
///
/// let config = UdpConfig::new("192.168.1.11").with_port(30000);
/// let device = VenusDevice::udp_config(config)
///     .with_max_output_power(2500)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VenusDevice<T: Transport> {
    transport: T,
    registry: FieldRegistry,
    store: FieldStore,
    limits: PowerLimits,
}

impl<T: Transport> VenusDevice<T> {
    /// Creates a device over an already-configured transport.
    pub(crate) fn new(transport: T, registry: FieldRegistry, limits: PowerLimits) -> Self {
        Self {
            transport,
            registry,
            store: FieldStore::new(),
            limits,
        }
    }

    // ========== Accessors ==========

    /// Returns the transport, for tests that script it.
    #[cfg(test)]
    pub(crate) const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the canonical field store fed by polling and write-backs.
    #[must_use]
    pub fn field_store(&self) -> &FieldStore {
        &self.store
    }

    /// Returns the field registry the device resolves against.
    #[must_use]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Returns the configured power limits.
    #[must_use]
    pub fn power_limits(&self) -> PowerLimits {
        self.limits
    }

    // ========== Identity & Connectivity ==========

    /// Queries device identity (`Marstek.GetDevice`).
    ///
    /// The device only answers when addressed by its BLE MAC, given
    /// without separators.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_device_info(&self, ble_mac: impl Into<String>) -> Result<DeviceInfo, Error> {
        let command = GetDeviceCommand::new(ble_mac);
        let payload = self.transport.call(&command).await?;
        Self::parse_reply(payload)
    }

    /// Queries Wi-Fi station status (`Wifi.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_wifi_status(&self) -> Result<WifiStatus, Error> {
        let payload = self.transport.call(&WifiStatusCommand).await?;
        Self::parse_reply(payload)
    }

    /// Queries Bluetooth status (`BLE.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_ble_status(&self) -> Result<BleStatus, Error> {
        let payload = self.transport.call(&BleStatusCommand).await?;
        Self::parse_reply(payload)
    }

    // ========== Status Reads ==========

    /// Reads battery status (`Bat.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_battery_status(&self) -> Result<BatteryStatus, Error> {
        let payload = self.transport.call(&StatusCommand::battery()).await?;
        Self::parse_reply(payload)
    }

    /// Reads photovoltaic status (`PV.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_pv_status(&self) -> Result<PvStatus, Error> {
        let payload = self.transport.call(&StatusCommand::photovoltaic()).await?;
        Self::parse_reply(payload)
    }

    /// Reads energy meter status (`EM.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_energy_meter_status(&self) -> Result<EmStatus, Error> {
        let payload = self.transport.call(&StatusCommand::energy_meter()).await?;
        Self::parse_reply(payload)
    }

    /// Reads energy system status (`ES.GetStatus`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply cannot be
    /// parsed.
    pub async fn get_energy_system_status(&self) -> Result<EsStatus, Error> {
        let payload = self.transport.call(&StatusCommand::energy_system()).await?;
        Self::parse_reply(payload)
    }

    /// Reads the current operating mode (`ES.GetMode`).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the reply cannot be
    /// parsed, or the reported mode name is unknown.
    pub async fn get_operating_mode(&self) -> Result<OperatingMode, Error> {
        let payload = self.transport.call(&StatusCommand::mode()).await?;
        let report: EsMode = Self::parse_reply(payload)?;
        report.operating_mode().map_err(Error::Parse)
    }

    // ========== Polling ==========

    /// Fetches one status group, resolves it and applies it to the store.
    ///
    /// This is the per-group step of a poll cycle; unknown keys in the
    /// payload end up in the returned batch without failing the fetch.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the request fails after retries and
    /// a parse error when the reply is empty or not a JSON object.
    pub async fn fetch_group(&self, group: StatusGroup) -> Result<ResolvedBatch, Error> {
        let payload = self.transport.call(&StatusCommand::new(group)).await?;
        match &payload {
            Value::Null => Err(Error::Parse(ParseError::EmptyReply)),
            Value::Object(_) => {
                let batch = FieldResolver::new(&self.registry).resolve(group.source(), &payload);
                self.store.apply(&batch);
                Ok(batch)
            }
            other => Err(Error::Parse(ParseError::UnexpectedFormat(format!(
                "status payload is not an object: {other}"
            )))),
        }
    }

    // ========== Mode Control ==========

    /// Switches to self-consumption (auto) mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the device rejects the
    /// change.
    pub async fn set_auto_mode(&self) -> Result<(), Error> {
        self.dispatch_mode(&SetModeCommand::auto()).await
    }

    /// Switches to AI optimisation mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the device rejects the
    /// change.
    pub async fn set_ai_mode(&self) -> Result<(), Error> {
        self.dispatch_mode(&SetModeCommand::ai()).await
    }

    /// Programs one manual mode schedule slot.
    ///
    /// The configuration is validated against the device's power limits
    /// before anything is sent; on success the applied schedule is staged
    /// into the field store.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything when the
    /// configuration violates an invariant, and a transport or device
    /// error when the dispatch fails.
    pub async fn set_manual_mode(&self, config: &ManualModeConfig) -> Result<(), Error> {
        config.validate(&self.limits)?;
        self.dispatch_mode(&SetModeCommand::manual(config)).await?;
        self.stage_manual_intent(config);
        Ok(())
    }

    /// Switches to passive mode with a direct power setpoint.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything when the
    /// setpoint is out of bounds, and a transport or device error when
    /// the dispatch fails.
    pub async fn set_passive_mode(&self, config: &PassiveModeConfig) -> Result<(), Error> {
        config.validate(&self.limits)?;
        self.dispatch_mode(&SetModeCommand::passive(config)).await?;
        self.stage_passive_intent(config);
        Ok(())
    }

    /// Switches to UPS (backup power) mode.
    ///
    /// UPS has no selector level, so no selector write-back happens.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything when the
    /// setpoint is out of bounds, and a transport or device error when
    /// the dispatch fails.
    pub async fn set_ups_mode(&self, power_w: i32) -> Result<(), Error> {
        self.limits.validate_setpoint(power_w)?;
        self.dispatch_mode(&SetModeCommand::ups(power_w)).await
    }

    // ========== Helpers ==========

    /// Sends a mode change and checks the device's acknowledgement.
    ///
    /// The only side effect of success is the selector write-back; the
    /// device is not re-read to confirm convergence.
    async fn dispatch_mode(&self, command: &SetModeCommand) -> Result<(), Error> {
        let payload = self.transport.call(command).await?;
        let result: SetModeResult = Self::parse_reply(payload)?;
        match result.set_result {
            Some(true) => {
                info!(mode = %command.mode(), "Operating mode changed");
                self.write_back_selector(command.mode());
                Ok(())
            }
            Some(false) => Err(Error::Device(DeviceError::CommandRejected(format!(
                "device refused to switch to {} mode",
                command.mode()
            )))),
            None => Err(Error::Parse(ParseError::MissingField(
                "set_result".to_string(),
            ))),
        }
    }

    fn write_back_selector(&self, mode: OperatingMode) {
        if let Some(level) = mode.selector_level() {
            self.stage_field("mode_select", f64::from(level), level.to_string());
        }
    }

    fn stage_manual_intent(&self, config: &ManualModeConfig) {
        self.stage_field("time_period", 0.0, config.period().value().to_string());
        self.stage_field("start_time", 0.0, config.start().to_string());
        self.stage_field("end_time", 0.0, config.end().to_string());
        self.stage_field("week_set", 0.0, config.weekdays().pattern());
        let power = f64::from(config.power_w());
        self.stage_field("mm_power", power, format!("{power:.0}"));
    }

    fn stage_passive_intent(&self, config: &PassiveModeConfig) {
        let power = f64::from(config.power_w());
        self.stage_field("pm_power", power, format!("{power:.0}"));
        self.stage_field("countdown", 0.0, config.countdown().as_secs().to_string());
    }

    fn stage_field(&self, key: &str, numeric: f64, text: String) {
        if let Some(descriptor) = self.registry.by_key(key).filter(|d| d.is_active()) {
            self.store.stage(descriptor, numeric, text);
        }
    }

    fn parse_reply<R: DeserializeOwned>(payload: Value) -> Result<R, Error> {
        if payload.is_null() {
            return Err(Error::Parse(ParseError::EmptyReply));
        }
        Ok(serde_json::from_value(payload).map_err(ParseError::Json)?)
    }
}

// ========== UDP Device Entry Points ==========

impl VenusDevice<UdpClient> {
    /// Creates a builder for a device reached over UDP from a host string.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use venusr_lib::VenusDevice;
    ///
    /// # fn example() -> venusr_lib::Result<()> {
    /// let device = VenusDevice::udp("192.168.1.11")
    ///     .with_max_output_power(800)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn udp(host: impl Into<String>) -> VenusDeviceBuilder {
        VenusDeviceBuilder::new(UdpConfig::new(host))
    }

    /// Creates a builder from a fully specified [`UdpConfig`].
    ///
    /// Use this to override port, timeout or retry behaviour.
    #[must_use]
    pub fn udp_config(config: UdpConfig) -> VenusDeviceBuilder {
        VenusDeviceBuilder::new(config)
    }
}
