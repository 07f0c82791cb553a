// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for UDP devices.

use crate::device::VenusDevice;
use crate::error::{DeviceError, Error, TransportError};
use crate::protocol::{UdpClient, UdpConfig};
use crate::telemetry::FieldRegistry;
use crate::types::PowerLimits;

/// Builder for [`VenusDevice`] instances over UDP.
///
/// Created via [`VenusDevice::udp`] or [`VenusDevice::udp_config`]. The
/// maximum output power is required: it differs per Venus variant and bounds
/// every discharge setpoint, so there is no safe default to assume.
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
#[derive(Debug)]
pub struct VenusDeviceBuilder {
    config: UdpConfig,
    limits: Option<PowerLimits>,
    registry: Option<FieldRegistry>,
}

impl VenusDeviceBuilder {
    /// Creates a new builder with the specified transport configuration.
    pub(crate) fn new(config: UdpConfig) -> Self {
        Self {
            config,
            limits: None,
            registry: None,
        }
    }

    /// Sets the maximum output power of the installed device in watts.
    ///
    /// This is the variant's rated output (800 W for a Venus C, 2500 W for
    /// a Venus E) and becomes the discharge bound for mode setpoints.
    #[must_use]
    pub fn with_max_output_power(mut self, watts: u16) -> Self {
        self.limits = Some(PowerLimits::new(watts));
        self
    }

    /// Replaces the default field registry.
    ///
    /// Use this to deactivate fields the deployment does not track or to
    /// supply a registry for a different firmware generation.
    #[must_use]
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn config(&self) -> &UdpConfig {
        &self.config
    }

    /// Returns the configured power limits, if set.
    #[must_use]
    pub fn power_limits(&self) -> Option<PowerLimits> {
        self.limits
    }

    /// Builds the device.
    ///
    /// No network traffic happens here; the transport binds a fresh socket
    /// per request.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidAddress` when the host is empty and
    /// `DeviceError::InvalidConfiguration` when no maximum output power was
    /// given.
    pub fn build(self) -> Result<VenusDevice<UdpClient>, Error> {
        if self.config.host().trim().is_empty() {
            return Err(Error::Transport(TransportError::InvalidAddress(
                "device host must not be empty".to_string(),
            )));
        }
        let Some(limits) = self.limits else {
            return Err(Error::Device(DeviceError::InvalidConfiguration(
                "maximum output power is required to bound mode setpoints".to_string(),
            )));
        };
        let registry = self.registry.unwrap_or_default();
        Ok(VenusDevice::new(self.config.into_client(), registry, limits))
    }
}
