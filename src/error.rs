// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `VenusR` library.
//!
//! This module provides a comprehensive error hierarchy for handling failures
//! across the library: setpoint validation, UDP transport communication, JSON
//! parsing, and device operations.

use thiserror::Error;

use crate::protocol::ErrorObject;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when interacting
/// with a Venus battery system.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during setpoint or schedule validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error occurred during transport communication.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors related to setpoint and schedule validation.
///
/// These errors occur when attempting to create constrained types with
/// invalid values, or when a mode configuration violates a device limit.
/// Validation always fails before anything is sent to the device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A schedule period index is outside the allowed range (0-9).
    #[error("schedule period {0} is out of range [0, 9]")]
    PeriodOutOfRange(u8),

    /// A time of day could not be parsed from its `HH:MM` form.
    #[error("invalid time of day {input:?}: {message}")]
    InvalidTime {
        /// The rejected input.
        input: String,
        /// Description of the violation.
        message: String,
    },

    /// A schedule window does not start strictly before it ends.
    #[error("schedule start {start} is not before end {end}")]
    EmptyScheduleWindow {
        /// Start of the window.
        start: String,
        /// End of the window.
        end: String,
    },

    /// A weekday pattern is not seven `'0'`/`'1'` characters.
    #[error("invalid weekday pattern: {0}")]
    InvalidWeekdays(String),

    /// A power setpoint is outside the device's configured limits.
    #[error("power setpoint {actual} W is out of range [{min}, {max}]")]
    PowerOutOfRange {
        /// Minimum allowed setpoint (discharge bound, negative).
        min: i32,
        /// Maximum allowed setpoint (charge bound, positive).
        max: i32,
        /// The actual setpoint that was provided.
        actual: i32,
    },

    /// An operating mode string was not recognized.
    #[error("unknown operating mode: {0}")]
    UnknownMode(String),
}

/// Errors related to UDP transport communication.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The device answered with a JSON-RPC error object.
    ///
    /// This is a definitive verdict from the device, so the request is
    /// never retried.
    #[error("device reported an error: {0}")]
    Protocol(ErrorObject),

    /// No reply arrived within the receive timeout on any attempt.
    #[error("request timed out after {attempts} attempt(s) of {timeout_ms} ms")]
    Timeout {
        /// Number of attempts made (initial send plus retries).
        attempts: u32,
        /// Per-attempt receive timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A socket operation failed on the final attempt.
    #[error("communication failed after {attempts} attempt(s): {source}")]
    Communication {
        /// Number of attempts made (initial send plus retries).
        attempts: u32,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid device host or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing Venus replies.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// The reply envelope carried neither a result nor an error object.
    #[error("reply carried neither result nor error")]
    EmptyReply,

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device acknowledged a mode change but refused to apply it.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
