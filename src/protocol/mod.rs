// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementation for communicating with Venus devices.
//!
//! Venus devices speak a JSON-RPC dialect over UDP: one request datagram,
//! one reply datagram. This module provides the wire envelope types, the
//! [`Transport`] trait the rest of the library is generic over, and the
//! [`UdpClient`] implementation with its retry handling.

mod udp;

pub use udp::{UdpClient, UdpConfig};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::Command;
use crate::error::TransportError;

/// A request envelope as sent to the device.
///
/// Request ids are assigned by the transport and only serve to correlate
/// log lines; replies are matched by arrival, not by id.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    id: u64,
    method: String,
    params: Value,
}

impl Request {
    /// Creates a new request envelope.
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    /// Returns the request id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the method parameters.
    #[must_use]
    pub const fn params(&self) -> &Value {
        &self.params
    }
}

/// A reply envelope as received from the device.
///
/// A reply carries either a `result` or an `error` member. Firmware has been
/// observed to omit both; [`into_result`](Self::into_result) maps that case
/// to [`Value::Null`] so callers can treat it as a malformed payload rather
/// than a transport failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl ResponseEnvelope {
    /// Returns the reply id, if the device echoed one.
    #[must_use]
    pub const fn id(&self) -> Option<u64> {
        self.id
    }

    /// Returns whether the reply carries an error object.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Splits the envelope into its outcome.
    ///
    /// # Errors
    ///
    /// Returns the device's [`ErrorObject`] if the reply carries an error
    /// member. An error reply is a definitive verdict and is never retried.
    pub fn into_result(self) -> Result<Value, ErrorObject> {
        if let Some(error) = self.error {
            return Err(ErrorObject::from_value(&error));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// An error object reported by the device.
///
/// The published API documents `{code, message}` objects, but firmware is
/// not strict about the shape, so both members are extracted leniently and
/// anything unstructured is kept as the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorObject {
    code: Option<i64>,
    message: String,
}

impl ErrorObject {
    /// Extracts an error object from the raw `error` member.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let code = value.get("code").and_then(Value::as_i64);
        let message = match (value.get("message").and_then(Value::as_str), value) {
            (Some(message), _) => message.to_string(),
            (None, Value::String(text)) => text.clone(),
            (None, other) => other.to_string(),
        };
        Self { code, message }
    }

    /// Returns the numeric error code, if the device sent one.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        self.code
    }

    /// Returns the error message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Trait for transport implementations that can call methods on Venus devices.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Calls a method with explicit parameters and returns the `result`
    /// member of the reply.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the device reports an error, no reply
    /// arrives, or the socket fails.
    async fn call_raw(&self, method: &str, params: Value) -> Result<Value, TransportError>;

    /// Sends a typed command and returns the `result` member of the reply.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the device reports an error, no reply
    /// arrives, or the socket fails.
    async fn call<C: Command + Sync>(&self, command: &C) -> Result<Value, TransportError> {
        self.call_raw(command.method(), command.params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_envelope_shape() {
        let request = Request::new(7, "Bat.GetStatus", json!({"id": 0}));
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({"id": 7, "method": "Bat.GetStatus", "params": {"id": 0}})
        );
    }

    #[test]
    fn envelope_with_result() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"id":1,"result":{"soc":98}}"#).unwrap();
        assert_eq!(envelope.id(), Some(1));
        assert!(!envelope.is_error());
        assert_eq!(envelope.into_result().unwrap(), json!({"soc": 98}));
    }

    #[test]
    fn envelope_with_error_is_terminal() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"id":1,"error":{"code":-32601,"message":"method not found"}}"#)
                .unwrap();
        assert!(envelope.is_error());
        let error = envelope.into_result().unwrap_err();
        assert_eq!(error.code(), Some(-32601));
        assert_eq!(error.message(), "method not found");
    }

    #[test]
    fn envelope_without_result_or_error_yields_null() {
        let envelope: ResponseEnvelope = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert_eq!(envelope.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn error_object_from_plain_string() {
        let error = ErrorObject::from_value(&json!("busy"));
        assert_eq!(error.code(), None);
        assert_eq!(error.message(), "busy");
        assert_eq!(error.to_string(), "busy");
    }

    #[test]
    fn error_object_display_with_code() {
        let error = ErrorObject::from_value(&json!({"code": 3, "message": "bad params"}));
        assert_eq!(error.to_string(), "code 3: bad params");
    }

    #[test]
    fn error_object_from_object_without_message() {
        let error = ErrorObject::from_value(&json!({"code": 9}));
        assert_eq!(error.code(), Some(9));
        // Falls back to the raw JSON text
        assert_eq!(error.message(), r#"{"code":9}"#);
    }
}
