// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP transport implementation for Venus devices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::net::UdpSocket;

use crate::error::TransportError;
use crate::protocol::{Request, ResponseEnvelope, Transport};

/// Receive buffer size; a reply always fits in a single datagram.
const RECV_BUFFER_SIZE: usize = 65_535;

/// Process-wide request id counter. Ids start at 1 and every attempt,
/// including retries, consumes a fresh id.
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// UdpConfig - Configuration for UDP devices
// ============================================================================

/// Configuration for a UDP Venus device.
///
/// The transport is stateless - each call binds a fresh ephemeral socket,
/// sends one request datagram and waits for one reply datagram. Calls that
/// time out or fail at the socket level are retried after a fixed delay; an
/// error reply from the device is final and never retried.
///
/// # Examples
///
/// ```
/// use venusr_lib::protocol::UdpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = UdpConfig::new("192.168.1.50");
///
/// // With all options
/// let config = UdpConfig::new("192.168.1.50")
///     .with_port(30000)
///     .with_timeout(Duration::from_secs(5))
///     .with_max_retries(2)
///     .with_retry_delay(Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct UdpConfig {
    host: String,
    port: u16,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl UdpConfig {
    /// Default UDP port of the local API.
    pub const DEFAULT_PORT: u16 = 30000;
    /// Default per-attempt receive timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default number of retries after a failed attempt.
    pub const DEFAULT_MAX_RETRIES: u32 = 2;
    /// Default delay before each retry.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

    /// Creates a new UDP configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the Venus device
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the per-attempt receive timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries after a failed attempt.
    ///
    /// Zero disables retries; the request is still sent once.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before each retry.
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the per-attempt receive timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of retries after a failed attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the delay before each retry.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Creates a `UdpClient` from this configuration.
    #[must_use]
    pub fn into_client(self) -> UdpClient {
        UdpClient { config: self }
    }
}

// ============================================================================
// UdpClient - UDP transport implementation
// ============================================================================

/// UDP client for communicating with Venus devices.
///
/// # Examples
///
/// ```no_run
/// use venusr_lib::protocol::{Transport, UdpClient};
/// use serde_json::json;
///
/// # async fn example() -> venusr_lib::Result<()> {
/// let client = UdpClient::new("192.168.1.50");
/// let status = client.call_raw("Bat.GetStatus", json!({"id": 0})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UdpClient {
    config: UdpConfig,
}

impl UdpClient {
    /// Creates a new UDP client for the specified host with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        UdpConfig::new(host).into_client()
    }

    /// Returns the configuration of this client.
    #[must_use]
    pub fn config(&self) -> &UdpConfig {
        &self.config
    }

    /// Performs a single request/reply exchange on a fresh socket.
    ///
    /// The socket is dropped when this returns, so every attempt uses a new
    /// ephemeral port.
    async fn attempt(&self, request: &Request) -> Result<ResponseEnvelope, AttemptError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(AttemptError::Io)?;

        let payload = serde_json::to_vec(request).map_err(invalid_data)?;
        socket
            .send_to(&payload, (self.config.host(), self.config.port()))
            .await
            .map_err(AttemptError::Io)?;
        tracing::debug!(
            id = request.id(),
            method = %request.method(),
            host = %self.config.host(),
            port = self.config.port(),
            "Sent request datagram"
        );

        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        let received = tokio::time::timeout(self.config.timeout(), socket.recv_from(&mut buffer))
            .await
            .map_err(|_| AttemptError::Timeout)?;
        let (len, peer) = received.map_err(AttemptError::Io)?;

        let envelope: ResponseEnvelope =
            serde_json::from_slice(&buffer[..len]).map_err(invalid_data)?;
        tracing::debug!(
            id = ?envelope.id(),
            peer = %peer,
            bytes = len,
            "Received reply datagram"
        );
        Ok(envelope)
    }
}

impl Transport for UdpClient {
    async fn call_raw(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let max_retries = self.config.max_retries();
        let mut last_failure: Option<AttemptError> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                tracing::info!(
                    attempt,
                    max_retries,
                    method,
                    delay_ms = u64::try_from(self.config.retry_delay().as_millis())
                        .unwrap_or(u64::MAX),
                    "Retrying after delay"
                );
                tokio::time::sleep(self.config.retry_delay()).await;
            }

            let request = Request::new(next_request_id(), method, params.clone());
            match self.attempt(&request).await {
                Ok(envelope) => {
                    return match envelope.into_result() {
                        Ok(result) => {
                            if attempt > 0 {
                                tracing::info!(
                                    attempt = attempt + 1,
                                    method,
                                    "Request succeeded after retry"
                                );
                            }
                            Ok(result)
                        }
                        Err(error) => {
                            // A definitive verdict from the device; retrying
                            // would produce the same answer.
                            tracing::error!(method, %error, "Device reported an error");
                            Err(TransportError::Protocol(error))
                        }
                    };
                }
                Err(AttemptError::Timeout) => {
                    tracing::warn!(
                        method,
                        attempt = attempt + 1,
                        host = %self.config.host(),
                        "No reply within timeout"
                    );
                    last_failure = Some(AttemptError::Timeout);
                }
                Err(AttemptError::Io(error)) => {
                    tracing::warn!(method, attempt = attempt + 1, %error, "Attempt failed");
                    last_failure = Some(AttemptError::Io(error));
                }
            }
        }

        let attempts = max_retries + 1;
        tracing::error!(method, attempts, "Request failed on all attempts");
        match last_failure {
            Some(AttemptError::Io(source)) => {
                Err(TransportError::Communication { attempts, source })
            }
            // The loop ran at least once, so the remaining case is a timeout
            _ => Err(TransportError::Timeout {
                attempts,
                timeout_ms: u64::try_from(self.config.timeout().as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

/// Failure of a single attempt. Both variants are retryable.
#[derive(Debug)]
enum AttemptError {
    Timeout,
    Io(std::io::Error),
}

fn invalid_data(error: serde_json::Error) -> AttemptError {
    AttemptError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
}
