// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against an in-process scripted UDP device.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::UdpSocket;

use venusr_lib::poll::{GroupOutcome, PollOptions, Poller};
use venusr_lib::protocol::Transport;
use venusr_lib::types::{ManualModeConfig, PeriodIndex};
use venusr_lib::{
    DeviceError, Error, ParseError, StatusGroup, TransportError, UdpClient, UdpConfig, VenusDevice,
};

// ============================================================================
// Scripted mock device
// ============================================================================

/// How the mock answers one incoming request.
enum Script {
    /// Reply with `{"id": <echo>, "result": <value>}`.
    Result(Value),
    /// Reply with `{"id": <echo>, "error": <value>}`.
    Error(Value),
    /// Reply with raw bytes as-is.
    Bytes(&'static [u8]),
    /// Swallow the request without answering.
    Silent,
}

/// An in-process UDP device answering from a fixed script.
///
/// Requests beyond the script are swallowed. Every received request is
/// recorded for assertions.
struct MockDevice {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockDevice {
    async fn start(script: Vec<Script>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let task = tokio::spawn(async move {
            let mut script = script.into_iter();
            let mut buffer = vec![0u8; 2048];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buffer).await else {
                    return;
                };
                let Ok(request) = serde_json::from_slice::<Value>(&buffer[..len]) else {
                    continue;
                };
                recorded.lock().push(request.clone());

                let reply = match script.next().unwrap_or(Script::Silent) {
                    Script::Result(result) => {
                        serde_json::to_vec(&json!({"id": request["id"], "result": result})).ok()
                    }
                    Script::Error(error) => {
                        serde_json::to_vec(&json!({"id": request["id"], "error": error})).ok()
                    }
                    Script::Bytes(bytes) => Some(bytes.to_vec()),
                    Script::Silent => None,
                };
                if let Some(reply) = reply {
                    let _ = socket.send_to(&reply, peer).await;
                }
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Transport configuration with short timings suitable for tests.
    fn config(&self) -> UdpConfig {
        UdpConfig::new("127.0.0.1")
            .with_port(self.addr.port())
            .with_timeout(Duration::from_millis(200))
            .with_max_retries(2)
            .with_retry_delay(Duration::from_millis(20))
    }

    fn client(&self) -> UdpClient {
        self.config().into_client()
    }

    fn device(&self) -> VenusDevice<UdpClient> {
        VenusDevice::udp_config(self.config())
            .with_max_output_power(800)
            .build()
            .unwrap()
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// UdpClient Tests
// ============================================================================

mod udp_client {
    use super::*;

    #[tokio::test]
    async fn call_returns_result_payload() {
        let mock = MockDevice::start(vec![Script::Result(json!({"soc": 98}))]).await;
        let client = mock.client();

        let result = client.call_raw("Bat.GetStatus", json!({"id": 0})).await;
        assert_eq!(result.unwrap(), json!({"soc": 98}));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["method"], "Bat.GetStatus");
        assert_eq!(requests[0]["params"], json!({"id": 0}));
        assert!(requests[0]["id"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn error_reply_is_terminal_after_one_attempt() {
        let mock = MockDevice::start(vec![Script::Error(
            json!({"code": -32601, "message": "method not found"}),
        )])
        .await;
        let client = mock.client();

        let result = client.call_raw("Bogus.Method", json!({"id": 0})).await;
        match result {
            Err(TransportError::Protocol(error)) => {
                assert_eq!(error.code(), Some(-32601));
                assert_eq!(error.message(), "method not found");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }

        // An error reply is a definitive verdict: no retries
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn timeout_exhausts_all_attempts() {
        let mock =
            MockDevice::start(vec![Script::Silent, Script::Silent, Script::Silent]).await;
        let client = mock.client();

        let result = client.call_raw("Bat.GetStatus", json!({"id": 0})).await;
        assert!(matches!(
            result,
            Err(TransportError::Timeout {
                attempts: 3,
                timeout_ms: 200,
            })
        ));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn recovers_after_garbage_reply() {
        let mock = MockDevice::start(vec![
            Script::Bytes(b"not json at all"),
            Script::Result(json!({"soc": 55})),
        ])
        .await;
        let client = mock.client();

        let result = client.call_raw("Bat.GetStatus", json!({"id": 0})).await;
        assert_eq!(result.unwrap(), json!({"soc": 55}));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn fresh_request_id_for_every_attempt() {
        let mock = MockDevice::start(vec![
            Script::Silent,
            Script::Result(json!({"soc": 55})),
        ])
        .await;
        let client = mock.client();

        client
            .call_raw("Bat.GetStatus", json!({"id": 0}))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        let first = requests[0]["id"].as_u64().unwrap();
        let second = requests[1]["id"].as_u64().unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn reply_without_result_or_error_yields_null() {
        let mock = MockDevice::start(vec![Script::Bytes(br#"{"id": 7}"#)]).await;
        let client = mock.client();

        let result = client.call_raw("Bat.GetStatus", json!({"id": 0})).await;
        assert_eq!(result.unwrap(), Value::Null);
    }
}

// ============================================================================
// Device Status Tests
// ============================================================================

mod device_status {
    use super::*;

    #[tokio::test]
    async fn typed_battery_read() {
        let mock = MockDevice::start(vec![Script::Result(json!({
            "soc": 92,
            "charg_flag": 1,
            "dischrg_flag": 0,
            "bat_temp": 23.5,
            "bat_capacity": 2381,
            "rated_capacity": 2560
        }))])
        .await;

        let status = mock.device().get_battery_status().await.unwrap();
        assert_eq!(status.soc, Some(92.0));
        assert_eq!(status.charg_flag, Some(true));
        assert_eq!(status.dischrg_flag, Some(false));
        assert_eq!(status.bat_temp, Some(23.5));
    }

    #[tokio::test]
    async fn operating_mode_from_mode_report() {
        let mock = MockDevice::start(vec![Script::Result(json!({
            "mode": "Passive",
            "ongrid_power": -250,
            "bat_soc": 44
        }))])
        .await;

        let mode = mock.device().get_operating_mode().await.unwrap();
        assert_eq!(mode.to_string(), "Passive");
    }

    #[tokio::test]
    async fn device_info_requires_ble_mac_addressing() {
        let mock = MockDevice::start(vec![Script::Result(json!({
            "device": "VenusE",
            "ver": 147,
            "ble_mac": "ac4d16a123bc"
        }))])
        .await;

        let info = mock
            .device()
            .get_device_info("ac4d16a123bc")
            .await
            .unwrap();
        assert_eq!(info.device.as_deref(), Some("VenusE"));

        let requests = mock.requests();
        assert_eq!(requests[0]["method"], "Marstek.GetDevice");
        assert_eq!(requests[0]["params"], json!({"ble_mac": "ac4d16a123bc"}));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_through_device() {
        let mock = MockDevice::start(Vec::new()).await;

        let result = mock.device().get_wifi_status().await;
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Timeout { attempts: 3, .. }))
        ));
    }
}

// ============================================================================
// Device Mode Tests
// ============================================================================

mod device_modes {
    use super::*;

    #[tokio::test]
    async fn manual_mode_round_trip() {
        let mock = MockDevice::start(vec![Script::Result(json!({"set_result": true}))]).await;
        let device = mock.device();

        let schedule = ManualModeConfig::new(
            PeriodIndex::new(9).unwrap(),
            "08:00".parse().unwrap(),
            "22:00".parse().unwrap(),
            "0111110".parse().unwrap(),
            -500,
        );
        device.set_manual_mode(&schedule).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0]["method"], "ES.SetMode");
        let config = &requests[0]["params"]["config"];
        assert_eq!(config["mode"], "Manual");
        assert_eq!(config["manual_cfg"]["time_num"], 9);
        assert_eq!(config["manual_cfg"]["start_time"], "08:00");
        assert_eq!(config["manual_cfg"]["end_time"], "22:00");
        assert_eq!(config["manual_cfg"]["week_set"], 31);
        assert_eq!(config["manual_cfg"]["power"], -500);
        assert_eq!(config["manual_cfg"]["enable"], 1);

        // Selector write-back confirms the new mode in the store
        assert_eq!(device.field_store().get(50).unwrap().numeric(), 30.0);
    }

    #[tokio::test]
    async fn rejected_mode_change() {
        let mock = MockDevice::start(vec![Script::Result(json!({"set_result": false}))]).await;
        let device = mock.device();

        let result = device.set_auto_mode().await;
        assert!(matches!(
            result,
            Err(Error::Device(DeviceError::CommandRejected(_)))
        ));
        assert!(device.field_store().get(50).is_none());
    }

    #[tokio::test]
    async fn validation_failure_sends_no_datagram() {
        let mock = MockDevice::start(Vec::new()).await;
        let device = mock.device();

        let inverted = ManualModeConfig::new(
            PeriodIndex::new(0).unwrap(),
            "10:00".parse().unwrap(),
            "09:00".parse().unwrap(),
            "1111111".parse().unwrap(),
            -500,
        );
        let result = device.set_manual_mode(&inverted).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_acknowledgement_is_malformed() {
        let mock = MockDevice::start(vec![Script::Bytes(br#"{"id": 3}"#)]).await;

        let result = mock.device().set_ai_mode().await;
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::EmptyReply))
        ));
    }
}

// ============================================================================
// Polling Tests
// ============================================================================

mod polling {
    use super::*;

    #[tokio::test]
    async fn full_cycle_applies_all_groups() {
        let mock = MockDevice::start(vec![
            Script::Result(json!({"soc": 87, "bat_temp": 21})),
            Script::Result(json!({"pv1_power": 120, "pv1_state": 1})),
            Script::Result(json!({"ct_state": 1, "total_power": -25})),
            Script::Result(json!({"bat_soc": 87, "bat_cap": 2560})),
            Script::Result(json!({"mode": "Auto", "ct_state": 1})),
        ])
        .await;
        let poller = Poller::new(Arc::new(mock.device()), PollOptions::new());

        let report = poller.poll_once().await;

        assert!(report.is_fully_resolved());
        let methods: Vec<_> = mock
            .requests()
            .iter()
            .map(|request| request["method"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            methods,
            vec![
                "Bat.GetStatus",
                "PV.GetStatus",
                "EM.GetStatus",
                "ES.GetStatus",
                "ES.GetMode",
            ]
        );

        let store = poller.device().field_store();
        assert_eq!(store.get(1).unwrap().text(), "87"); // soc
        assert_eq!(store.get(27).unwrap().text(), "87"); // es_bat_soc
        assert_eq!(store.get(40).unwrap().text(), "-25"); // total_power
    }

    #[tokio::test]
    async fn failing_group_leaves_others_intact() {
        // The photovoltaic read times out on all three attempts
        let mock = MockDevice::start(vec![
            Script::Result(json!({"soc": 87})),
            Script::Silent,
            Script::Silent,
            Script::Silent,
            Script::Result(json!({"total_power": -25})),
            Script::Result(json!({"bat_cap": 2560})),
            Script::Result(json!({"mode": "Auto"})),
        ])
        .await;
        let poller = Poller::new(Arc::new(mock.device()), PollOptions::new());

        let report = poller.poll_once().await;

        assert_eq!(report.failed_groups(), 1);
        assert!(matches!(
            report.outcome_for(StatusGroup::Photovoltaic),
            Some(GroupOutcome::Transport(TransportError::Timeout { .. }))
        ));

        let store = poller.device().field_store();
        assert_eq!(store.get(1).unwrap().text(), "87");
        assert_eq!(store.get(40).unwrap().text(), "-25");
        assert_eq!(store.get(28).unwrap().text(), "2560");
    }
}
