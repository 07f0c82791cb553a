// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll orchestration for periodic status collection.
//!
//! A poll cycle reads the five status groups in a fixed order and applies
//! every successful result to the device's field store. Groups fail
//! independently: a timeout on one read never suppresses the values of the
//! groups that answered in the same cycle.
//!
//! [`Poller::tick`] is the entry point for hosts that drive polling from a
//! fixed-rate heartbeat callback. It coalesces heartbeats into the
//! configured effective polling period and skips a heartbeat entirely while
//! a previous cycle is still in flight, because the transport's retry loop
//! can hold a cycle open for tens of seconds in the worst case. Hosts with
//! their own scheduler can call [`Poller::poll_once`] directly.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use venusr_lib::VenusDevice;
//! use venusr_lib::poll::{PollOptions, PollTick, Poller};
//!
//! # async fn example() -> venusr_lib::Result<()> {
//! let device = Arc::new(
//!     VenusDevice::udp("192.168.1.11")
//!         .with_max_output_power(800)
//!         .build()?,
//! );
//!
//! // Poll on every third heartbeat
//! let options = PollOptions::new().with_heartbeats_per_cycle(3);
//! let poller = Poller::new(Arc::clone(&device), options);
//!
//! if let PollTick::Completed(report) = poller.tick().await {
//!     println!("{} fields updated", report.applied_fields());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::command::StatusGroup;
use crate::device::VenusDevice;
use crate::error::{Error, ParseError, TransportError};
use crate::protocol::Transport;

// ============================================================================
// PollOptions
// ============================================================================

/// Options for heartbeat-driven polling.
///
/// # Examples
///
/// ```
/// use venusr_lib::poll::PollOptions;
///
/// // A host with a 10 second heartbeat polling once a minute
/// let options = PollOptions::new().with_heartbeats_per_cycle(6);
/// assert_eq!(options.heartbeats_per_cycle(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    heartbeats_per_cycle: u32,
}

impl PollOptions {
    /// Creates options that poll on every heartbeat.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heartbeats_per_cycle: 1,
        }
    }

    /// Sets how many heartbeats make up one effective polling period.
    ///
    /// A value of `n` completes one cycle per `n` calls to
    /// [`Poller::tick`]; the other calls return [`PollTick::Coalesced`].
    /// Zero is treated as one.
    #[must_use]
    pub const fn with_heartbeats_per_cycle(mut self, heartbeats: u32) -> Self {
        self.heartbeats_per_cycle = if heartbeats == 0 { 1 } else { heartbeats };
        self
    }

    /// Returns the number of heartbeats per polling cycle.
    #[must_use]
    pub const fn heartbeats_per_cycle(&self) -> u32 {
        self.heartbeats_per_cycle
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Poll outcomes
// ============================================================================

/// Outcome of reading one status group within a poll cycle.
#[derive(Debug)]
pub enum GroupOutcome {
    /// The group answered and its payload was resolved into the store.
    Resolved {
        /// Number of fields applied to the store.
        applied: usize,
        /// Number of keys without a canonical mapping.
        unrecognized: usize,
    },
    /// The read failed at the transport level after all retries.
    Transport(TransportError),
    /// The device answered with a payload that could not be interpreted.
    Malformed(ParseError),
}

impl GroupOutcome {
    /// Returns whether the group was read and resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Summary of one completed poll cycle.
#[derive(Debug)]
pub struct PollReport {
    started_at: DateTime<Utc>,
    outcomes: Vec<(StatusGroup, GroupOutcome)>,
}

impl PollReport {
    /// Returns when the cycle started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the per-group outcomes in poll order.
    #[must_use]
    pub fn outcomes(&self) -> &[(StatusGroup, GroupOutcome)] {
        &self.outcomes
    }

    /// Returns the outcome recorded for a specific group.
    #[must_use]
    pub fn outcome_for(&self, group: StatusGroup) -> Option<&GroupOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == group)
            .map(|(_, outcome)| outcome)
    }

    /// Returns whether every group was read and resolved.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_resolved())
    }

    /// Returns the total number of fields applied to the store.
    #[must_use]
    pub fn applied_fields(&self) -> usize {
        self.count(|outcome| match outcome {
            GroupOutcome::Resolved { applied, .. } => *applied,
            _ => 0,
        })
    }

    /// Returns the total number of unrecognized keys across all groups.
    #[must_use]
    pub fn unrecognized_fields(&self) -> usize {
        self.count(|outcome| match outcome {
            GroupOutcome::Resolved { unrecognized, .. } => *unrecognized,
            _ => 0,
        })
    }

    /// Returns the number of groups that failed.
    #[must_use]
    pub fn failed_groups(&self) -> usize {
        self.count(|outcome| usize::from(!outcome.is_resolved()))
    }

    fn count(&self, per_outcome: impl Fn(&GroupOutcome) -> usize) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| per_outcome(outcome))
            .sum()
    }
}

/// Result of one heartbeat delivered to [`Poller::tick`].
#[derive(Debug)]
pub enum PollTick {
    /// The heartbeat was absorbed into the current polling period.
    Coalesced,
    /// A cycle was due but a previous one is still in flight.
    SkippedBusy,
    /// A cycle ran to completion.
    Completed(PollReport),
}

// ============================================================================
// Poller
// ============================================================================

/// Drives periodic status collection for one device.
#[derive(Debug)]
pub struct Poller<T: Transport> {
    device: Arc<VenusDevice<T>>,
    options: PollOptions,
    heartbeats: AtomicU32,
    busy: AtomicBool,
}

impl<T: Transport> Poller<T> {
    /// Creates a poller for the device.
    #[must_use]
    pub fn new(device: Arc<VenusDevice<T>>, options: PollOptions) -> Self {
        Self {
            device,
            options,
            heartbeats: AtomicU32::new(0),
            busy: AtomicBool::new(false),
        }
    }

    /// Returns the device being polled.
    #[must_use]
    pub fn device(&self) -> &VenusDevice<T> {
        &self.device
    }

    /// Returns whether a poll cycle is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Delivers one heartbeat.
    ///
    /// Counts the heartbeat against the configured polling period; when a
    /// cycle is due and none is in flight, runs it to completion. A cycle
    /// that is due while another is still running is skipped, not queued.
    pub async fn tick(&self) -> PollTick {
        let count = self.heartbeats.fetch_add(1, Ordering::Relaxed) + 1;
        if count % self.options.heartbeats_per_cycle() != 0 {
            debug!(
                count,
                per_cycle = self.options.heartbeats_per_cycle(),
                "Coalescing heartbeat"
            );
            return PollTick::Coalesced;
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous poll cycle still in flight, skipping this heartbeat");
            return PollTick::SkippedBusy;
        }
        let _guard = BusyGuard(&self.busy);

        PollTick::Completed(self.poll_once().await)
    }

    /// Runs one full poll cycle.
    ///
    /// Reads the five status groups in order and applies each resolved
    /// payload to the device's field store. Failures are recorded in the
    /// report; the cycle itself never fails.
    pub async fn poll_once(&self) -> PollReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(StatusGroup::all().len());
        for group in StatusGroup::all() {
            outcomes.push((*group, self.fetch_group(*group).await));
        }

        let report = PollReport {
            started_at,
            outcomes,
        };
        debug!(
            applied = report.applied_fields(),
            unrecognized = report.unrecognized_fields(),
            failed = report.failed_groups(),
            "Poll cycle finished"
        );
        report
    }

    async fn fetch_group(&self, group: StatusGroup) -> GroupOutcome {
        debug!(method = group.method(), "Polling status group");
        match self.device.fetch_group(group).await {
            Ok(batch) => GroupOutcome::Resolved {
                applied: batch.applied().len(),
                unrecognized: batch.unrecognized().len(),
            },
            Err(Error::Transport(error)) => {
                warn!(method = group.method(), %error, "Status group failed after retries");
                GroupOutcome::Transport(error)
            }
            Err(Error::Parse(error)) => {
                warn!(method = group.method(), %error, "Status group payload was malformed");
                GroupOutcome::Malformed(error)
            }
            // Status reads produce no validation or device errors
            Err(error) => GroupOutcome::Malformed(ParseError::UnexpectedFormat(error.to_string())),
        }
    }
}

/// Clears the busy flag when the cycle ends, also on cancellation.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use super::*;
    use crate::telemetry::FieldRegistry;
    use crate::types::PowerLimits;

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Value, TransportError>>>,
        methods: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<Value, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                methods: Mutex::new(Vec::new()),
            }
        }

        fn methods(&self) -> Vec<String> {
            self.methods.lock().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn call_raw(&self, method: &str, _params: Value) -> Result<Value, TransportError> {
            self.methods.lock().push(method.to_string());
            self.replies.lock().pop_front().unwrap_or(Ok(json!({})))
        }
    }

    fn poller(
        replies: Vec<Result<Value, TransportError>>,
        options: PollOptions,
    ) -> Poller<ScriptedTransport> {
        let device = VenusDevice::new(
            ScriptedTransport::replying(replies),
            FieldRegistry::venus_defaults(),
            PowerLimits::new(800),
        );
        Poller::new(Arc::new(device), options)
    }

    fn timeout() -> TransportError {
        TransportError::Timeout {
            attempts: 3,
            timeout_ms: 100,
        }
    }

    #[tokio::test]
    async fn poll_once_queries_groups_in_order() {
        let poller = poller(
            vec![
                Ok(json!({"soc": 87})),
                Ok(json!({"pv1_power": 120})),
                Ok(json!({"total_power": -25})),
                Ok(json!({"bat_soc": 87, "bat_cap": 2560})),
                Ok(json!({"mode": "Auto"})),
            ],
            PollOptions::default(),
        );

        let report = poller.poll_once().await;

        assert!(report.is_fully_resolved());
        assert_eq!(
            poller.device().transport().methods(),
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
        assert_eq!(store.get(7).unwrap().text(), "120"); // pv1_power
        assert_eq!(store.get(40).unwrap().text(), "-25"); // total_power
        assert_eq!(store.get(27).unwrap().text(), "87"); // es_bat_soc
    }

    #[tokio::test]
    async fn failing_group_does_not_block_later_groups() {
        let poller = poller(
            vec![
                Ok(json!({"soc": 87})),
                Err(timeout()),
                Ok(json!({"total_power": -25})),
                Ok(json!({"bat_cap": 2560})),
                Ok(json!({"mode": "Auto"})),
            ],
            PollOptions::default(),
        );

        let report = poller.poll_once().await;

        assert!(!report.is_fully_resolved());
        assert_eq!(report.failed_groups(), 1);
        assert!(matches!(
            report.outcome_for(StatusGroup::Photovoltaic),
            Some(GroupOutcome::Transport(TransportError::Timeout { .. }))
        ));
        // Groups after the failure were still read and applied
        let store = poller.device().field_store();
        assert_eq!(store.get(40).unwrap().text(), "-25");
        assert_eq!(store.get(28).unwrap().text(), "2560"); // bat_cap
    }

    #[tokio::test]
    async fn empty_reply_is_reported_as_malformed() {
        let poller = poller(
            vec![Ok(Value::Null)],
            PollOptions::default(),
        );

        let report = poller.poll_once().await;

        assert!(matches!(
            report.outcome_for(StatusGroup::Battery),
            Some(GroupOutcome::Malformed(ParseError::EmptyReply))
        ));
        assert_eq!(report.failed_groups(), 1);
    }

    #[tokio::test]
    async fn esm_echo_fields_are_dropped_not_counted() {
        let poller = poller(
            vec![
                Ok(json!({})),
                Ok(json!({})),
                Ok(json!({})),
                Ok(json!({})),
                Ok(json!({"mode": "Manual", "bat_soc": 55, "ct_state": 1})),
            ],
            PollOptions::default(),
        );

        let report = poller.poll_once().await;

        assert!(matches!(
            report.outcome_for(StatusGroup::Mode),
            // mode and bat_soc are dropped, ct_state resolves
            Some(GroupOutcome::Resolved { applied: 1, unrecognized: 0 })
        ));
    }

    #[tokio::test]
    async fn report_sums_applied_and_unrecognized() {
        let poller = poller(
            vec![
                Ok(json!({"soc": 87, "bat_temp": 21, "cell_count": 16})),
                Ok(json!({"pv_power": 120})),
            ],
            PollOptions::default(),
        );

        let report = poller.poll_once().await;

        assert_eq!(report.applied_fields(), 3);
        assert_eq!(report.unrecognized_fields(), 1);
    }

    #[tokio::test]
    async fn tick_coalesces_heartbeats() {
        let poller = poller(
            Vec::new(),
            PollOptions::new().with_heartbeats_per_cycle(3),
        );

        assert!(matches!(poller.tick().await, PollTick::Coalesced));
        assert!(matches!(poller.tick().await, PollTick::Coalesced));
        assert!(matches!(poller.tick().await, PollTick::Completed(_)));
        assert!(matches!(poller.tick().await, PollTick::Coalesced));
    }

    #[tokio::test]
    async fn tick_polls_every_heartbeat_by_default() {
        let poller = poller(Vec::new(), PollOptions::default());
        assert!(matches!(poller.tick().await, PollTick::Completed(_)));
        assert!(matches!(poller.tick().await, PollTick::Completed(_)));
    }

    #[tokio::test]
    async fn tick_skips_while_busy() {
        let poller = poller(Vec::new(), PollOptions::default());

        poller.busy.store(true, Ordering::Release);
        assert!(poller.is_busy());
        assert!(matches!(poller.tick().await, PollTick::SkippedBusy));

        poller.busy.store(false, Ordering::Release);
        assert!(matches!(poller.tick().await, PollTick::Completed(_)));
        assert!(!poller.is_busy());
    }

    #[test]
    fn zero_heartbeats_per_cycle_is_clamped() {
        let options = PollOptions::new().with_heartbeats_per_cycle(0);
        assert_eq!(options.heartbeats_per_cycle(), 1);
    }
}
