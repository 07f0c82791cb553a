// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolution of raw status payloads into canonical field values.
//!
//! Status replies are flat JSON objects whose keys occasionally collide
//! across commands: `ES.GetStatus` reports `bat_soc`, `ongrid_power` and
//! `offgrid_power` with system-wide meaning while `ES.GetMode` echoes the
//! same keys redundantly. The resolver qualifies the former, suppresses the
//! latter, and maps everything else through the field registry. One bad or
//! unknown key never aborts the rest of its batch; it is logged and handed
//! back in the unrecognized list so callers can spot firmware changes.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use venusr_lib::telemetry::{FieldRegistry, FieldResolver, SourceTag};
//!
//! let registry = FieldRegistry::venus_defaults();
//! let resolver = FieldResolver::new(&registry);
//!
//! let payload = json!({"id": 1, "soc": 87, "bat_temp": 23.4});
//! let batch = resolver.resolve(SourceTag::Bat, &payload);
//! assert_eq!(batch.applied().len(), 2);
//! assert!(batch.unrecognized().is_empty());
//! ```

use serde_json::Value;
use tracing::warn;

use crate::telemetry::registry::{
    FieldDescriptor, FieldKind, FieldRegistry, FieldScale, SourceTag,
};

/// Keys that carry protocol bookkeeping, never field data.
const BOOKKEEPING_KEYS: [&str; 2] = ["id", "src"];

/// Keys `ES.GetMode` echoes redundantly; their authoritative values come
/// from `ES.GetStatus` and `EM.GetStatus`.
const ESM_ECHO_KEYS: [&str; 4] = ["mode", "ongrid_power", "offgrid_power", "bat_soc"];

/// Keys reported by `ES.GetStatus` that collide with other sources and
/// resolve under the `es_` qualifier instead.
const ESS_SHARED_KEYS: [&str; 3] = ["bat_soc", "ongrid_power", "offgrid_power"];

// ========== Resolved Values ==========

/// One canonical field value produced from a status payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    slot: u8,
    key: &'static str,
    kind: FieldKind,
    numeric: f64,
    text: String,
}

impl ResolvedField {
    /// Returns the slot number of the canonical field.
    #[must_use]
    pub const fn slot(&self) -> u8 {
        self.slot
    }

    /// Returns the canonical key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the scaled numeric value (0 for text fields).
    #[must_use]
    pub const fn numeric(&self) -> f64 {
        self.numeric
    }

    /// Returns the rendered text value.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Why a payload entry could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecognizedReason {
    /// The key has no canonical mapping.
    UnknownKey,
    /// The key is known but the value does not match its kind.
    TypeMismatch,
}

/// A payload entry that did not resolve to a canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedField {
    source: SourceTag,
    key: String,
    value: Value,
    reason: UnrecognizedReason,
}

impl UnrecognizedField {
    /// Returns the source tag of the payload that carried the entry.
    #[must_use]
    pub const fn source(&self) -> SourceTag {
        self.source
    }

    /// Returns the key as it was looked up (after any qualification).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns why the entry was rejected.
    #[must_use]
    pub const fn reason(&self) -> UnrecognizedReason {
        self.reason
    }
}

/// The outcome of resolving one status payload.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBatch {
    applied: Vec<ResolvedField>,
    unrecognized: Vec<UnrecognizedField>,
}

impl ResolvedBatch {
    /// Returns the fields that resolved, in payload order.
    #[must_use]
    pub fn applied(&self) -> &[ResolvedField] {
        &self.applied
    }

    /// Returns the entries that did not resolve.
    #[must_use]
    pub fn unrecognized(&self) -> &[UnrecognizedField] {
        &self.unrecognized
    }

    /// Returns true when nothing resolved and nothing was rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.unrecognized.is_empty()
    }

    /// Splits the batch into its applied and unrecognized parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ResolvedField>, Vec<UnrecognizedField>) {
        (self.applied, self.unrecognized)
    }
}

// ========== Resolver ==========

/// Maps raw status payloads onto the canonical field registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> FieldResolver<'a> {
    /// Creates a resolver over the given registry.
    #[must_use]
    pub const fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Resolves one status payload tagged with the command that produced it.
    ///
    /// Bookkeeping keys are skipped, the `ES.GetMode` echo keys are
    /// suppressed, and `ES.GetStatus` shared keys are qualified before
    /// lookup. Unknown keys and values of the wrong type are collected in
    /// the unrecognized list without aborting the batch; inactive fields
    /// are skipped silently.
    #[must_use]
    pub fn resolve(&self, source: SourceTag, payload: &Value) -> ResolvedBatch {
        let mut batch = ResolvedBatch::default();

        let Some(object) = payload.as_object() else {
            warn!(source = %source, "Status payload is not a JSON object");
            return batch;
        };

        for (key, value) in object {
            if BOOKKEEPING_KEYS.contains(&key.as_str()) {
                continue;
            }
            if source == SourceTag::Esm && ESM_ECHO_KEYS.contains(&key.as_str()) {
                continue;
            }

            let canonical =
                if source == SourceTag::Ess && ESS_SHARED_KEYS.contains(&key.as_str()) {
                    format!("es_{key}")
                } else {
                    key.clone()
                };

            let Some(descriptor) = self.registry.by_key(&canonical) else {
                warn!(
                    source = %source,
                    key = %canonical,
                    "Unrecognized status field, the device API may have changed"
                );
                batch.unrecognized.push(UnrecognizedField {
                    source,
                    key: canonical,
                    value: value.clone(),
                    reason: UnrecognizedReason::UnknownKey,
                });
                continue;
            };

            if !descriptor.is_active() {
                continue;
            }

            match encode(descriptor, value) {
                Some((numeric, text)) => batch.applied.push(ResolvedField {
                    slot: descriptor.slot(),
                    key: descriptor.key(),
                    kind: descriptor.kind(),
                    numeric,
                    text,
                }),
                None => {
                    warn!(
                        source = %source,
                        key = %canonical,
                        "Status field carries an unexpected value type"
                    );
                    batch.unrecognized.push(UnrecognizedField {
                        source,
                        key: canonical,
                        value: value.clone(),
                        reason: UnrecognizedReason::TypeMismatch,
                    });
                }
            }
        }

        batch
    }
}

/// Encodes a raw value per the descriptor's kind.
///
/// Returns the numeric and text renderings, or `None` on a type mismatch.
fn encode(descriptor: &FieldDescriptor, value: &Value) -> Option<(f64, String)> {
    match descriptor.kind() {
        FieldKind::Gauge | FieldKind::Percentage | FieldKind::Counter => {
            let scaled = value.as_f64()? * descriptor.scale().factor();
            match descriptor.scale() {
                FieldScale::Unit => {
                    let rounded = scaled.round();
                    Some((rounded, format!("{rounded:.0}")))
                }
                FieldScale::Tenth => {
                    let rounded = (scaled * 10.0).round() / 10.0;
                    Some((rounded, format!("{rounded:.1}")))
                }
            }
        }
        FieldKind::Flag => {
            let truthy = match value {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON),
                _ => return None,
            };
            let numeric = if truthy { 1.0 } else { 0.0 };
            Some((numeric, format!("{numeric:.0}")))
        }
        FieldKind::Text => match value {
            Value::String(s) => Some((0.0, s.clone())),
            Value::Number(n) => Some((0.0, n.to_string())),
            _ => None,
        },
        // Selector slots are written by mode dispatch, never by payloads.
        FieldKind::Selector => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolve(source: SourceTag, payload: Value) -> ResolvedBatch {
        let registry = FieldRegistry::venus_defaults();
        FieldResolver::new(&registry).resolve(source, &payload)
    }

    fn applied_slot(batch: &ResolvedBatch, slot: u8) -> ResolvedField {
        batch
            .applied()
            .iter()
            .find(|f| f.slot() == slot)
            .cloned()
            .unwrap_or_else(|| panic!("slot {slot} not applied"))
    }

    // ========== Battery Payloads ==========

    #[test]
    fn battery_payload_resolves() {
        let batch = resolve(
            SourceTag::Bat,
            json!({
                "id": 1,
                "soc": 87,
                "charg_flag": true,
                "dischrg_flag": false,
                "bat_temp": 23.6,
                "bat_capacity": 2456,
                "rated_capacity": 5120,
            }),
        );

        assert_eq!(batch.applied().len(), 6);
        assert!(batch.unrecognized().is_empty());

        let soc = applied_slot(&batch, 1);
        assert_eq!(soc.key(), "soc");
        assert_eq!(soc.numeric(), 87.0);
        assert_eq!(soc.text(), "87");

        let temp = applied_slot(&batch, 4);
        assert_eq!(temp.numeric(), 24.0);
        assert_eq!(temp.text(), "24");

        assert_eq!(applied_slot(&batch, 2).numeric(), 1.0);
        assert_eq!(applied_slot(&batch, 3).numeric(), 0.0);
    }

    #[test]
    fn bookkeeping_keys_are_skipped() {
        let batch = resolve(SourceTag::Bat, json!({"id": 7, "src": "Venus-C"}));
        assert!(batch.is_empty());
    }

    // ========== Duplicate-Key Handling ==========

    #[test]
    fn es_mode_echo_keys_are_suppressed() {
        let batch = resolve(
            SourceTag::Esm,
            json!({
                "id": 2,
                "mode": "Auto",
                "ongrid_power": 150,
                "offgrid_power": 0,
                "bat_soc": 80,
            }),
        );

        assert!(batch.applied().is_empty());
        assert!(batch.unrecognized().is_empty());
    }

    #[test]
    fn es_mode_passes_energy_meter_echo_through() {
        // In Auto and AI modes the mode reply also carries meter readings.
        let batch = resolve(
            SourceTag::Esm,
            json!({"mode": "Auto", "a_power": 120, "total_power": 200}),
        );

        assert_eq!(batch.applied().len(), 2);
        assert_eq!(applied_slot(&batch, 37).numeric(), 120.0);
        assert_eq!(applied_slot(&batch, 40).numeric(), 200.0);
    }

    #[test]
    fn es_status_shared_keys_are_qualified() {
        let batch = resolve(
            SourceTag::Ess,
            json!({
                "bat_soc": 76,
                "ongrid_power": 450,
                "offgrid_power": 0,
                "pv_power": 800,
            }),
        );

        assert_eq!(batch.applied().len(), 4);
        assert_eq!(applied_slot(&batch, 27).key(), "es_bat_soc");
        assert_eq!(applied_slot(&batch, 30).key(), "es_ongrid_power");
        assert_eq!(applied_slot(&batch, 31).key(), "es_offgrid_power");
        // non-shared keys resolve unqualified
        assert_eq!(applied_slot(&batch, 29).key(), "pv_power");
    }

    // ========== Unrecognized Entries ==========

    #[test]
    fn unknown_key_does_not_abort_batch() {
        let batch = resolve(SourceTag::Ess, json!({"es_bat_soc": 80, "bat_power": -200}));

        assert_eq!(batch.applied().len(), 1);
        assert_eq!(batch.unrecognized().len(), 1);

        let rejected = &batch.unrecognized()[0];
        assert_eq!(rejected.key(), "bat_power");
        assert_eq!(rejected.value(), &json!(-200));
        assert_eq!(rejected.reason(), UnrecognizedReason::UnknownKey);
        assert_eq!(rejected.source(), SourceTag::Ess);
    }

    #[test]
    fn type_mismatch_lands_in_unrecognized() {
        let batch = resolve(SourceTag::Bat, json!({"soc": "eighty", "bat_temp": 21}));

        assert_eq!(batch.applied().len(), 1);
        assert_eq!(batch.unrecognized().len(), 1);
        assert_eq!(batch.unrecognized()[0].reason(), UnrecognizedReason::TypeMismatch);
    }

    #[test]
    fn inactive_fields_are_silently_skipped() {
        let mut registry = FieldRegistry::venus_defaults();
        registry.deactivate("soc");

        let payload = json!({"soc": 80, "bat_temp": 20});
        let batch = FieldResolver::new(&registry).resolve(SourceTag::Bat, &payload);

        assert_eq!(batch.applied().len(), 1);
        assert_eq!(batch.applied()[0].key(), "bat_temp");
        assert!(batch.unrecognized().is_empty());
    }

    #[test]
    fn non_object_payload_resolves_empty() {
        assert!(resolve(SourceTag::Bat, json!(42)).is_empty());
        assert!(resolve(SourceTag::Bat, json!(null)).is_empty());
        assert!(resolve(SourceTag::Bat, json!([1, 2])).is_empty());
    }

    // ========== Encoding ==========

    #[test]
    fn power_gauges_resolve_numerically() {
        let batch = resolve(SourceTag::Pv, json!({"pv1_power": 350, "pv1_state": 1}));

        let power = applied_slot(&batch, 7);
        assert_eq!(power.kind(), FieldKind::Gauge);
        assert_eq!(power.numeric(), 350.0);
        assert_eq!(power.text(), "350");

        assert_eq!(applied_slot(&batch, 10).numeric(), 1.0);
    }

    #[test]
    fn nonzero_flags_coerce_to_one() {
        for (raw, expected) in [
            (json!(true), 1.0),
            (json!(false), 0.0),
            (json!(1), 1.0),
            (json!(5), 1.0),
            (json!(0), 0.0),
        ] {
            let batch = resolve(SourceTag::Bat, json!({"charg_flag": raw}));
            assert_eq!(batch.applied()[0].numeric(), expected);
        }
    }

    #[test]
    fn tenth_scale_renders_one_decimal() {
        let batch = resolve(
            SourceTag::Ems,
            json!({"input_energy": 12345, "output_energy": 67890}),
        );

        let input = applied_slot(&batch, 41);
        assert_eq!(input.numeric(), 1234.5);
        assert_eq!(input.text(), "1234.5");

        let output = applied_slot(&batch, 42);
        assert_eq!(output.numeric(), 6789.0);
        assert_eq!(output.text(), "6789.0");
    }

    #[test]
    fn text_fields_store_raw_text_with_zero_numeric() {
        let batch = resolve(SourceTag::Pm, json!({"countdown": "300"}));
        let countdown = applied_slot(&batch, 49);
        assert_eq!(countdown.numeric(), 0.0);
        assert_eq!(countdown.text(), "300");

        // numbers render through for text slots as well
        let batch = resolve(SourceTag::Pm, json!({"countdown": 300}));
        assert_eq!(applied_slot(&batch, 49).text(), "300");
    }

    #[test]
    fn negative_gauges_round_half_away_from_zero() {
        let batch = resolve(SourceTag::Ems, json!({"total_power": -812.5}));
        assert_eq!(applied_slot(&batch, 40).numeric(), -813.0);
        assert_eq!(applied_slot(&batch, 40).text(), "-813");
    }
}
