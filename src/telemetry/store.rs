// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical field value store.
//!
//! Holds the latest resolved sample per field slot. The store uses interior
//! mutability behind a [`parking_lot::RwLock`]; accessors clone samples out
//! so no lock is ever held across an await point. Storage and display of
//! the values is the caller's concern, the store only keeps the most recent
//! canonical state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::telemetry::registry::FieldDescriptor;
use crate::telemetry::resolver::ResolvedBatch;

/// The latest value of one canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSample {
    key: &'static str,
    numeric: f64,
    text: String,
    updated_at: DateTime<Utc>,
}

impl FieldSample {
    /// Returns the canonical key of the field.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
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

    /// Returns when the sample was recorded.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Latest canonical readings keyed by field slot.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use venusr_lib::telemetry::{FieldRegistry, FieldResolver, FieldStore, SourceTag};
///
/// let registry = FieldRegistry::venus_defaults();
/// let store = FieldStore::new();
///
/// let batch = FieldResolver::new(&registry).resolve(SourceTag::Bat, &json!({"soc": 87}));
/// store.apply(&batch);
///
/// assert_eq!(store.get(1).unwrap().text(), "87");
/// ```
#[derive(Debug, Default)]
pub struct FieldStore {
    samples: RwLock<BTreeMap<u8, FieldSample>>,
}

impl FieldStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every applied field of a resolved batch.
    pub fn apply(&self, batch: &ResolvedBatch) {
        let mut samples = self.samples.write();
        for field in batch.applied() {
            samples.insert(
                field.slot(),
                FieldSample {
                    key: field.key(),
                    numeric: field.numeric(),
                    text: field.text().to_string(),
                    updated_at: Utc::now(),
                },
            );
        }
    }

    /// Records one value directly under a descriptor's slot.
    ///
    /// Used for values that never arrive in a status payload: the mode
    /// selector write-back and staged manual/passive schedule intent.
    pub fn stage(&self, descriptor: &FieldDescriptor, numeric: f64, text: impl Into<String>) {
        self.samples.write().insert(
            descriptor.slot(),
            FieldSample {
                key: descriptor.key(),
                numeric,
                text: text.into(),
                updated_at: Utc::now(),
            },
        );
    }

    /// Returns the latest sample for a slot.
    #[must_use]
    pub fn get(&self, slot: u8) -> Option<FieldSample> {
        self.samples.read().get(&slot).cloned()
    }

    /// Returns the latest sample for a canonical key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<FieldSample> {
        self.samples
            .read()
            .values()
            .find(|sample| sample.key == key)
            .cloned()
    }

    /// Returns a point-in-time copy of all samples, ordered by slot.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<u8, FieldSample> {
        self.samples.read().clone()
    }

    /// Returns the number of fields holding a sample.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    /// Returns true when no field holds a sample yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }
}
