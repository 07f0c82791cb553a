// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical field model for Venus status data.
//!
//! Status replies arrive as flat JSON objects whose keys vary by command
//! and occasionally collide across commands. This module turns them into a
//! stable set of canonical fields:
//!
//! - [`FieldRegistry`] describes every canonical field (key, slot, kind,
//!   scale, label, source).
//! - [`FieldResolver`] maps one tagged payload onto the registry, handling
//!   duplicate keys, unknown keys and type mismatches without aborting.
//! - [`FieldStore`] keeps the latest resolved sample per field.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use venusr_lib::telemetry::{FieldRegistry, FieldResolver, FieldStore, SourceTag};
//!
//! let registry = FieldRegistry::venus_defaults();
//! let store = FieldStore::new();
//!
//! let payload = json!({"id": 1, "soc": 87, "bat_temp": 23.4, "charg_flag": true});
//! let batch = FieldResolver::new(&registry).resolve(SourceTag::Bat, &payload);
//! store.apply(&batch);
//!
//! assert_eq!(store.get(1).unwrap().text(), "87");
//! assert_eq!(store.by_key("charg_flag").unwrap().numeric(), 1.0);
//! ```

mod registry;
mod resolver;
mod store;

pub use registry::{FieldDescriptor, FieldKind, FieldRegistry, FieldScale, SourceTag};
pub use resolver::{
    FieldResolver, ResolvedBatch, ResolvedField, UnrecognizedField, UnrecognizedReason,
};
pub use store::{FieldSample, FieldStore};
