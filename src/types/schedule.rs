// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schedule types for manual mode programming.
//!
//! This module provides type-safe representations of the values that make up
//! a manual mode schedule slot: the period index, the daily time window, and
//! the weekday selection.
//!
//! # Types
//!
//! - [`PeriodIndex`] - Schedule slot on the device (0-9)
//! - [`ScheduleTime`] - Minute-resolution time of day (`HH:MM`)
//! - [`Weekdays`] - Set of weekdays a schedule slot applies to
//!
//! # Device Methods
//!
//! Use these types with
//! [`set_manual_mode()`](crate::VenusDevice::set_manual_mode).

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};

use crate::error::ValidationError;

// =============================================================================
// PeriodIndex
// =============================================================================

/// Maximum schedule period index.
const PERIOD_MAX: u8 = 9;

/// Index of a manual mode schedule slot.
///
/// Venus devices store up to ten schedule periods, addressed 0 through 9.
///
/// # Examples
///
/// ```
/// use venusr_lib::types::PeriodIndex;
///
/// let period = PeriodIndex::new(0).unwrap();
/// assert_eq!(period.value(), 0);
///
/// // Indices above 9 are rejected
/// assert!(PeriodIndex::new(10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodIndex(u8);

impl PeriodIndex {
    /// Maximum period index supported by the device.
    pub const MAX: u8 = PERIOD_MAX;

    /// Creates a new period index.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::PeriodOutOfRange` if `index` is above 9.
    pub const fn new(index: u8) -> Result<Self, ValidationError> {
        if index > PERIOD_MAX {
            return Err(ValidationError::PeriodOutOfRange(index));
        }
        Ok(Self(index))
    }

    /// Returns the raw slot index (0-9).
    ///
    /// This is the `time_num` value sent to the device.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PeriodIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ScheduleTime
// =============================================================================

/// Minute-resolution time of day for schedule windows.
///
/// The device expects schedule boundaries in 24-hour `HH:MM` form. Parsing is
/// positional: the first two and last two characters must be digits, and the
/// character between them may be any separator (firmware tools vary between
/// `:` and `.`). Rendering always uses `:`.
///
/// # Examples
///
/// ```
/// use venusr_lib::types::ScheduleTime;
///
/// let start: ScheduleTime = "06:30".parse().unwrap();
/// assert_eq!((start.hour(), start.minute()), (6, 30));
///
/// // Any single separator character is accepted
/// let same: ScheduleTime = "06.30".parse().unwrap();
/// assert_eq!(start, same);
/// assert_eq!(same.to_string(), "06:30");
///
/// assert!("24:00".parse::<ScheduleTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    /// Creates a new time of day.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTime` if `hour` is above 23 or
    /// `minute` is above 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTime {
                input: format!("{hour:02}:{minute:02}"),
                message: "hour must be 0-23 and minute 0-59".to_string(),
            })
    }

    /// Returns the hour (0-23).
    #[must_use]
    pub fn hour(&self) -> u8 {
        // Hour is 0-23
        #[allow(clippy::cast_possible_truncation)]
        let hour = self.0.hour() as u8;
        hour
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub fn minute(&self) -> u8 {
        // Minute is 0-59
        #[allow(clippy::cast_possible_truncation)]
        let minute = self.0.minute() as u8;
        minute
    }

    /// Returns the time as a [`chrono::NaiveTime`].
    #[must_use]
    pub const fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ScheduleTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 5 {
            return Err(ValidationError::InvalidTime {
                input: s.to_string(),
                message: format!(
                    "expected the 5-character HH:MM form, got {} characters",
                    chars.len()
                ),
            });
        }

        let digit = |index: usize| {
            chars[index]
                .to_digit(10)
                .ok_or_else(|| ValidationError::InvalidTime {
                    input: s.to_string(),
                    message: format!(
                        "expected a digit at position {index}, got {:?}",
                        chars[index]
                    ),
                })
        };

        // Positions 0-1 are the hour, 3-4 the minute; position 2 is an
        // arbitrary separator and is not inspected.
        let hour = digit(0)? * 10 + digit(1)?;
        let minute = digit(3)? * 10 + digit(4)?;

        // Two digits each, so both fit in u8
        #[allow(clippy::cast_possible_truncation)]
        let (hour, minute) = (hour as u8, minute as u8);
        Self::new(hour, minute)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

// =============================================================================
// Weekdays
// =============================================================================

/// Wire bit for each day, in operator pattern order (Sunday first).
const PATTERN_BITS: [u8; 7] = [64, 1, 2, 4, 8, 16, 32];

/// All seven day bits set.
const ALL_DAYS: u8 = 0x7f;

/// Set of weekdays a manual mode schedule slot applies to.
///
/// On the wire the device uses a 7-bit mask with Monday as the lowest bit
/// (Monday = 1 through Saturday = 32) and Sunday as the highest (64). The
/// operator-facing pattern form is a 7-character `'0'`/`'1'` string starting
/// with Sunday, as displayed by the vendor app.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use venusr_lib::types::Weekdays;
///
/// // Monday through Friday
/// let workdays: Weekdays = "0111110".parse().unwrap();
/// assert_eq!(workdays.bits(), 31);
/// assert!(workdays.contains(Weekday::Mon));
/// assert!(!workdays.contains(Weekday::Sun));
/// assert_eq!(workdays.to_string(), "0111110");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weekdays(u8);

impl Weekdays {
    /// Returns the set containing every day of the week.
    #[must_use]
    pub const fn all() -> Self {
        Self(ALL_DAYS)
    }

    /// Returns the empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy of this set with `day` added.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Weekday;
    /// use venusr_lib::types::Weekdays;
    ///
    /// let weekend = Weekdays::empty().with(Weekday::Sat).with(Weekday::Sun);
    /// assert_eq!(weekend.bits(), 32 + 64);
    /// ```
    #[must_use]
    pub const fn with(self, day: Weekday) -> Self {
        Self(self.0 | Self::day_bit(day))
    }

    /// Returns whether `day` is in the set.
    #[must_use]
    pub const fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::day_bit(day) != 0
    }

    /// Returns whether no day is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the wire bit mask (`week_set`).
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Creates a set from a wire bit mask.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWeekdays` if bits outside the low
    /// seven are set.
    pub fn from_bits(bits: u8) -> Result<Self, ValidationError> {
        if bits > ALL_DAYS {
            return Err(ValidationError::InvalidWeekdays(format!("bit mask {bits}")));
        }
        Ok(Self(bits))
    }

    /// Creates a set from the Sunday-first `'0'`/`'1'` pattern form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWeekdays` if the pattern is not
    /// exactly seven `'0'` or `'1'` characters.
    pub fn from_pattern(pattern: &str) -> Result<Self, ValidationError> {
        let mut bits = 0u8;
        let mut count = 0usize;
        for (position, c) in pattern.chars().enumerate() {
            count += 1;
            match c {
                '1' if position < 7 => bits |= PATTERN_BITS[position],
                '0' | '1' => {}
                _ => return Err(ValidationError::InvalidWeekdays(pattern.to_string())),
            }
        }
        if count != 7 {
            return Err(ValidationError::InvalidWeekdays(pattern.to_string()));
        }
        Ok(Self(bits))
    }

    /// Returns the Sunday-first `'0'`/`'1'` pattern form.
    #[must_use]
    pub fn pattern(&self) -> String {
        PATTERN_BITS
            .iter()
            .map(|bit| if self.0 & bit != 0 { '1' } else { '0' })
            .collect()
    }

    const fn day_bit(day: Weekday) -> u8 {
        match day {
            Weekday::Mon => 1,
            Weekday::Tue => 2,
            Weekday::Wed => 4,
            Weekday::Thu => 8,
            Weekday::Fri => 16,
            Weekday::Sat => 32,
            Weekday::Sun => 64,
        }
    }
}

impl Default for Weekdays {
    fn default() -> Self {
        // A fresh schedule slot applies every day
        Self::all()
    }
}

impl FromStr for Weekdays {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_pattern(s)
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern())
    }
}

// =============================================================================
// Tests
// =============================================================================
