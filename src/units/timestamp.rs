// Cost Basis
// Written in 2023 by
//   Andrew Poelstra <tradetracker@wpsoftware.net>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Timestamps
//!
//! Event times, as integer seconds since the UNIX epoch. This is deliberately
//! not a full datetime type: the engine only ever compares times and adds
//! holding periods to them, and renders them for humans in log lines.
//!

use serde::{Deserialize, Serialize};
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

/// Function used to render a timestamp for log lines and reports
pub type TimestampFormatter = fn(Timestamp) -> String;

/// A UNIX timestamp, in seconds
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Whether something that started at this time has been held for strictly
    /// longer than `period` seconds as of `as_of`
    pub fn held_longer_than(&self, period: i64, as_of: Timestamp) -> bool {
        self.0.saturating_add(period) < as_of.0
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp(secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&timestamp_to_date(*self))
    }
}

/// Default timestamp renderer: day/month/year, UTC
///
/// Falls back to the raw number of seconds if the timestamp is outside of
/// the range representable by the date library.
pub fn timestamp_to_date(ts: Timestamp) -> String {
    let format = format_description!("[day]/[month]/[year] [hour]:[minute]:[second] UTC");
    OffsetDateTime::from_unix_timestamp(ts.0)
        .ok()
        .and_then(|date| date.format(format).ok())
        .unwrap_or_else(|| ts.0.to_string())
}
