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

//! Units
//!
//! Data structures representing the fundamental units used throughout the
//! engine. Amounts, rates and costs are all exact `Decimal`s and are never
//! converted to floating point; assets and times get their own wrappers so
//! that they can't be confused with each other.
//!

mod asset;
mod timestamp;

pub use asset::{Asset, AssetResolver};
pub use timestamp::{timestamp_to_date, Timestamp, TimestampFormatter};

/// Construct a decimal from an expression, e.g. decimal!(268.1) or decimal!("1.5")
#[macro_export]
macro_rules! decimal {
    ($num:expr) => {
        $num.to_string()
            .parse::<rust_decimal::Decimal>()
            .unwrap()
    };
}
