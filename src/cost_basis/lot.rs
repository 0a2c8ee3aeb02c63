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

//! Lots
//!
//! Acquisition events, which are the "lots" that disposals are matched
//! against, and the fragments produced by matching.
//!

use crate::units::Timestamp;
use crate::Error;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// An acquisition of some amount of an asset at some rate
///
/// Everything but the remaining amount is fixed at construction. The
/// remaining amount only ever goes down, and only as a result of matching
/// a disposal against the lot.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct AcquisitionEvent {
    amount: Decimal,
    remaining_amount: Decimal,
    rate: Decimal,
    timestamp: Timestamp,
    index: u64,
}

impl fmt::Display for AcquisitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "acquisition #{} {{ {} of {} @ {} on {} }}",
            self.index, self.remaining_amount, self.amount, self.rate, self.timestamp,
        )
    }
}

impl AcquisitionEvent {
    /// Constructs a new, unconsumed, acquisition
    ///
    /// The index is the identity of the event within the caller's event
    /// stream and is expected to increase with each acquisition.
    pub fn new(
        amount: Decimal,
        timestamp: Timestamp,
        rate: Decimal,
        index: u64,
    ) -> Result<AcquisitionEvent, Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::NegativeAcquisition(amount));
        }
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(Error::NegativeRate(rate));
        }
        Ok(AcquisitionEvent {
            amount,
            remaining_amount: amount,
            rate,
            timestamp,
            index,
        })
    }

    /// Accessor for the originally acquired amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Accessor for the amount not yet matched against any disposal
    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    /// Accessor for the per-unit rate
    ///
    /// This is NOT the cost basis; multiply by an amount to get that.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Accessor for the acquisition time
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Accessor for the index
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Whether the lot has been used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining_amount.is_zero()
    }

    /// Cost basis of the unconsumed part of the lot
    pub fn remaining_cost(&self) -> Decimal {
        self.remaining_amount * self.rate
    }

    /// Whether a disposal of this lot at `timestamp` is tax-free
    pub fn is_taxfree_at(&self, timestamp: Timestamp, taxfree_after_period: Option<i64>) -> bool {
        match taxfree_after_period {
            Some(period) => self.timestamp.held_longer_than(period, timestamp),
            None => false,
        }
    }

    /// Takes up to `wanted` from the lot, returning the amount actually taken
    pub(crate) fn consume(&mut self, wanted: Decimal) -> Decimal {
        let taken = self.remaining_amount.min(wanted);
        self.remaining_amount -= taken;
        taken
    }
}

/// A piece of a disposal that was matched against a single lot
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MatchedAcquisition {
    /// The amount taken from the lot
    pub amount: Decimal,
    /// The lot as it was immediately after this match
    pub event: AcquisitionEvent,
}

impl fmt::Display for MatchedAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} from {}", self.amount, self.event)
    }
}

impl MatchedAcquisition {
    /// The cost basis of the matched amount
    pub fn bought_cost(&self) -> Decimal {
        self.amount * self.event.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct() {
        let lot = AcquisitionEvent::new(decimal!(5), Timestamp(1446979735), decimal!(268.1), 1)
            .unwrap();
        assert_eq!(lot.amount(), decimal!(5));
        assert_eq!(lot.remaining_amount(), decimal!(5));
        assert_eq!(lot.remaining_cost(), decimal!(1340.5));
        assert!(!lot.is_exhausted());

        assert_eq!(
            AcquisitionEvent::new(decimal!(-1), Timestamp(0), decimal!(1), 1),
            Err(Error::NegativeAcquisition(decimal!(-1))),
        );
        assert_eq!(
            AcquisitionEvent::new(decimal!(1), Timestamp(0), decimal!(-0.5), 1),
            Err(Error::NegativeRate(decimal!(-0.5))),
        );
        // Free acquisitions (airdrops etc) are fine
        assert!(AcquisitionEvent::new(decimal!(1), Timestamp(0), Decimal::ZERO, 1).is_ok());
    }

    #[test]
    fn consume_partial_then_full() {
        let mut lot = AcquisitionEvent::new(decimal!(5), Timestamp(0), decimal!(2), 1).unwrap();
        assert_eq!(lot.consume(decimal!(3)), decimal!(3));
        assert_eq!(lot.remaining_amount(), decimal!(2));
        assert_eq!(lot.amount(), decimal!(5));
        assert_eq!(lot.consume(decimal!(10)), decimal!(2));
        assert!(lot.is_exhausted());
        assert_eq!(lot.consume(decimal!(1)), Decimal::ZERO);
    }

    #[test]
    fn taxfree() {
        let lot = AcquisitionEvent::new(decimal!(1), Timestamp(100), decimal!(1), 1).unwrap();
        assert!(!lot.is_taxfree_at(Timestamp(1_000_000), None));
        assert!(lot.is_taxfree_at(Timestamp(111), Some(10)));
        assert!(!lot.is_taxfree_at(Timestamp(110), Some(10)));
    }
}
