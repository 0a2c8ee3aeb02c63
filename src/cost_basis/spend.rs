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

//! Spends
//!
//! The result of matching a disposal against an inventory, and the context
//! (settings plus caller-owned logs) that a match is performed in.
//!

use super::lot::MatchedAcquisition;
use crate::settings::Settings;
use crate::units::{Asset, Timestamp, TimestampFormatter};
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A disposal which could not be (fully) matched against documented acquisitions
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MissingAcquisition {
    /// The asset as named by the disposal (not necessarily the canonical one)
    pub asset: Asset,
    /// Time of the disposal
    pub time: Timestamp,
    /// Amount which was matched
    pub found_amount: Decimal,
    /// Amount which could not be matched
    pub missing_amount: Decimal,
}

impl fmt::Display for MissingAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} on {}: found {}, missing {}",
            self.asset, self.time, self.found_amount, self.missing_amount,
        )
    }
}

/// Cost basis breakdown of a single disposal
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct CostBasisInfo {
    /// The amount that was asked for
    pub spending_amount: Decimal,
    /// Amount whose disposal is taxable
    pub taxable_amount: Decimal,
    /// Amount whose disposal is tax-free because of the holding period
    pub taxfree_amount: Decimal,
    /// Cost basis of the taxable amount
    pub taxable_bought_cost: Decimal,
    /// Cost basis of the tax-free amount
    pub taxfree_bought_cost: Decimal,
    /// The lot fragments used, in the order they were consumed
    ///
    /// Always empty for the average cost basis method.
    pub matched_acquisitions: Vec<MatchedAcquisition>,
    /// Whether the full spending amount was covered
    pub is_complete: bool,
}

impl CostBasisInfo {
    /// An empty breakdown for a disposal of `spending_amount`
    pub(crate) fn new(spending_amount: Decimal) -> Self {
        CostBasisInfo {
            spending_amount,
            ..Default::default()
        }
    }

    /// Adds a matched lot fragment to the breakdown
    pub(crate) fn record(&mut self, fragment: MatchedAcquisition, taxfree: bool) {
        let cost = fragment.bought_cost();
        if taxfree {
            self.taxfree_amount += fragment.amount;
            self.taxfree_bought_cost += cost;
        } else {
            self.taxable_amount += fragment.amount;
            self.taxable_bought_cost += cost;
        }
        self.matched_acquisitions.push(fragment);
    }

    /// Total amount covered by the breakdown
    pub fn matched_amount(&self) -> Decimal {
        self.taxable_amount + self.taxfree_amount
    }

    /// Amount of the disposal not covered by the breakdown
    pub fn missing_amount(&self) -> Decimal {
        self.spending_amount - self.matched_amount()
    }

    /// Total cost basis, taxable and tax-free
    pub fn bought_cost(&self) -> Decimal {
        self.taxable_bought_cost + self.taxfree_bought_cost
    }
}

/// Everything a match needs besides the inventory itself
///
/// The two logs belong to the caller. A match only ever appends to them.
pub struct SpendContext<'a> {
    /// Shortfall log; one entry is appended per incomplete match
    pub missing_acquisitions: &'a mut Vec<MissingAcquisition>,
    /// Fragment log; every matched fragment is appended
    pub used_acquisitions: &'a mut Vec<MatchedAcquisition>,
    /// Active settings
    pub settings: &'a Settings,
    /// Renders timestamps in log messages
    pub timestamp_to_date: TimestampFormatter,
}

impl<'a> SpendContext<'a> {
    /// Records a shortfall
    pub(crate) fn log_missing(
        &mut self,
        asset: &Asset,
        time: Timestamp,
        found_amount: Decimal,
        missing_amount: Decimal,
    ) {
        warn!(
            "No documented acquisition found for {} {} before {} (found only {})",
            missing_amount,
            asset,
            (self.timestamp_to_date)(time),
            found_amount,
        );
        self.missing_acquisitions.push(MissingAcquisition {
            asset: asset.clone(),
            time,
            found_amount,
            missing_amount,
        });
    }
}
