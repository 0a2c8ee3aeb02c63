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

//! Accounting Settings
//!
//! The settings which select the lot-matching method and the holding period
//! after which disposals become tax-free. The remaining flags are carried
//! along for the surrounding pipeline, which decides which events reach the
//! engine at all; they have no effect on the matching itself.
//!

use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str};

/// A year, in seconds. The default tax-free holding period.
pub const YEAR_IN_SECONDS: i64 = 31_536_000;

/// The lot-matching method
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBasisMethod {
    /// First in, first out
    #[default]
    Fifo,
    /// Last in, first out
    Lifo,
    /// Highest (rate) in, first out
    Hifo,
    /// Average cost basis
    Acb,
}

impl CostBasisMethod {
    /// Whether this method tracks individual lots (as opposed to a pooled average)
    pub fn is_discrete(&self) -> bool {
        !matches!(*self, CostBasisMethod::Acb)
    }
}

impl str::FromStr for CostBasisMethod {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(CostBasisMethod::Fifo),
            "lifo" => Ok(CostBasisMethod::Lifo),
            "hifo" => Ok(CostBasisMethod::Hifo),
            "acb" => Ok(CostBasisMethod::Acb),
            _ => Err(Error::UnknownMethod(s.into())),
        }
    }
}

impl fmt::Display for CostBasisMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CostBasisMethod::Fifo => f.write_str("FIFO"),
            CostBasisMethod::Lifo => f.write_str("LIFO"),
            CostBasisMethod::Hifo => f.write_str("HIFO"),
            CostBasisMethod::Acb => f.write_str("ACB"),
        }
    }
}

/// Accounting settings
///
/// Every field is optional when deserializing; missing fields take their
/// default values.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// The lot-matching method
    pub cost_basis_method: CostBasisMethod,
    /// Holding period, in seconds, after which a disposal is tax-free. If
    /// unset, every disposal is taxable.
    pub taxfree_after_period: Option<i64>,
    /// Whether crypto-to-crypto trades are taxable events
    pub include_crypto2crypto: bool,
    /// Whether events before the report range count towards cost basis
    pub calculate_past_cost_basis: bool,
    /// Whether gas costs are accounted for
    pub include_gas_costs: bool,
    /// Whether deposits/withdrawals are accounted for
    pub account_for_assets_movements: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cost_basis_method: CostBasisMethod::Fifo,
            taxfree_after_period: Some(YEAR_IN_SECONDS),
            include_crypto2crypto: true,
            calculate_past_cost_basis: true,
            include_gas_costs: true,
            account_for_assets_movements: true,
        }
    }
}

impl Settings {
    /// The default settings, but with a specific cost basis method
    pub fn with_method(method: CostBasisMethod) -> Self {
        Settings {
            cost_basis_method: method,
            ..Default::default()
        }
    }
}
