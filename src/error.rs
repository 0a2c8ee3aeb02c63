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

//! Errors
//!
//! Input-validation failures. Note that selling more than was ever bought
//! is NOT an error; it is an accounting anomaly which is recorded as a
//! [crate::cost_basis::MissingAcquisition] and reported as data.
//!

use crate::units::Asset;
use rust_decimal::Decimal;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// A spend or reduction of a negative amount
    NegativeSpend(Decimal),
    /// An acquisition of a negative amount
    NegativeAcquisition(Decimal),
    /// An acquisition at a negative rate
    NegativeRate(Decimal),
    /// A cost basis method name we don't know about
    UnknownMethod(String),
    /// An equivalence which would make an asset an alias of itself
    EquivalenceCycle(Asset),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NegativeSpend(n) => write!(f, "cannot spend negative amount {n}"),
            Error::NegativeAcquisition(n) => write!(f, "cannot acquire negative amount {n}"),
            Error::NegativeRate(n) => write!(f, "acquisition rate {n} is negative"),
            Error::UnknownMethod(ref s) => write!(
                f,
                "unknown cost basis method {s} (expected one of fifo, lifo, hifo, acb)"
            ),
            Error::EquivalenceCycle(ref asset) => {
                write!(f, "asset {asset} cannot be made equivalent to itself")
            }
        }
    }
}

impl std::error::Error for Error {}
