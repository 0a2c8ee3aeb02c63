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

//! Cost Basis
//!
//! Cost basis accounting for disposals of assets. Acquisitions are recorded
//! as lots; each disposal is matched against those lots under a chosen method
//! (FIFO, LIFO, HIFO or average cost basis) to work out how much of it is
//! taxable, how much is tax-free because of the holding period, and what the
//! matched amounts originally cost. Disposals that exceed the documented
//! acquisitions are recorded rather than rejected.
//!
//! The entry point is [cost_basis::CostBasisLedger]. [journal::Journal]
//! drives a ledger from a JSON file.
//!

#[macro_use]
pub mod units;

pub mod cost_basis;
pub mod csv;
mod error;
pub mod file;
pub mod journal;
pub mod logger;
pub mod settings;

pub use error::Error;
