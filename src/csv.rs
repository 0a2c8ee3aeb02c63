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

//! CSV
//!
//! Basic support for printing data in comma-separated-value format
//!

use crate::cost_basis::MissingAcquisition;
use crate::journal::{ReduceRecord, SpendRecord};
use crate::units::{Asset, Timestamp};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Trait for objects that can be printed in CSV format
pub trait PrintCsv {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

/// Wrapper around a `PrintCsv` used for println! etc
pub struct CsvPrinter<P: PrintCsv>(pub P);

impl<P: PrintCsv> fmt::Display for CsvPrinter<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.print(f)
    }
}

/// Header line matching the [PrintCsv] output of [SpendRecord]
pub const SPEND_HEADER: &str = "event,asset,date,spent,taxable,taxfree,taxable_cost,taxfree_cost,complete";
/// Header line matching the [PrintCsv] output of [ReduceRecord]
pub const REDUCE_HEADER: &str = "event,asset,date,amount,complete";
/// Header line matching the [PrintCsv] output of [MissingAcquisition]
pub const MISSING_HEADER: &str = "asset,date,found,missing";

impl PrintCsv for Timestamp {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Spreadsheets want an ISO date; if we can't render one, give them the raw number
        match OffsetDateTime::from_unix_timestamp(self.0)
            .ok()
            .and_then(|date| date.format(&Rfc3339).ok())
        {
            Some(s) => f.write_str(&s),
            None => write!(f, "{}", self.0),
        }
    }
}

impl PrintCsv for Asset {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.identifier().print(f)
    }
}

impl PrintCsv for bool {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if *self { "yes" } else { "no" })
    }
}

impl PrintCsv for SpendRecord {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (
            self.event_index,
            &self.asset,
            self.timestamp,
            self.info.spending_amount,
            self.info.taxable_amount,
            self.info.taxfree_amount,
            self.info.taxable_bought_cost,
            self.info.taxfree_bought_cost,
            self.info.is_complete,
        )
            .print(f)
    }
}

impl PrintCsv for ReduceRecord {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (
            self.event_index,
            &self.asset,
            self.timestamp,
            self.amount,
            self.complete,
        )
            .print(f)
    }
}

impl PrintCsv for MissingAcquisition {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (
            &self.asset,
            self.time,
            self.found_amount,
            self.missing_amount,
        )
            .print(f)
    }
}

macro_rules! impl_display {
    ($ty:ty) => {
        impl PrintCsv for $ty {
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

impl_display!(usize);
impl_display!(i64);
impl_display!(u64);
impl_display!(rust_decimal::Decimal);

macro_rules! impl_string {
    ($ty:ty) => {
        impl PrintCsv for $ty {
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if self.contains(',') || self.contains('"') {
                    write!(f, "\"{}\"", self.replace('"', "\"\""))
                } else {
                    write!(f, "{}", self)
                }
            }
        }
    };
}

impl_string!(String);
impl_string!(str);

macro_rules! impl_tuple {
    ($($ty:ident $idx:tt)*) => {
        impl<$($ty: PrintCsv,)*> PrintCsv for ($($ty,)*) {
            #[allow(unused_assignments)]
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                let mut comma = false;
                $(
                    if comma {
                        f.write_str(",")?;
                    }
                    self.$idx.print(f)?;
                    comma = true;
                )*
                Ok(())
            }
        }
    }
}

impl_tuple!(A 0 B 1);
impl_tuple!(A 0 B 1 C 2);
impl_tuple!(A 0 B 1 C 2 D 3);
impl_tuple!(A 0 B 1 C 2 D 3 E 4);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 I 8);

impl<P: PrintCsv> PrintCsv for Option<P> {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Some(p) => p.print(f),
            None => Ok(()), // "write the empty string"
        }
    }
}

impl<'a, P: PrintCsv + ?Sized> PrintCsv for &'a P {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (**self).print(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_basis::CostBasisInfo;

    #[test]
    fn print_missing() {
        let missing = MissingAcquisition {
            asset: "ETH".into(),
            time: Timestamp(1446979735),
            found_amount: decimal!(2),
            missing_amount: decimal!(1.5),
        };
        assert_eq!(
            CsvPrinter(&missing).to_string(),
            "ETH,2015-11-08T10:48:55Z,2,1.5",
        );
    }

    #[test]
    fn print_spend() {
        let record = SpendRecord {
            event_index: 3,
            asset: "BTC, wrapped".into(),
            timestamp: Timestamp(1480683904),
            info: CostBasisInfo {
                spending_amount: decimal!(8),
                taxable_amount: decimal!(3),
                taxfree_amount: decimal!(5),
                taxable_bought_cost: decimal!(1837.35),
                taxfree_bought_cost: decimal!(1340.5),
                matched_acquisitions: vec![],
                is_complete: true,
            },
        };
        assert_eq!(
            CsvPrinter(record).to_string(),
            "3,\"BTC, wrapped\",2016-12-02T13:05:04Z,8,3,5,1837.35,1340.5,yes",
        );
        assert_eq!(SPEND_HEADER.split(',').count(), 9);
    }

    #[test]
    fn print_reduce() {
        let record = ReduceRecord {
            event_index: 0,
            asset: "ETH".into(),
            timestamp: Timestamp(i64::MAX),
            amount: decimal!(1),
            complete: false,
        };
        assert_eq!(
            CsvPrinter(record).to_string(),
            format!("0,ETH,{},1,no", i64::MAX),
        );
    }
}
