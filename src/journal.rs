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

//! Journals
//!
//! A journal is a JSON file holding accounting settings, any extra asset
//! equivalences, and an ordered list of already-classified events. Replaying
//! it drives a [CostBasisLedger] through those events and collects the
//! results into a [Report].
//!
//! Events are processed strictly in the order they appear in the file; their
//! timestamps are only used for the holding-period test and for reporting.
//!

use crate::cost_basis::{AcquisitionEvent, CostBasisInfo, CostBasisLedger, MissingAcquisition};
use crate::settings::{CostBasisMethod, Settings};
use crate::units::{Asset, AssetResolver, Timestamp};
use anyhow::Context;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, io, path};

/// A single classified event
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JournalEvent {
    /// Some amount of an asset was acquired at some rate
    Acquisition {
        asset: Asset,
        timestamp: Timestamp,
        amount: Decimal,
        rate: Decimal,
    },
    /// Some amount of an asset was disposed of in a taxable way
    Spend {
        asset: Asset,
        timestamp: Timestamp,
        amount: Decimal,
    },
    /// Some amount of an asset left the books without tax consequences
    Reduce {
        asset: Asset,
        timestamp: Timestamp,
        amount: Decimal,
    },
}

/// A journal file
#[derive(Clone, PartialEq, Eq, Debug, Default, Deserialize, Serialize)]
pub struct Journal {
    /// Accounting settings
    #[serde(default)]
    pub settings: Settings,
    /// Extra equivalences, alias to canonical, on top of the built-in ones
    #[serde(default)]
    pub equivalences: BTreeMap<Asset, Asset>,
    /// The events, in processing order
    #[serde(default)]
    pub events: Vec<JournalEvent>,
}

/// Result of replaying a single spend event
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SpendRecord {
    /// Position of the event in the journal, counting from 0
    pub event_index: usize,
    /// The asset as named by the event
    pub asset: Asset,
    /// Time of the spend
    pub timestamp: Timestamp,
    /// The cost basis breakdown
    pub info: CostBasisInfo,
}

/// Result of replaying a single reduce event
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ReduceRecord {
    /// Position of the event in the journal, counting from 0
    pub event_index: usize,
    /// The asset as named by the event
    pub asset: Asset,
    /// Time of the reduction
    pub timestamp: Timestamp,
    /// The amount to be removed
    pub amount: Decimal,
    /// Whether the full amount was available
    pub complete: bool,
}

/// Running totals for one canonical asset
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct Totals {
    /// Amount spent which was matched and is taxable
    pub taxable_amount: Decimal,
    /// Amount spent which was matched and held past the tax-free period
    pub taxfree_amount: Decimal,
    /// Acquisition cost of the taxable amount
    pub taxable_bought_cost: Decimal,
    /// Acquisition cost of the tax-free amount
    pub taxfree_bought_cost: Decimal,
    /// Amount spent which could not be matched against any acquisition
    pub unmatched_amount: Decimal,
}

impl Totals {
    fn add(&mut self, info: &CostBasisInfo) {
        self.taxable_amount += info.taxable_amount;
        self.taxfree_amount += info.taxfree_amount;
        self.taxable_bought_cost += info.taxable_bought_cost;
        self.taxfree_bought_cost += info.taxfree_bought_cost;
        self.unmatched_amount += info.missing_amount();
    }
}

/// The outcome of replaying a journal
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Report {
    /// The method the journal was replayed under
    pub method: CostBasisMethod,
    /// Every spend, in journal order
    pub spends: Vec<SpendRecord>,
    /// Every reduction, in journal order
    pub reductions: Vec<ReduceRecord>,
    /// Every shortfall, in journal order
    pub missing_acquisitions: Vec<MissingAcquisition>,
    /// Totals of the spends, by canonical asset
    pub totals: BTreeMap<Asset, Totals>,
}

impl Journal {
    /// Reads a journal from a file
    pub fn load<P: AsRef<path::Path>>(filepath: P) -> Result<Self, anyhow::Error> {
        let filename = filepath.as_ref().to_string_lossy();
        let fh = fs::File::open(filepath.as_ref())
            .with_context(|| format!("opening journal {filename}"))?;
        let bf = io::BufReader::new(fh);
        let journal: Journal = serde_json::from_reader(bf)
            .with_context(|| format!("parsing journal {filename}"))?;
        info!(
            "Loaded journal {} ({} events, method {}).",
            filename,
            journal.events.len(),
            journal.settings.cost_basis_method,
        );
        Ok(journal)
    }

    /// Overrides the cost basis method
    pub fn with_method(mut self, method: CostBasisMethod) -> Self {
        self.settings.cost_basis_method = method;
        self
    }

    /// Builds the equivalence table for this journal
    pub fn resolver(&self) -> Result<AssetResolver, anyhow::Error> {
        let mut resolver = AssetResolver::new();
        for (alias, canonical) in &self.equivalences {
            resolver
                .add_equivalence(alias.clone(), canonical.clone())
                .with_context(|| format!("adding equivalence {alias} -> {canonical}"))?;
        }
        Ok(resolver)
    }

    /// Runs every event through a fresh ledger
    pub fn replay(&self) -> Result<Report, anyhow::Error> {
        let mut ledger = CostBasisLedger::with_resolver(self.settings.clone(), self.resolver()?);
        let mut spends = vec![];
        let mut reductions = vec![];
        let mut totals = BTreeMap::<Asset, Totals>::new();
        let mut acquisition_count = 0;

        for (n, event) in self.events.iter().enumerate() {
            match *event {
                JournalEvent::Acquisition {
                    ref asset,
                    timestamp,
                    amount,
                    rate,
                } => {
                    acquisition_count += 1;
                    let lot = AcquisitionEvent::new(amount, timestamp, rate, acquisition_count)
                        .with_context(|| format!("journal event {n}"))?;
                    ledger.add_acquisition(asset, lot);
                }
                JournalEvent::Spend {
                    ref asset,
                    timestamp,
                    amount,
                } => {
                    let info = ledger
                        .calculate_spend_cost_basis(amount, asset, timestamp)
                        .with_context(|| format!("journal event {n}"))?;
                    totals
                        .entry(ledger.resolver().canonical(asset))
                        .or_default()
                        .add(&info);
                    spends.push(SpendRecord {
                        event_index: n,
                        asset: asset.clone(),
                        timestamp,
                        info,
                    });
                }
                JournalEvent::Reduce {
                    ref asset,
                    timestamp,
                    amount,
                } => {
                    let complete = ledger
                        .reduce_asset_amount(asset, amount, timestamp)
                        .with_context(|| format!("journal event {n}"))?;
                    if !complete {
                        debug!("reduction of {} {} (event {}) incomplete", amount, asset, n);
                    }
                    reductions.push(ReduceRecord {
                        event_index: n,
                        asset: asset.clone(),
                        timestamp,
                        amount,
                        complete,
                    });
                }
            }
        }

        let missing_acquisitions = ledger.missing_acquisitions().to_vec();
        if !missing_acquisitions.is_empty() {
            warn!(
                "{} disposals could not be fully matched against acquisitions.",
                missing_acquisitions.len(),
            );
        }
        Ok(Report {
            method: self.settings.cost_basis_method,
            spends,
            reductions,
            missing_acquisitions,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIFO_JOURNAL: &str = r#"{
        "events": [
            { "type": "acquisition", "asset": "BTC", "timestamp": 1446979735, "amount": "5", "rate": "268.1" },
            { "type": "acquisition", "asset": "BTC", "timestamp": 1467378304, "amount": "15", "rate": "612.45" },
            { "type": "acquisition", "asset": "BTC", "timestamp": 1477378304, "amount": "3", "rate": "603.415" },
            { "type": "spend", "asset": "BTC", "timestamp": 1480683904, "amount": "8" }
        ]
    }"#;

    #[test]
    fn replay_fifo() {
        let journal: Journal = serde_json::from_str(FIFO_JOURNAL).unwrap();
        assert_eq!(journal.settings, Settings::default());
        let report = journal.replay().unwrap();

        assert_eq!(report.method, CostBasisMethod::Fifo);
        assert_eq!(report.spends.len(), 1);
        let spend = &report.spends[0];
        assert_eq!(spend.event_index, 3);
        assert_eq!(spend.info.taxable_amount, decimal!(3));
        assert_eq!(spend.info.taxfree_bought_cost, decimal!(1340.5));
        assert_eq!(spend.info.taxable_bought_cost, decimal!(1837.35));
        assert_eq!(spend.info.matched_acquisitions[0].event.index(), 1);
        assert_eq!(spend.info.matched_acquisitions[1].event.index(), 2);
        assert!(report.missing_acquisitions.is_empty());

        let btc = &report.totals[&Asset::from("BTC")];
        assert_eq!(btc.taxfree_amount, decimal!(5));
        assert_eq!(btc.unmatched_amount, Decimal::ZERO);
    }

    #[test]
    fn replay_other_methods() {
        let journal: Journal = serde_json::from_str(FIFO_JOURNAL).unwrap();

        // LIFO: 3 from the last lot, 5 from the middle one, nothing tax-free
        let report = journal.clone().with_method(CostBasisMethod::Lifo).replay().unwrap();
        let info = &report.spends[0].info;
        assert_eq!(info.taxfree_amount, Decimal::ZERO);
        assert_eq!(info.taxable_bought_cost, decimal!(4872.495));

        // HIFO: 8 from the 612.45 lot
        let report = journal.clone().with_method(CostBasisMethod::Hifo).replay().unwrap();
        let info = &report.spends[0].info;
        assert_eq!(info.matched_acquisitions.len(), 1);
        assert_eq!(info.taxable_bought_cost, decimal!(4899.6));

        // ACB: 8/23 of the pooled cost
        let report = journal.with_method(CostBasisMethod::Acb).replay().unwrap();
        let info = &report.spends[0].info;
        assert!(info.matched_acquisitions.is_empty());
        assert_eq!(info.taxable_amount, decimal!(8));
        assert_eq!(report.method, CostBasisMethod::Acb);
    }

    #[test]
    fn replay_equivalences_and_shortfalls() {
        let journal: Journal = serde_json::from_str(
            r#"{
                "settings": { "cost_basis_method": "fifo", "taxfree_after_period": null },
                "equivalences": { "WBTC": "BTC" },
                "events": [
                    { "type": "reduce", "asset": "ETH", "timestamp": 1, "amount": "1" },
                    { "type": "acquisition", "asset": "WETH", "timestamp": 2, "amount": "2", "rate": "1" },
                    { "type": "reduce", "asset": "ETH", "timestamp": 3, "amount": "1.5" },
                    { "type": "acquisition", "asset": "BTC", "timestamp": 4, "amount": "1", "rate": "100" },
                    { "type": "spend", "asset": "WBTC", "timestamp": 5, "amount": "3" }
                ]
            }"#,
        )
        .unwrap();
        let report = journal.replay().unwrap();

        assert_eq!(report.reductions.len(), 2);
        assert!(!report.reductions[0].complete);
        assert!(report.reductions[1].complete);

        assert_eq!(report.spends.len(), 1);
        assert!(!report.spends[0].info.is_complete);
        assert_eq!(report.spends[0].asset, Asset::from("WBTC"));
        assert_eq!(
            report.missing_acquisitions,
            vec![MissingAcquisition {
                asset: "WBTC".into(),
                time: Timestamp(5),
                found_amount: decimal!(1),
                missing_amount: decimal!(2),
            }],
        );
        let btc = &report.totals[&Asset::from("BTC")];
        assert_eq!(btc.taxable_amount, decimal!(1));
        assert_eq!(btc.taxable_bought_cost, decimal!(100));
        assert_eq!(btc.unmatched_amount, decimal!(2));
    }

    #[test]
    fn replay_acb_shortfall_totals() {
        let journal: Journal = serde_json::from_str(
            r#"{
                "settings": { "cost_basis_method": "acb", "taxfree_after_period": null },
                "events": [
                    { "type": "acquisition", "asset": "BTC", "timestamp": 1, "amount": "2", "rate": "100" },
                    { "type": "spend", "asset": "BTC", "timestamp": 2, "amount": "3.5" }
                ]
            }"#,
        )
        .unwrap();
        let report = journal.replay().unwrap();

        let info = &report.spends[0].info;
        assert!(!info.is_complete);
        assert_eq!(info.taxable_amount, decimal!(2));
        assert_eq!(report.missing_acquisitions.len(), 1);
        assert_eq!(report.missing_acquisitions[0].missing_amount, decimal!(1.5));
        assert_eq!(info.missing_amount(), report.missing_acquisitions[0].missing_amount);

        let btc = &report.totals[&Asset::from("BTC")];
        assert_eq!(btc.taxable_amount, decimal!(2));
        assert_eq!(btc.unmatched_amount, decimal!(1.5));
    }

    #[test]
    fn replay_rejects_bad_events() {
        let journal: Journal = serde_json::from_str(
            r#"{ "events": [ { "type": "spend", "asset": "BTC", "timestamp": 1, "amount": "-1" } ] }"#,
        )
        .unwrap();
        assert!(journal.replay().is_err());

        let journal: Journal = serde_json::from_str(r#"{ "equivalences": { "ETH": "WETH" } }"#)
            .unwrap();
        assert!(journal.replay().is_err());

        assert!(serde_json::from_str::<Journal>(
            r#"{ "events": [ { "type": "gift", "asset": "BTC", "timestamp": 1, "amount": "1" } ] }"#
        )
        .is_err());
    }
}
