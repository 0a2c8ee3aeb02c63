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

//! Lot Inventories
//!
//! The per-asset store of acquisitions, and the matching of disposals
//! against it.
//!
//! FIFO, LIFO and HIFO keep discrete lots in a map ordered by a per-method
//! key, so the next lot to consume is always the first entry, and they all
//! share one consumption routine. Average cost basis does not track lots at
//! all; it pools every acquisition into a total amount and a total cost.
//!

use super::lot::{AcquisitionEvent, MatchedAcquisition};
use super::spend::{CostBasisInfo, SpendContext};
use crate::settings::CostBasisMethod;
use crate::units::{Asset, Timestamp};
use crate::Error;
use log::debug;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Log target for individual lot matches
pub const MATCH_LOG_TARGET: &str = "lot_matches";

/// Consumption order of discrete lots
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LotOrder {
    /// Oldest insertion first
    Fifo,
    /// Newest insertion first
    Lifo,
    /// Highest rate first
    Hifo,
}

/// Position of a lot within a [DiscreteLots] map
///
/// A given map only ever contains keys of a single variant. The trailing
/// insertion counter makes every key unique.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum LotKey {
    Fifo(u64),
    Lifo(Reverse<u64>),
    /// Rate descending; equal rates go by index descending, then insertion
    Hifo(Reverse<Decimal>, Reverse<u64>, u64),
}

impl LotOrder {
    fn key(self, lot: &AcquisitionEvent, seq: u64) -> LotKey {
        match self {
            LotOrder::Fifo => LotKey::Fifo(seq),
            LotOrder::Lifo => LotKey::Lifo(Reverse(seq)),
            LotOrder::Hifo => LotKey::Hifo(Reverse(lot.rate()), Reverse(lot.index()), seq),
        }
    }
}

/// Discrete lots, kept in consumption order
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DiscreteLots {
    order: LotOrder,
    lots: BTreeMap<LotKey, AcquisitionEvent>,
    next_seq: u64,
}

impl DiscreteLots {
    /// Constructs a new empty set of lots
    pub fn new(order: LotOrder) -> Self {
        DiscreteLots {
            order,
            lots: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Accessor for the consumption order
    pub fn order(&self) -> LotOrder {
        self.order
    }

    /// Adds a lot. Lots with nothing remaining are dropped.
    pub fn add_acquisition(&mut self, lot: AcquisitionEvent) {
        if lot.is_exhausted() {
            debug!("ignoring empty {}", lot);
            return;
        }
        let key = self.order.key(&lot, self.next_seq);
        self.next_seq += 1;
        // If this assertion fails it means we somehow used `next_seq` twice
        assert!(self.lots.insert(key, lot).is_none());
    }

    /// Iterator over the lots in consumption order
    pub fn iter(&self) -> impl Iterator<Item = &AcquisitionEvent> {
        self.lots.values()
    }

    /// Number of lots with something remaining
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Whether there are no lots left
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Total unconsumed amount
    pub fn remaining_amount(&self) -> Decimal {
        self.lots.values().map(AcquisitionEvent::remaining_amount).sum()
    }

    /// Total cost basis of the unconsumed amounts
    pub fn remaining_cost(&self) -> Decimal {
        self.lots.values().map(AcquisitionEvent::remaining_cost).sum()
    }

    /// Consumes lots in order until `info.spending_amount` is covered or
    /// the lots run out. Returns the amount covered.
    fn consume(
        &mut self,
        info: &mut CostBasisInfo,
        timestamp: Timestamp,
        taxfree_after_period: Option<i64>,
    ) -> Decimal {
        let mut still_needed = info.spending_amount;
        while still_needed > Decimal::ZERO {
            let mut entry = match self.lots.first_entry() {
                Some(entry) => entry,
                None => break,
            };
            let taken = entry.get_mut().consume(still_needed);
            still_needed -= taken;

            let lot = if entry.get().is_exhausted() {
                entry.remove()
            } else {
                entry.get().clone()
            };
            let taxfree = lot.is_taxfree_at(timestamp, taxfree_after_period);
            debug!(
                target: MATCH_LOG_TARGET,
                "matched {} ({}) against {}",
                taken,
                if taxfree { "tax-free" } else { "taxable" },
                lot,
            );
            info.record(
                MatchedAcquisition {
                    amount: taken,
                    event: lot,
                },
                taxfree,
            );
        }
        info.spending_amount - still_needed
    }
}

/// A pooled inventory, for the average cost basis method
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct AverageCost {
    remaining_amount: Decimal,
    current_average_cost_basis: Decimal,
    pooled: usize,
}

impl AverageCost {
    /// Constructs a new empty pool
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an acquisition to the pool
    pub fn add_acquisition(&mut self, lot: &AcquisitionEvent) {
        self.remaining_amount += lot.remaining_amount();
        self.current_average_cost_basis += lot.remaining_cost();
        if !lot.is_exhausted() {
            self.pooled += 1;
        }
    }

    /// Total amount in the pool
    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    /// Total cost basis of the pool
    ///
    /// Note this is a total, not a per-unit, cost. It goes negative when more
    /// is disposed of than was in the pool; later acquisitions offset it.
    pub fn current_average_cost_basis(&self) -> Decimal {
        self.current_average_cost_basis
    }

    /// Number of acquisitions pooled since the pool was last emptied
    pub fn len(&self) -> usize {
        self.pooled
    }

    /// Whether the pool holds nothing
    pub fn is_empty(&self) -> bool {
        self.pooled == 0
    }

    /// Attributes a proportional share of the pool's cost to the disposal.
    /// Returns the amount covered by the pool.
    fn consume(&mut self, info: &mut CostBasisInfo) -> Decimal {
        let spending = info.spending_amount;
        let before = self.remaining_amount;
        if spending.is_zero() || before <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let covered = spending.min(before);
        info.taxable_amount = covered;

        let attributed = self.current_average_cost_basis * spending / before;
        info.taxable_bought_cost = attributed;
        self.current_average_cost_basis -= attributed;
        debug!(
            target: MATCH_LOG_TARGET,
            "attributed {} of pooled cost to {} of {} (pool cost now {})",
            attributed,
            spending,
            before,
            self.current_average_cost_basis,
        );

        self.remaining_amount -= covered;
        if self.remaining_amount.is_zero() {
            self.pooled = 0;
        }
        covered
    }
}

/// The acquisitions of one asset, under one cost basis method
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LotInventory {
    /// FIFO, LIFO or HIFO
    Discrete(DiscreteLots),
    /// Average cost basis
    Average(AverageCost),
}

impl LotInventory {
    /// Constructs a new empty inventory for the given method
    pub fn new(method: CostBasisMethod) -> Self {
        match method {
            CostBasisMethod::Fifo => LotInventory::Discrete(DiscreteLots::new(LotOrder::Fifo)),
            CostBasisMethod::Lifo => LotInventory::Discrete(DiscreteLots::new(LotOrder::Lifo)),
            CostBasisMethod::Hifo => LotInventory::Discrete(DiscreteLots::new(LotOrder::Hifo)),
            CostBasisMethod::Acb => LotInventory::Average(AverageCost::new()),
        }
    }

    /// The method this inventory implements
    pub fn method(&self) -> CostBasisMethod {
        match *self {
            LotInventory::Discrete(ref lots) => match lots.order() {
                LotOrder::Fifo => CostBasisMethod::Fifo,
                LotOrder::Lifo => CostBasisMethod::Lifo,
                LotOrder::Hifo => CostBasisMethod::Hifo,
            },
            LotInventory::Average(..) => CostBasisMethod::Acb,
        }
    }

    /// Adds an acquisition
    pub fn add_acquisition(&mut self, lot: AcquisitionEvent) {
        debug!("adding {} under {}", lot, self.method());
        match *self {
            LotInventory::Discrete(ref mut lots) => lots.add_acquisition(lot),
            LotInventory::Average(ref mut pool) => pool.add_acquisition(&lot),
        }
    }

    /// The lots which still have something remaining, in consumption order
    ///
    /// Always empty for the average cost basis method, which doesn't keep lots.
    pub fn get_acquisitions(&self) -> Vec<&AcquisitionEvent> {
        match *self {
            LotInventory::Discrete(ref lots) => lots.iter().collect(),
            LotInventory::Average(..) => vec![],
        }
    }

    /// Number of lots with something remaining (see [AverageCost::len] for ACB)
    pub fn len(&self) -> usize {
        match *self {
            LotInventory::Discrete(ref lots) => lots.len(),
            LotInventory::Average(ref pool) => pool.len(),
        }
    }

    /// Whether nothing is available to match against
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total unconsumed amount
    pub fn remaining_amount(&self) -> Decimal {
        match *self {
            LotInventory::Discrete(ref lots) => lots.remaining_amount(),
            LotInventory::Average(ref pool) => pool.remaining_amount(),
        }
    }

    /// Total cost basis of the unconsumed amount
    pub fn current_average_cost_basis(&self) -> Decimal {
        match *self {
            LotInventory::Discrete(ref lots) => lots.remaining_cost(),
            LotInventory::Average(ref pool) => pool.current_average_cost_basis(),
        }
    }

    /// Matches a disposal against the inventory, consuming lots
    ///
    /// Every matched fragment is appended to `ctx.used_acquisitions`. If the
    /// inventory cannot cover the whole amount, a single entry is appended to
    /// `ctx.missing_acquisitions` and the result is marked incomplete.
    pub fn calculate_spend_cost_basis(
        &mut self,
        spending_amount: Decimal,
        spending_asset: &Asset,
        timestamp: Timestamp,
        mut ctx: SpendContext<'_>,
    ) -> Result<CostBasisInfo, Error> {
        if spending_amount.is_sign_negative() && !spending_amount.is_zero() {
            return Err(Error::NegativeSpend(spending_amount));
        }

        let mut info = CostBasisInfo::new(spending_amount);
        let found = match *self {
            LotInventory::Discrete(ref mut lots) => {
                lots.consume(&mut info, timestamp, ctx.settings.taxfree_after_period)
            }
            LotInventory::Average(ref mut pool) => pool.consume(&mut info),
        };
        ctx.used_acquisitions
            .extend(info.matched_acquisitions.iter().cloned());

        info.is_complete = found == spending_amount;
        if !info.is_complete {
            ctx.log_missing(spending_asset, timestamp, found, spending_amount - found);
        }
        debug!(
            "spent {} {} on {}: taxable {} (cost {}), tax-free {} (cost {}), complete: {}",
            spending_amount,
            spending_asset,
            (ctx.timestamp_to_date)(timestamp),
            info.taxable_amount,
            info.taxable_bought_cost,
            info.taxfree_amount,
            info.taxfree_bought_cost,
            info.is_complete,
        );
        Ok(info)
    }
}
