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

//! Cost Basis Ledger
//!
//! The top-level accounting object. Holds one lot inventory per canonical
//! asset, all under the same cost basis method, along with the log of
//! disposals that could not be matched against documented acquisitions.
//!

mod inventory;
mod lot;
mod spend;

pub use self::inventory::{AverageCost, DiscreteLots, LotInventory, LotOrder, MATCH_LOG_TARGET};
pub use self::lot::{AcquisitionEvent, MatchedAcquisition};
pub use self::spend::{CostBasisInfo, MissingAcquisition, SpendContext};

use crate::settings::{CostBasisMethod, Settings};
use crate::units::{timestamp_to_date, Asset, AssetResolver, Timestamp, TimestampFormatter};
use crate::Error;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Everything the ledger tracks about one (canonical) asset
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AssetEvents {
    /// Acquisitions not yet disposed of
    pub inventory: LotInventory,
    /// Every lot fragment matched against a disposal of this asset, in order
    pub used_acquisitions: Vec<MatchedAcquisition>,
}

impl AssetEvents {
    /// Constructs a new empty set of events
    pub fn new(method: CostBasisMethod) -> Self {
        AssetEvents {
            inventory: LotInventory::new(method),
            used_acquisitions: vec![],
        }
    }
}

/// The cost basis ledger
pub struct CostBasisLedger {
    settings: Settings,
    resolver: AssetResolver,
    events: HashMap<Asset, AssetEvents>,
    missing_acquisitions: Vec<MissingAcquisition>,
    timestamp_to_date: TimestampFormatter,
}

impl Default for CostBasisLedger {
    fn default() -> Self {
        CostBasisLedger::new(Settings::default())
    }
}

impl CostBasisLedger {
    /// Constructs a new empty ledger with the default asset equivalences
    pub fn new(settings: Settings) -> Self {
        CostBasisLedger::with_resolver(settings, AssetResolver::default())
    }

    /// Constructs a new empty ledger with a specific set of asset equivalences
    pub fn with_resolver(settings: Settings, resolver: AssetResolver) -> Self {
        CostBasisLedger {
            settings,
            resolver,
            events: HashMap::new(),
            missing_acquisitions: vec![],
            timestamp_to_date,
        }
    }

    /// Accessor for the active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Accessor for the asset equivalence table
    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    /// Disposals which could not be fully matched, in the order they occurred
    pub fn missing_acquisitions(&self) -> &[MissingAcquisition] {
        &self.missing_acquisitions
    }

    /// Iterator over every asset the ledger has seen, with its events
    pub fn assets(&self) -> impl Iterator<Item = (&Asset, &AssetEvents)> {
        self.events.iter()
    }

    /// Discards all inventories and the missing-acquisition log, and
    /// replaces the settings
    ///
    /// The asset equivalences are kept.
    pub fn reset(&mut self, settings: Settings) {
        info!(
            "Resetting cost basis ledger (method {}).",
            settings.cost_basis_method
        );
        self.settings = settings;
        self.events.clear();
        self.missing_acquisitions.clear();
    }

    /// Gets the events for an asset, creating an empty set if none exist
    ///
    /// Equivalent assets map to the same events.
    pub fn get_events(&mut self, asset: &Asset) -> &mut AssetEvents {
        let canonical = self.resolver.canonical(asset);
        let method = self.settings.cost_basis_method;
        self.events
            .entry(canonical)
            .or_insert_with(|| AssetEvents::new(method))
    }

    /// Records an acquisition of an asset
    pub fn add_acquisition(&mut self, asset: &Asset, lot: AcquisitionEvent) {
        self.get_events(asset).inventory.add_acquisition(lot);
    }

    /// Matches a disposal of an asset against its documented acquisitions
    ///
    /// Shortfalls are recorded in [CostBasisLedger::missing_acquisitions] and
    /// reflected in [CostBasisInfo::is_complete]; they are not errors.
    pub fn calculate_spend_cost_basis(
        &mut self,
        spending_amount: Decimal,
        spending_asset: &Asset,
        timestamp: Timestamp,
    ) -> Result<CostBasisInfo, Error> {
        let canonical = self.resolver.canonical(spending_asset);
        let method = self.settings.cost_basis_method;
        let events = self
            .events
            .entry(canonical)
            .or_insert_with(|| AssetEvents::new(method));
        let ctx = SpendContext {
            missing_acquisitions: &mut self.missing_acquisitions,
            used_acquisitions: &mut events.used_acquisitions,
            settings: &self.settings,
            timestamp_to_date: self.timestamp_to_date,
        };
        events
            .inventory
            .calculate_spend_cost_basis(spending_amount, spending_asset, timestamp, ctx)
    }

    /// Removes an amount of an asset from its inventory, with no tax
    /// consequences (e.g. a fee paid in the asset)
    ///
    /// Returns whether the full amount was available. If the asset has no
    /// documented acquisitions at all, nothing is recorded as missing.
    pub fn reduce_asset_amount(
        &mut self,
        asset: &Asset,
        amount: Decimal,
        timestamp: Timestamp,
    ) -> Result<bool, Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::NegativeSpend(amount));
        }
        if amount.is_zero() {
            return Ok(true);
        }
        if self.get_events(asset).inventory.is_empty() {
            debug!(
                "reducing {} {} on {} with no acquisitions on record",
                amount,
                asset,
                (self.timestamp_to_date)(timestamp),
            );
            return Ok(false);
        }
        let info = self.calculate_spend_cost_basis(amount, asset, timestamp)?;
        Ok(info.is_complete)
    }
}
