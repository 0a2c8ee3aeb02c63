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

//! Assets
//!
//! Asset identifiers, and the equivalence table which maps wrapped tokens
//! onto the asset they wrap so that both share a single lot inventory.
//!

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fmt, str};

/// An asset, identified by its symbol or some other opaque identifier
///
/// The engine does not interpret identifiers beyond comparing them. Any
/// aliasing (e.g. WETH being "the same" as ETH) goes through an
/// [AssetResolver].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Asset(String);

impl Asset {
    /// Accessor for the identifier
    pub fn identifier(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Asset {
    fn from(s: &str) -> Asset {
        Asset(s.into())
    }
}

impl str::FromStr for Asset {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Asset(s.into()))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Maps assets onto the canonical asset whose inventory they share
///
/// The table is kept flat: every alias maps directly to a canonical asset
/// which is not itself an alias, so resolution is a single lookup.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AssetResolver {
    map: HashMap<Asset, Asset>,
}

impl Default for AssetResolver {
    /// The resolver with the built-in equivalences (wrapped ether is ether)
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(Asset::from("WETH"), Asset::from("ETH"));
        AssetResolver { map }
    }
}

impl AssetResolver {
    /// Constructs a resolver with the built-in equivalences
    pub fn new() -> Self {
        Default::default()
    }

    /// Constructs a resolver with no equivalences at all
    pub fn empty() -> Self {
        AssetResolver {
            map: HashMap::new(),
        }
    }

    /// Declares `alias` to be equivalent to `canonical`
    ///
    /// If `canonical` is itself an alias, `alias` is mapped onto its target
    /// instead, and any existing aliases of `alias` are re-pointed. Fails if
    /// this would make an asset equivalent to itself through a cycle.
    pub fn add_equivalence(&mut self, alias: Asset, canonical: Asset) -> Result<(), Error> {
        let target = self.canonical(&canonical);
        if target == alias {
            return Err(Error::EquivalenceCycle(alias));
        }
        for existing in self.map.values_mut() {
            if *existing == alias {
                *existing = target.clone();
            }
        }
        self.map.insert(alias, target);
        Ok(())
    }

    /// Returns the asset under which `asset` is accounted for
    pub fn canonical(&self, asset: &Asset) -> Asset {
        self.map.get(asset).unwrap_or(asset).clone()
    }

    /// Whether two assets share an inventory
    pub fn are_equivalent(&self, a: &Asset, b: &Asset) -> bool {
        self.canonical(a) == self.canonical(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_weth() {
        let resolver = AssetResolver::new();
        assert_eq!(resolver.canonical(&"WETH".into()), Asset::from("ETH"));
        assert_eq!(resolver.canonical(&"ETH".into()), Asset::from("ETH"));
        assert_eq!(resolver.canonical(&"BTC".into()), Asset::from("BTC"));
        assert!(resolver.are_equivalent(&"WETH".into(), &"ETH".into()));

        let empty = AssetResolver::empty();
        assert_eq!(empty.canonical(&"WETH".into()), Asset::from("WETH"));
    }

    #[test]
    fn chained_equivalences_stay_flat() {
        let mut resolver = AssetResolver::empty();
        resolver
            .add_equivalence("WBTC".into(), "BTC".into())
            .unwrap();
        // Alias of an alias resolves to the root
        resolver
            .add_equivalence("renWBTC".into(), "WBTC".into())
            .unwrap();
        assert_eq!(resolver.canonical(&"renWBTC".into()), Asset::from("BTC"));

        // Re-pointing the root moves its existing aliases along with it
        resolver
            .add_equivalence("BTC".into(), "XBT".into())
            .unwrap();
        assert_eq!(resolver.canonical(&"WBTC".into()), Asset::from("XBT"));
        assert_eq!(resolver.canonical(&"renWBTC".into()), Asset::from("XBT"));
        assert_eq!(resolver.canonical(&"BTC".into()), Asset::from("XBT"));
    }

    #[test]
    fn cycle_rejected() {
        let mut resolver = AssetResolver::new();
        match resolver.add_equivalence("ETH".into(), "WETH".into()) {
            Err(Error::EquivalenceCycle(asset)) => assert_eq!(asset, Asset::from("ETH")),
            other => panic!("expected cycle error, got {:?}", other),
        }
        // Nothing changed
        assert_eq!(resolver.canonical(&"WETH".into()), Asset::from("ETH"));
    }
}
