use crate::types::CanonicalAsset;

/// Ordered alias table mapping raw source labels to canonical assets.
///
/// Every data source spells instruments its own way ("Gold", "Gold ($/oz)",
/// "Tether Gold"). Resolution walks the canonical assets in declaration
/// order and each alias list in declaration order; the first exact match
/// wins. A miss is not an error: callers log it and default downstream.
#[derive(Debug, Clone)]
pub struct AssetAliasSet {
    entries: Vec<(CanonicalAsset, Vec<&'static str>)>,
}

impl Default for AssetAliasSet {
    fn default() -> Self {
        Self {
            entries: vec![
                (
                    CanonicalAsset::DollarIndex,
                    vec!["Dollar Index", "US Dollar Index", "Dollar", "DXY"],
                ),
                (
                    CanonicalAsset::Sp500,
                    vec!["S&P 500", "S&P500", "SP500", "SPX"],
                ),
                (
                    CanonicalAsset::Gold,
                    vec!["Gold", "Gold ($/oz)", "Tether Gold", "XAU/USD"],
                ),
                (
                    CanonicalAsset::Bitcoin,
                    vec!["Bitcoin", "Bitcoin ($)", "BTC", "BTC/USD"],
                ),
            ],
        }
    }
}

impl AssetAliasSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw source label to its canonical asset, if any claims it.
    pub fn resolve(&self, raw_label: &str) -> Option<CanonicalAsset> {
        let trimmed = raw_label.trim();
        for (asset, aliases) in &self.entries {
            if aliases.iter().any(|alias| *alias == trimmed) {
                return Some(*asset);
            }
        }
        None
    }

    /// Aliases declared for one canonical asset, in priority order.
    pub fn aliases(&self, asset: CanonicalAsset) -> &[&'static str] {
        self.entries
            .iter()
            .find(|(a, _)| *a == asset)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn resolves_known_aliases() {
        let aliases = AssetAliasSet::default();
        assert_eq!(aliases.resolve("Gold"), Some(CanonicalAsset::Gold));
        assert_eq!(aliases.resolve("Gold ($/oz)"), Some(CanonicalAsset::Gold));
        assert_eq!(aliases.resolve("Tether Gold"), Some(CanonicalAsset::Gold));
        assert_eq!(aliases.resolve("S&P 500"), Some(CanonicalAsset::Sp500));
        assert_eq!(aliases.resolve("BTC"), Some(CanonicalAsset::Bitcoin));
        assert_eq!(aliases.resolve("DXY"), Some(CanonicalAsset::DollarIndex));
    }

    #[test]
    fn unknown_labels_resolve_to_none() {
        let aliases = AssetAliasSet::default();
        assert_eq!(aliases.resolve("Crude Oil"), None);
        assert_eq!(aliases.resolve(""), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let aliases = AssetAliasSet::default();
        let first = aliases.resolve("Bitcoin ($)");
        for _ in 0..5 {
            assert_eq!(aliases.resolve("Bitcoin ($)"), first);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let aliases = AssetAliasSet::default();
        assert_eq!(aliases.resolve("  Gold  "), Some(CanonicalAsset::Gold));
    }

    #[test]
    fn alias_sets_are_disjoint() {
        let aliases = AssetAliasSet::default();
        let mut seen = HashSet::new();
        for asset in CanonicalAsset::ALL {
            for alias in aliases.aliases(asset) {
                assert!(seen.insert(*alias), "alias {alias:?} claimed twice");
            }
        }
    }

    #[test]
    fn every_canonical_asset_has_aliases() {
        let aliases = AssetAliasSet::default();
        for asset in CanonicalAsset::ALL {
            assert!(!aliases.aliases(asset).is_empty());
        }
    }
}
