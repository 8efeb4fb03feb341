//! Asset registry - static descriptions of supported assets
//!
//! Internal accounting is always in integer base units; the decimal
//! precision recorded here is only used when rendering amounts for humans
//! and when an oracle converts between assets.

use crate::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported asset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// The chain-native asset, moved as attached call value
    Native,
    /// Token asset "ALPHA" (18 decimals)
    TokenAlpha,
    /// Token asset "BRAVO" (6 decimals)
    TokenBravo,
}

/// Whether an asset moves as native value or through token transfer calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Native,
    Token,
}

/// Static registry entry for an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetInfo {
    pub asset: Asset,
    /// Display symbol
    pub symbol: &'static str,
    /// Decimal precision for display/conversion only
    pub decimals: u32,
    pub kind: AssetKind,
}

/// The full registry, in declaration order
pub const REGISTRY: [AssetInfo; 3] = [
    AssetInfo {
        asset: Asset::Native,
        symbol: "CRD",
        decimals: 18,
        kind: AssetKind::Native,
    },
    AssetInfo {
        asset: Asset::TokenAlpha,
        symbol: "ALPHA",
        decimals: 18,
        kind: AssetKind::Token,
    },
    AssetInfo {
        asset: Asset::TokenBravo,
        symbol: "BRAVO",
        decimals: 6,
        kind: AssetKind::Token,
    },
];

impl Asset {
    /// Registry entry for this asset
    pub fn info(&self) -> &'static AssetInfo {
        match self {
            Asset::Native => &REGISTRY[0],
            Asset::TokenAlpha => &REGISTRY[1],
            Asset::TokenBravo => &REGISTRY[2],
        }
    }

    /// Whether this asset moves as attached native value
    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self.info().kind, AssetKind::Native)
    }

    /// Display symbol
    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.info().symbol
    }

    /// Render a base-unit amount as a decimal string with the asset symbol.
    ///
    /// Falls back to raw base units if the amount exceeds decimal range.
    pub fn format_amount(&self, amount: Amount) -> String {
        let info = self.info();
        let rendered = i128::try_from(amount)
            .ok()
            .and_then(|v| Decimal::try_from_i128_with_scale(v, info.decimals).ok());
        match rendered {
            Some(d) => format!("{} {}", d.normalize(), info.symbol),
            None => format!("{} base units of {}", amount, info.symbol),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
