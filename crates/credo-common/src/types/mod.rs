//! Core data types for the Credo lending ledger

pub mod asset;
pub mod params;
pub mod position;

pub use asset::{Asset, AssetInfo, AssetKind};
pub use params::{ParameterSet, ParameterStore};
pub use position::{BorrowPosition, SupplyPosition};
