//! # Credo Engine
//!
//! Public orchestrator for the Credo lending ledger.
//!
//! ## Components
//!
//! - [`LendingEngine`]: The public operations (supply, withdraw, borrow,
//!   repay) plus owner-gated parameter setters and the read-only query
//!   surface
//! - [`ports`]: Collaborator contracts ([`PriceOracle`], [`AssetGateway`],
//!   [`Clock`]) with in-memory implementations for tests and demos
//! - [`events`]: Broadcast domain events for indexers and UIs
//! - [`config`]: Environment-driven engine configuration
//!
//! The engine holds no value-bearing state of its own; it composes the
//! ledger and credit tracker from `credo-ledger` and serializes every
//! mutating operation behind a single op-guard so each call is atomic.

pub mod config;
pub mod engine;
pub mod events;
pub mod ports;

pub use config::EngineConfig;
pub use engine::LendingEngine;
pub use events::{EventRecord, LedgerEvent};
pub use ports::{
    AssetGateway, Clock, InMemoryGateway, ManualClock, PriceOracle, StaticRateOracle, SystemClock,
};
