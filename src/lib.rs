//! Spreadwatch
//!
//! A multi-tenant cross-venue arbitrage alert bot for crypto assets.
//!
//! ## Architecture
//!
//! ```text
//! Scanner (60s cycle) → UniverseResolver → MarketDataSource → Detector → Notifier
//!                            ↑                    ↑
//!                      TopAssetCache         PriceProvider (HTTP)
//!                      (1h refresh)
//!                            ↑
//!                     SubscriberStore (SQLite)
//! ```
//!
//! Each subscriber carries its own filter profile (settlement currency,
//! profit/volume thresholds, asset allow/deny lists, venue allow list,
//! pause flags). One scan cycle walks the full subscriber population,
//! resolves each subscriber's asset universe, pulls per-venue tickers and
//! emits at most one alert per (subscriber, asset) pair.

pub mod cache;
pub mod client;
pub mod config;
pub mod detector;
pub mod error;
pub mod market_data;
pub mod notify;
pub mod scanner;
pub mod storage;
pub mod types;
pub mod universe;
