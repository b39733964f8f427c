//! Market Resolver Library
//!
//! Resolves prediction-market questions against third-party data APIs and
//! produces one of four recommendation codes:
//!
//! - `p1` / `p2`: the first / second outcome occurred
//! - `p3`: unresolvable on the merits (tie, canceled, unusable data)
//! - `p4`: too early to resolve
//!
//! A market is a JSON definition: which data source to ask (Binance klines,
//! SportsDataIO scores, DexScreener pairs, HLTV results), the question
//! parameters, and which code each outcome maps to. Resolution never panics
//! out: source failures surviving the retry policy produce the market's
//! configured fallback code.

pub mod config;
pub mod market;
pub mod resolvers;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use market::{MarketSpec, OutcomeCodes, ResolverSpec, ThresholdMode};
pub use resolvers::resolve_market;
pub use types::{Comparison, Outcome, Recommendation, Resolution};
