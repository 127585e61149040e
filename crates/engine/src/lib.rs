//! Price resolution engine
//!
//! Resolves (asset, quote, bin step) requests to live pool prices in two
//! cached stages: pool discovery through the generation's factory, then a
//! TTL-bounded reserve read with an eleven-bin liquidity window for bin
//! pools. Identical requests in flight are coalesced so each burst costs
//! one chain round trip per stage.
//!
//! [`service::PriceService`] is the front door; [`resolver::PriceResolver`]
//! does the orchestration; [`chain`] holds the per-generation contract
//! bindings; [`math`] carries the 128.128 fixed-point bin arithmetic.

pub mod cache;
pub mod chain;
pub mod math;
pub mod pricing;
pub mod resolver;
pub mod service;
pub mod single_flight;

pub use cache::{CacheStats, PairKey, StateCache};
pub use chain::{ChainClients, PoolDiscovery, PoolReader, ReserveReading};
pub use pricing::{compute_pair_price, LOW_LIQUIDITY_WARNING};
pub use resolver::{PriceResolver, ResolverStats, SeedPair, BIN_WINDOW_RADIUS};
pub use service::PriceService;
pub use single_flight::FlightGroup;
