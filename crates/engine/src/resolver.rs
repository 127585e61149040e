//! Two-stage pair resolution
//!
//! Stage one maps a (asset, quote, bin step) request to a pool address,
//! cached permanently once found. Stage two reads the pool's reserves
//! behind a short TTL. Both stages run their misses through a single-flight
//! group, so a burst of identical requests costs one chain round trip, and
//! both finish by handing the snapshot to the pure pricing stage.
//!
//! Negative discovery results are never cached: a pair that does not exist
//! today may be deployed tomorrow, so every request for it retries the
//! factory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dexquote_core::{
    ChainId, Generation, Pair, PairPrice, ResolveError, ReserveSnapshot, ResolvedPair, Result,
};

use crate::cache::{sort_tokens, CacheStats, PairKey, StateCache};
use crate::chain::{PoolReader, ReserveReading};
use crate::pricing::compute_pair_price;
use crate::single_flight::FlightGroup;

/// Bins sampled on each side of the window center (eleven bins total).
pub const BIN_WINDOW_RADIUS: u32 = 5;

/// Pre-registered pool, installed by [`PriceResolver::seed_pairs`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeedPair {
    pub token0: Address,
    pub token1: Address,
    pub bin_step: u32,
    pub pool: Address,
    /// Starting center for the liquidity window, if known.
    pub active_bin: Option<u32>,
}

#[derive(Debug, Default)]
struct Counters {
    address_lookups: AtomicU64,
    address_cache_hits: AtomicU64,
    pairs_not_found: AtomicU64,
    reserve_fetches: AtomicU64,
    reserve_cache_hits: AtomicU64,
    reserve_failures: AtomicU64,
}

/// Point-in-time resolver counters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolverStats {
    pub generation: Generation,
    /// Factory lookups issued on chain.
    pub address_lookups: u64,
    pub address_cache_hits: u64,
    /// Discovery flights that ended without a pool.
    pub pairs_not_found: u64,
    /// Reserve batches issued on chain.
    pub reserve_fetches: u64,
    pub reserve_cache_hits: u64,
    pub reserve_failures: u64,
    pub cache: CacheStats,
}

/// Resolves pair requests for one protocol generation across every
/// configured chain.
pub struct PriceResolver {
    generation: Generation,
    reader: Arc<dyn PoolReader>,
    cache: Arc<StateCache>,
    address_flights: FlightGroup<PairKey, Result<Address>>,
    reserve_flights: FlightGroup<(ChainId, Address), Result<ReserveSnapshot>>,
    counters: Arc<Counters>,
}

impl PriceResolver {
    pub fn new(generation: Generation, reader: Arc<dyn PoolReader>, reserve_ttl: Duration) -> Self {
        Self {
            generation,
            reader,
            cache: Arc::new(StateCache::new(reserve_ttl)),
            address_flights: FlightGroup::new(),
            reserve_flights: FlightGroup::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Stage one: map the pair to its pool address.
    ///
    /// A found address is cached for the process lifetime. A miss or a
    /// failed lookup produces a not-found result oriented to the caller's
    /// request and leaves no cache entry behind.
    pub async fn resolve_address(&self, chain: ChainId, pair: Pair) -> ResolvedPair {
        let key = PairKey::new(chain, pair.asset, pair.quote, pair.bin_step);
        if let Some(address) = self.cache.pool_address(&key) {
            self.counters.address_cache_hits.fetch_add(1, Ordering::Relaxed);
            return ResolvedPair::found(pair, address);
        }

        let reader = Arc::clone(&self.reader);
        let cache = Arc::clone(&self.cache);
        let counters = Arc::clone(&self.counters);
        let generation = self.generation;
        let outcome = self
            .address_flights
            .run(key, async move {
                if let Some(address) = cache.pool_address(&key) {
                    return Ok(address);
                }
                counters.address_lookups.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Looking up {} pool for {}/{} bin {} on {}",
                    generation, key.token0, key.token1, key.bin_step, chain
                );
                match reader
                    .find_pool(chain, key.token0, key.token1, key.bin_step)
                    .await
                {
                    Ok(found) if found.pool.is_zero() => {
                        counters.pairs_not_found.fetch_add(1, Ordering::Relaxed);
                        Err(ResolveError::PairNotFound {
                            asset: key.token0,
                            quote: key.token1,
                            bin_step: key.bin_step,
                        })
                    }
                    Ok(found) => {
                        cache.set_pool_address(key, found.pool);
                        if let Some(bin) = found.active_bin {
                            cache.set_last_known_bin(chain, found.pool, bin);
                        }
                        debug!("Resolved {} pool {} on {}", generation, found.pool, chain);
                        Ok(found.pool)
                    }
                    Err(err) => {
                        counters.pairs_not_found.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            "Pool lookup failed for {}/{} bin {} on {}: {}",
                            key.token0, key.token1, key.bin_step, chain, err
                        );
                        Err(err)
                    }
                }
            })
            .await;

        match outcome {
            Ok(address) => ResolvedPair::found(pair, address),
            // Whatever went wrong inside the flight, the caller sees a
            // not-found in its own orientation
            Err(_) => ResolvedPair::failed(pair, ResolveError::pair_not_found(&pair)),
        }
    }

    /// Stage two: read reserves for a resolved pair and price them.
    ///
    /// A stage-one failure short-circuits here without touching the chain.
    /// Fresh cached snapshots are priced directly; anything else goes
    /// through one coalesced fetch per pool.
    pub async fn resolve_reserves(&self, chain: ChainId, resolved: &ResolvedPair) -> PairPrice {
        if let Some(err) = &resolved.error {
            return PairPrice::failed(chain, self.generation, resolved, now_ms(), err.clone());
        }

        let pool = resolved.address;
        if let Some(snapshot) = self.cache.fresh_reserves(chain, pool) {
            self.counters.reserve_cache_hits.fetch_add(1, Ordering::Relaxed);
            return compute_pair_price(chain, self.generation, &resolved.pair, &snapshot);
        }

        let reader = Arc::clone(&self.reader);
        let cache = Arc::clone(&self.cache);
        let counters = Arc::clone(&self.counters);
        let generation = self.generation;
        let fallback_tokens = sort_tokens(resolved.pair.asset, resolved.pair.quote);
        let outcome = self
            .reserve_flights
            .run((chain, pool), async move {
                if let Some(snapshot) = cache.fresh_reserves(chain, pool) {
                    return Ok(snapshot);
                }
                counters.reserve_fetches.fetch_add(1, Ordering::Relaxed);
                match fetch_snapshot(generation, &reader, &cache, chain, pool, fallback_tokens)
                    .await
                {
                    Ok(snapshot) => {
                        cache.set_reserves(chain, snapshot.clone());
                        if generation.uses_bins() {
                            cache.set_last_known_bin(chain, pool, snapshot.active_bin);
                        }
                        Ok(snapshot)
                    }
                    Err(err) => {
                        counters.reserve_failures.fetch_add(1, Ordering::Relaxed);
                        warn!("Reserve fetch failed for pool {} on {}: {}", pool, chain, err);
                        Err(ResolveError::reserve_fetch_failed(pool, err.to_string()))
                    }
                }
            })
            .await;

        match outcome {
            Ok(snapshot) => compute_pair_price(chain, self.generation, &resolved.pair, &snapshot),
            Err(err) => PairPrice::failed(chain, self.generation, resolved, now_ms(), err),
        }
    }

    /// Both stages for one pair.
    pub async fn resolve_pair(&self, chain: ChainId, pair: Pair) -> PairPrice {
        let resolved = self.resolve_address(chain, pair).await;
        self.resolve_reserves(chain, &resolved).await
    }

    /// Resolves a batch in two phases: every address concurrently, then
    /// every reserve read concurrently. Output order follows input order.
    pub async fn resolve_many(&self, chain: ChainId, pairs: &[Pair]) -> Vec<PairPrice> {
        let resolved =
            join_all(pairs.iter().map(|&pair| self.resolve_address(chain, pair))).await;
        join_all(
            resolved
                .iter()
                .map(|resolved| self.resolve_reserves(chain, resolved)),
        )
        .await
    }

    /// Installs known pools ahead of traffic, skipping discovery for them.
    pub fn seed_pairs(&self, chain: ChainId, seeds: &[SeedPair]) {
        for seed in seeds {
            let key = PairKey::new(chain, seed.token0, seed.token1, seed.bin_step);
            self.cache.set_pool_address(key, seed.pool);
            if let Some(bin) = seed.active_bin {
                self.cache.set_last_known_bin(chain, seed.pool, bin);
            }
        }
        info!("Seeded {} {} pools on {}", seeds.len(), self.generation, chain);
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            generation: self.generation,
            address_lookups: self.counters.address_lookups.load(Ordering::Relaxed),
            address_cache_hits: self.counters.address_cache_hits.load(Ordering::Relaxed),
            pairs_not_found: self.counters.pairs_not_found.load(Ordering::Relaxed),
            reserve_fetches: self.counters.reserve_fetches.load(Ordering::Relaxed),
            reserve_cache_hits: self.counters.reserve_cache_hits.load(Ordering::Relaxed),
            reserve_failures: self.counters.reserve_failures.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        }
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// One full snapshot read: reserves, and for bin generations the
/// eleven-bin liquidity window.
///
/// The window centers on the bin recorded by the previous read so it can
/// run in parallel with the reserve call; the fresh bin id replaces the
/// center afterwards. Without a recorded center the reserve read goes
/// first and the window centers on its result.
async fn fetch_snapshot(
    generation: Generation,
    reader: &Arc<dyn PoolReader>,
    cache: &Arc<StateCache>,
    chain: ChainId,
    pool: Address,
    fallback_tokens: (Address, Address),
) -> Result<ReserveSnapshot> {
    let timestamp_ms = now_ms();

    if !generation.uses_bins() {
        let reading = reader.read_reserves(chain, pool).await?;
        let nearby = (reading.reserve0, reading.reserve1);
        return Ok(build_snapshot(pool, timestamp_ms, reading, fallback_tokens, nearby));
    }

    let (reading, nearby) = match cache.last_known_bin(chain, pool) {
        Some(center) => {
            tokio::try_join!(
                reader.read_reserves(chain, pool),
                read_bin_window(reader, chain, pool, center),
            )?
        }
        None => {
            let reading = reader.read_reserves(chain, pool).await?;
            let nearby = read_bin_window(reader, chain, pool, reading.active_bin).await?;
            (reading, nearby)
        }
    };

    Ok(build_snapshot(pool, timestamp_ms, reading, fallback_tokens, nearby))
}

fn build_snapshot(
    pool: Address,
    timestamp_ms: u64,
    reading: ReserveReading,
    fallback_tokens: (Address, Address),
    nearby: (U256, U256),
) -> ReserveSnapshot {
    let (token0, token1) = reading.tokens.unwrap_or(fallback_tokens);
    ReserveSnapshot {
        pool,
        block_number: reading.block_number,
        timestamp_ms,
        active_bin: reading.active_bin,
        reserve0: reading.reserve0,
        reserve1: reading.reserve1,
        token0,
        token1,
        nearby_liquidity0: nearby.0,
        nearby_liquidity1: nearby.1,
    }
}

/// Sums per-side liquidity over the window of bins around `center`.
async fn read_bin_window(
    reader: &Arc<dyn PoolReader>,
    chain: ChainId,
    pool: Address,
    center: u32,
) -> Result<(U256, U256)> {
    let radius = BIN_WINDOW_RADIUS as i32;
    let reads = (-radius..=radius)
        .filter_map(|offset| center.checked_add_signed(offset))
        .map(|bin| reader.read_bin_liquidity(chain, pool, bin));
    let sides = try_join_all(reads).await?;

    let mut total0 = U256::ZERO;
    let mut total1 = U256::ZERO;
    for (side0, side1) in sides {
        total0 += side0;
        total1 += side1;
    }
    Ok((total0, total1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use crate::chain::PoolDiscovery;
    use crate::math::REFERENCE_BIN;
    use crate::pricing::LOW_LIQUIDITY_WARNING;

    const E18: u64 = 1_000_000_000_000_000_000;

    #[derive(Default)]
    struct MockReader {
        pool: Address,
        missing: bool,
        discovery_bin: Option<u32>,
        reported_bin: u32,
        reserve0: U256,
        reserve1: U256,
        tokens: Option<(Address, Address)>,
        per_bin: (U256, U256),
        fail_reserves: bool,
        delay_ms: u64,
        find_calls: AtomicUsize,
        reserve_calls: AtomicUsize,
        bin_requests: Mutex<Vec<u32>>,
    }

    #[async_trait::async_trait]
    impl PoolReader for MockReader {
        async fn find_pool(
            &self,
            _chain: ChainId,
            _token0: Address,
            _token1: Address,
            _bin_step: u32,
        ) -> Result<PoolDiscovery> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.missing {
                return Ok(PoolDiscovery {
                    pool: Address::ZERO,
                    active_bin: None,
                });
            }
            Ok(PoolDiscovery {
                pool: self.pool,
                active_bin: self.discovery_bin,
            })
        }

        async fn read_reserves(&self, _chain: ChainId, _pool: Address) -> Result<ReserveReading> {
            self.reserve_calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail_reserves {
                return Err(ResolveError::Rpc("connection refused".into()));
            }
            Ok(ReserveReading {
                block_number: 777,
                active_bin: self.reported_bin,
                reserve0: self.reserve0,
                reserve1: self.reserve1,
                tokens: self.tokens,
            })
        }

        async fn read_bin_liquidity(
            &self,
            _chain: ChainId,
            _pool: Address,
            bin: u32,
        ) -> Result<(U256, U256)> {
            self.bin_requests.lock().push(bin);
            Ok(self.per_bin)
        }
    }

    fn tokens() -> (Address, Address) {
        (Address::repeat_byte(0x0a), Address::repeat_byte(0x0b))
    }

    fn v1_resolver(mock: &Arc<MockReader>, ttl: Duration) -> PriceResolver {
        PriceResolver::new(
            Generation::V1,
            Arc::clone(mock) as Arc<dyn PoolReader>,
            ttl,
        )
    }

    fn v21_resolver(mock: &Arc<MockReader>, ttl: Duration) -> PriceResolver {
        PriceResolver::new(
            Generation::V21,
            Arc::clone(mock) as Arc<dyn PoolReader>,
            ttl,
        )
    }

    #[tokio::test]
    async fn test_found_address_cached_permanently() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x99),
            ..Default::default()
        });
        let resolver = v1_resolver(&mock, Duration::from_millis(500));

        let first = resolver.resolve_address(ChainId::Avalanche, Pair::new(a, b, 0)).await;
        assert_eq!(first.address, Address::repeat_byte(0x99));
        assert!(!first.is_err());

        let second = resolver.resolve_address(ChainId::Avalanche, Pair::new(a, b, 0)).await;
        assert_eq!(second.address, first.address);
        assert_eq!(mock.find_calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().address_cache_hits, 1);
    }

    #[tokio::test]
    async fn test_opposite_orientations_share_one_lookup() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x99),
            reserve0: U256::from(E18),
            reserve1: U256::from(4u64) * U256::from(E18),
            ..Default::default()
        });
        let resolver = v1_resolver(&mock, Duration::from_millis(500));

        let forward = resolver.resolve_pair(ChainId::Bsc, Pair::new(a, b, 0)).await;
        let reversed = resolver.resolve_pair(ChainId::Bsc, Pair::new(b, a, 0)).await;

        assert_eq!(mock.find_calls.load(Ordering::SeqCst), 1);
        assert_eq!(forward.price, 4.0);
        assert_eq!(reversed.price, 0.25);
        assert_eq!(forward.token0, reversed.token0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_finder_call() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x42),
            delay_ms: 30,
            ..Default::default()
        });
        let resolver = Arc::new(v1_resolver(&mock, Duration::from_millis(500)));

        let resolved = join_all((0..8).map(|_| {
            let resolver = Arc::clone(&resolver);
            async move {
                resolver
                    .resolve_address(ChainId::Arbitrum, Pair::new(a, b, 0))
                    .await
            }
        }))
        .await;

        assert_eq!(mock.find_calls.load(Ordering::SeqCst), 1);
        for r in resolved {
            assert_eq!(r.address, Address::repeat_byte(0x42));
        }
    }

    #[tokio::test]
    async fn test_missing_pair_not_cached_and_oriented_to_caller() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            missing: true,
            ..Default::default()
        });
        let resolver = v21_resolver(&mock, Duration::from_millis(500));

        // Reversed orientation on purpose
        let result = resolver.resolve_address(ChainId::Avalanche, Pair::new(b, a, 20)).await;
        assert!(result.is_err());
        match result.error.as_ref().unwrap() {
            ResolveError::PairNotFound { asset, quote, bin_step } => {
                assert_eq!(*asset, b);
                assert_eq!(*quote, a);
                assert_eq!(*bin_step, 20);
            }
            other => panic!("unexpected error {other:?}"),
        }

        // The miss was not cached, so the factory is asked again
        resolver.resolve_address(ChainId::Avalanche, Pair::new(b, a, 20)).await;
        assert_eq!(mock.find_calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.stats().pairs_not_found, 2);
    }

    #[tokio::test]
    async fn test_stage_one_failure_short_circuits_reserves() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader::default());
        let resolver = v1_resolver(&mock, Duration::from_millis(500));

        let pair = Pair::new(a, b, 0);
        let resolved = ResolvedPair::failed(pair, ResolveError::pair_not_found(&pair));
        let price = resolver.resolve_reserves(ChainId::Bsc, &resolved).await;

        assert!(price.is_err());
        assert_eq!(price.price, 0.0);
        assert_eq!(mock.reserve_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            price.error,
            Some(ResolveError::PairNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reserves_served_from_cache_until_stale() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x55),
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            ..Default::default()
        });
        let resolver = v1_resolver(&mock, Duration::from_millis(50));
        let pair = Pair::new(a, b, 0);

        resolver.resolve_pair(ChainId::Avalanche, pair).await;
        resolver.resolve_pair(ChainId::Avalanche, pair).await;
        assert_eq!(mock.reserve_calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().reserve_cache_hits, 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        resolver.resolve_pair(ChainId::Avalanche, pair).await;
        assert_eq!(mock.reserve_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reserve_reads_coalesce() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x55),
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            delay_ms: 30,
            ..Default::default()
        });
        let resolver = Arc::new(v1_resolver(&mock, Duration::from_millis(500)));
        let resolved = ResolvedPair::found(Pair::new(a, b, 0), Address::repeat_byte(0x55));

        let prices = join_all((0..6).map(|_| {
            let resolver = Arc::clone(&resolver);
            let resolved = resolved.clone();
            async move { resolver.resolve_reserves(ChainId::Bsc, &resolved).await }
        }))
        .await;

        assert_eq!(mock.reserve_calls.load(Ordering::SeqCst), 1);
        for price in prices {
            assert!(!price.is_err());
            assert_eq!(price.block_number, 777);
        }
    }

    #[tokio::test]
    async fn test_reserve_failure_tagged_and_not_cached() {
        let (a, b) = tokens();
        let pool = Address::repeat_byte(0x66);
        let mock = Arc::new(MockReader {
            pool,
            fail_reserves: true,
            ..Default::default()
        });
        let resolver = v1_resolver(&mock, Duration::from_millis(500));
        let resolved = ResolvedPair::found(Pair::new(a, b, 0), pool);

        let price = resolver.resolve_reserves(ChainId::Avalanche, &resolved).await;
        assert!(price.is_err());
        match price.error.as_ref().unwrap() {
            ResolveError::ReserveFetchFailed { pool: p, reason } => {
                assert_eq!(*p, pool);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(price.error.as_ref().unwrap().is_retryable());

        // Failures are not cached; the next request fetches again
        resolver.resolve_reserves(ChainId::Avalanche, &resolved).await;
        assert_eq!(mock.reserve_calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.stats().reserve_failures, 2);
    }

    #[tokio::test]
    async fn test_bin_window_centers_on_previous_read() {
        let (a, b) = tokens();
        let seeded = REFERENCE_BIN + 10;
        let fresh = REFERENCE_BIN + 20;
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x77),
            discovery_bin: Some(seeded),
            reported_bin: fresh,
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            tokens: Some((Address::repeat_byte(0x0a), Address::repeat_byte(0x0b))),
            per_bin: (U256::from(2u64) * U256::from(E18), U256::from(2u64) * U256::from(E18)),
            ..Default::default()
        });
        let resolver = v21_resolver(&mock, Duration::from_millis(30));
        let pair = Pair::new(a, b, 10);

        // Discovery seeds the center; the first window surrounds it
        let resolved = resolver.resolve_address(ChainId::Arbitrum, pair).await;
        let price = resolver.resolve_reserves(ChainId::Arbitrum, &resolved).await;
        assert!(!price.is_err());
        let first: Vec<u32> = mock.bin_requests.lock().drain(..).collect();
        let expected: Vec<u32> = (seeded - 5..=seeded + 5).collect();
        assert_eq!(first, expected);

        // After the read reported a new bin, the next window re-centers
        tokio::time::sleep(Duration::from_millis(50)).await;
        resolver.resolve_reserves(ChainId::Arbitrum, &resolved).await;
        let second: Vec<u32> = mock.bin_requests.lock().drain(..).collect();
        let expected: Vec<u32> = (fresh - 5..=fresh + 5).collect();
        assert_eq!(second, expected);
    }

    #[tokio::test]
    async fn test_thin_window_attaches_warning() {
        let (a, b) = tokens();
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x77),
            discovery_bin: Some(REFERENCE_BIN),
            reported_bin: REFERENCE_BIN,
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            tokens: Some((Address::repeat_byte(0x0a), Address::repeat_byte(0x0b))),
            // 0.5 per bin, 5.5 over the window: under the ten-unit bar
            per_bin: (U256::from(E18 / 2), U256::from(E18 / 2)),
            ..Default::default()
        });
        let resolver = v21_resolver(&mock, Duration::from_millis(500));

        let price = resolver.resolve_pair(ChainId::Bsc, Pair::new(a, b, 10)).await;
        assert!(!price.is_err());
        assert_eq!(price.warning.as_deref(), Some(LOW_LIQUIDITY_WARNING));
        assert_eq!(mock.bin_requests.lock().len(), 11);
    }

    #[tokio::test]
    async fn test_seeded_pool_skips_discovery() {
        let (a, b) = tokens();
        let pool = Address::repeat_byte(0x88);
        let mock = Arc::new(MockReader {
            pool,
            reported_bin: REFERENCE_BIN,
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            tokens: Some((a, b)),
            per_bin: (U256::from(2u64) * U256::from(E18), U256::from(2u64) * U256::from(E18)),
            ..Default::default()
        });
        let resolver = v21_resolver(&mock, Duration::from_millis(500));

        resolver.seed_pairs(
            ChainId::Avalanche,
            &[SeedPair {
                token0: a,
                token1: b,
                bin_step: 10,
                pool,
                active_bin: Some(REFERENCE_BIN),
            }],
        );

        let price = resolver.resolve_pair(ChainId::Avalanche, Pair::new(a, b, 10)).await;
        assert!(!price.is_err());
        assert_eq!(price.pool, pool);
        assert_eq!(mock.find_calls.load(Ordering::SeqCst), 0);
        // Window centered on the seeded bin
        let requested: Vec<u32> = mock.bin_requests.lock().clone();
        assert_eq!(requested[0], REFERENCE_BIN - 5);
    }

    #[tokio::test]
    async fn test_resolve_many_preserves_order() {
        let (a, b) = tokens();
        let c = Address::repeat_byte(0x0c);
        let mock = Arc::new(MockReader {
            pool: Address::repeat_byte(0x99),
            reserve0: U256::from(E18),
            reserve1: U256::from(E18),
            ..Default::default()
        });
        let resolver = v1_resolver(&mock, Duration::from_millis(500));

        let pairs = [Pair::new(a, b, 0), Pair::new(a, c, 0), Pair::new(b, c, 0)];
        let prices = resolver.resolve_many(ChainId::Bsc, &pairs).await;

        assert_eq!(prices.len(), 3);
        for (price, pair) in prices.iter().zip(pairs.iter()) {
            assert_eq!(price.asset, pair.asset);
            assert_eq!(price.quote, pair.quote);
        }
    }
}
