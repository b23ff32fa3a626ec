//! Multi-tenant scan orchestration
//!
//! One cycle walks the full subscriber population, resolves each
//! subscriber's asset universe, pulls tickers with bounded fan-out, runs
//! the detector and forwards alerts. Per-pair failures are absorbed and
//! logged; nothing escapes the cycle boundary.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::detector;
use crate::market_data::MarketDataSource;
use crate::notify::{format_opportunity, NotificationSink};
use crate::storage::SubscriberStore;
use crate::types::SubscriberProfile;
use crate::universe::UniverseResolver;

/// Counters for one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Subscribers that were actually scanned (not paused)
    pub subscribers: u64,
    /// (subscriber, asset) pairs that produced ticker data
    pub pairs_scanned: u64,
    /// Pairs skipped: fetch unavailable or shutdown in progress
    pub pairs_skipped: u64,
    pub opportunities: u64,
    pub notify_failures: u64,
}

#[derive(Default)]
struct Counters {
    pairs_scanned: AtomicU64,
    pairs_skipped: AtomicU64,
    opportunities: AtomicU64,
    notify_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self, subscribers: u64) -> CycleStats {
        CycleStats {
            subscribers,
            pairs_scanned: self.pairs_scanned.load(Ordering::Relaxed),
            pairs_skipped: self.pairs_skipped.load(Ordering::Relaxed),
            opportunities: self.opportunities.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
        }
    }
}

pub struct ScanOrchestrator {
    store: Arc<dyn SubscriberStore>,
    resolver: UniverseResolver,
    source: MarketDataSource,
    sink: Arc<dyn NotificationSink>,
    max_concurrent_fetches: usize,
    /// Held for the duration of a cycle; a tick that finds it taken is
    /// dropped instead of piling a second cycle on the provider.
    cycle_gate: Mutex<()>,
    stopping: AtomicBool,
}

impl ScanOrchestrator {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        resolver: UniverseResolver,
        source: MarketDataSource,
        sink: Arc<dyn NotificationSink>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            store,
            resolver,
            source,
            sink,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
            cycle_gate: Mutex::new(()),
            stopping: AtomicBool::new(false),
        }
    }

    /// Ask the in-flight cycle to wind down: pairs already being processed
    /// finish, the rest are skipped.
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::Relaxed);
    }

    /// Run one scan cycle over the whole subscriber population.
    pub async fn run_cycle(&self) -> CycleStats {
        let Ok(_guard) = self.cycle_gate.try_lock() else {
            warn!("previous scan cycle still running, skipping this tick");
            return CycleStats::default();
        };

        let subscribers = match self.store.list_all().await {
            Ok(s) => s,
            Err(e) => {
                error!("failed to load subscriber population, aborting cycle: {}", e);
                return CycleStats::default();
            }
        };

        // One profile snapshot per subscriber per cycle; concurrent filter
        // edits from the front-end only take effect next cycle.
        let mut pairs: Vec<(Arc<SubscriberProfile>, String)> = Vec::new();
        let mut active = 0u64;
        for profile in subscribers {
            if profile.scan_paused {
                continue;
            }
            active += 1;
            let profile = Arc::new(profile);
            for asset in self.resolver.resolve(&profile) {
                pairs.push((Arc::clone(&profile), asset));
            }
        }

        let counters = Counters::default();
        let counters_ref = &counters;
        stream::iter(pairs)
            .for_each_concurrent(self.max_concurrent_fetches, |(profile, asset)| async move {
                if self.stopping.load(Ordering::Relaxed) {
                    counters_ref.pairs_skipped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                self.scan_pair(&profile, &asset, counters_ref).await;
            })
            .await;

        let stats = counters.snapshot(active);
        info!(
            "cycle done: {} subscribers, {} pairs scanned, {} opportunities, {} pairs skipped",
            stats.subscribers, stats.pairs_scanned, stats.opportunities, stats.pairs_skipped
        );
        stats
    }

    async fn scan_pair(&self, profile: &SubscriberProfile, asset_id: &str, counters: &Counters) {
        let Some(tickers) = self.source.fetch(asset_id, profile).await else {
            counters.pairs_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        counters.pairs_scanned.fetch_add(1, Ordering::Relaxed);

        let Some(opportunity) = detector::detect(&tickers, profile) else {
            return;
        };
        counters.opportunities.fetch_add(1, Ordering::Relaxed);
        debug!(
            "{}: {} spread {}% ({} → {})",
            profile.chat_id,
            opportunity.pair,
            opportunity.profit_percent,
            opportunity.low_venue,
            opportunity.high_venue
        );

        let text = format_opportunity(&opportunity);
        if let Err(e) = self.sink.send(&profile.chat_id, &text).await {
            warn!("{}: alert delivery failed: {}", profile.chat_id, e);
            counters.notify_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Fixed-period scan driver. Cycles never overlap: the next tick waits for
/// (or is delayed past) the previous cycle. Shutdown stops the timer and
/// lets the in-flight cycle wind down.
pub async fn run_scan_loop(
    orchestrator: Arc<ScanOrchestrator>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                orchestrator.shutdown();
                info!("scan loop stopping");
                return;
            }
        }

        orchestrator.run_cycle().await;

        if *shutdown.borrow() {
            info!("scan loop stopping");
            return;
        }
    }
}
