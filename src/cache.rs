//! Shared top-assets cache
//!
//! Holds the "top N by market cap" universe shared by every subscriber who
//! opts into it. A refresh swaps in a whole new snapshot behind one pointer
//! write; readers keep whatever `Arc` they grabbed, so a refresh mid-cycle
//! never surfaces a half-built or transiently empty list.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::PriceProvider;
use crate::types::TopAsset;

#[derive(Default)]
pub struct TopAssetCache {
    snapshot: RwLock<Arc<Vec<TopAsset>>>,
}

impl TopAssetCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Current snapshot; cheap to clone and stable for the caller's
    /// lifetime regardless of concurrent refreshes.
    pub fn snapshot(&self) -> Arc<Vec<TopAsset>> {
        self.snapshot.read().clone()
    }

    /// Replace the whole universe in one pointer swap.
    pub fn replace(&self, assets: Vec<TopAsset>) {
        *self.snapshot.write() = Arc::new(assets);
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Refill the cache from the provider. A failed or empty fetch keeps the
/// previous snapshot; a stale universe beats no universe.
pub async fn refresh(cache: &TopAssetCache, provider: &dyn PriceProvider, limit: usize) -> bool {
    match provider.top_assets(limit).await {
        Ok(assets) if assets.is_empty() => {
            warn!("provider returned an empty top-assets list, keeping previous snapshot");
            false
        }
        Ok(assets) => {
            info!("top-assets cache refreshed: {} entries", assets.len());
            cache.replace(assets);
            true
        }
        Err(e) => {
            warn!("top-assets refresh failed, keeping previous snapshot: {}", e);
            false
        }
    }
}

/// Background refresh on a long fixed period (reference: 1 hour). The
/// first tick fires immediately and does the initial fill.
pub async fn run_refresh_loop(
    cache: Arc<TopAssetCache>,
    provider: Arc<dyn PriceProvider>,
    limit: usize,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                refresh(&cache, provider.as_ref(), limit).await;
            }
            _ = shutdown.changed() => {
                info!("top-assets refresh loop stopping");
                return;
            }
        }
    }
}
