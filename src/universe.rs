//! Per-subscriber asset universe resolution

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::TopAssetCache;
use crate::types::SubscriberProfile;

/// Decides which asset identifiers a subscriber is scanned against in one
/// cycle: their explicit watchlist, or a live view of the shared top-assets
/// cache when they opted into it.
#[derive(Clone)]
pub struct UniverseResolver {
    cache: Arc<TopAssetCache>,
}

impl UniverseResolver {
    pub fn new(cache: Arc<TopAssetCache>) -> Self {
        Self { cache }
    }

    pub fn resolve(&self, profile: &SubscriberProfile) -> HashSet<String> {
        if profile.use_top_asset_universe {
            self.cache
                .snapshot()
                .iter()
                .map(|a| a.id.clone())
                .collect()
        } else {
            profile.asset_whitelist.clone()
        }
    }
}
