//! In-memory subscriber store for tests and ephemeral runs

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::SubscriberStore;
use crate::error::Result;
use crate::types::SubscriberProfile;

#[derive(Default)]
pub struct MemorySubscriberStore {
    profiles: RwLock<HashMap<String, SubscriberProfile>>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn list_all(&self) -> Result<Vec<SubscriberProfile>> {
        Ok(self.profiles.read().values().cloned().collect())
    }

    async fn get(&self, chat_id: &str) -> Result<Option<SubscriberProfile>> {
        Ok(self.profiles.read().get(chat_id).cloned())
    }

    async fn save(&self, profile: &SubscriberProfile) -> Result<()> {
        let normalized = profile.clone().normalized();
        self.profiles
            .write()
            .insert(normalized.chat_id.clone(), normalized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = MemorySubscriberStore::new();
        let mut profile = SubscriberProfile::new("chat-9");
        profile.min_profit_fraction = dec!(0.02);
        profile.asset_whitelist.insert("bitcoin".to_string());

        store.save(&profile).await.unwrap();
        let loaded = store.get("chat-9").await.unwrap().unwrap();

        assert_eq!(loaded.min_profit_fraction, dec!(0.02));
        assert!(loaded.asset_whitelist.contains("bitcoin"));
    }

    #[tokio::test]
    async fn test_get_unknown_chat_is_none() {
        let store = MemorySubscriberStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_normalizes_blacklist() {
        let store = MemorySubscriberStore::new();
        let mut profile = SubscriberProfile::new("chat-9");
        profile.asset_blacklist.insert("SHIB".to_string());

        store.save(&profile).await.unwrap();
        let loaded = store.get("chat-9").await.unwrap().unwrap();

        assert!(loaded.asset_blacklist.contains("shib"));
        assert!(loaded.is_blacklisted("ShIb"));
    }

    #[tokio::test]
    async fn test_list_all_returns_every_profile() {
        let store = MemorySubscriberStore::new();
        store.save(&SubscriberProfile::new("a")).await.unwrap();
        store.save(&SubscriberProfile::new("b")).await.unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }
}
