//! Subscriber persistence

mod memory;
mod sqlite;

pub use memory::MemorySubscriberStore;
pub use sqlite::SqliteSubscriberStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SubscriberProfile;

/// Persistence boundary for subscriber profiles.
///
/// The scan engine reads whole profiles through this trait once per cycle;
/// the conversational front-end (out of scope here) writes them. Loaded
/// profiles are always normalized, so invariant enforcement lives with the
/// stores rather than every call site.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Every known subscriber.
    async fn list_all(&self) -> Result<Vec<SubscriberProfile>>;

    /// One subscriber, or `None` when the chat is unknown.
    async fn get(&self, chat_id: &str) -> Result<Option<SubscriberProfile>>;

    /// Insert or replace a profile.
    async fn save(&self, profile: &SubscriberProfile) -> Result<()>;
}
