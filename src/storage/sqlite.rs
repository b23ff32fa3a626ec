//! SQLite subscriber store
//!
//! One row per subscriber; the set-valued filters are stored as JSON text,
//! decimal thresholds as text to avoid float drift.

use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::SubscriberStore;
use crate::error::Result;
use crate::types::SubscriberProfile;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS subscribers (
    chat_id                 TEXT PRIMARY KEY,
    asset_whitelist         TEXT NOT NULL DEFAULT '[]',
    asset_blacklist         TEXT NOT NULL DEFAULT '[]',
    venue_whitelist         TEXT NOT NULL DEFAULT '[]',
    venue_filtering_paused  INTEGER NOT NULL DEFAULT 1,
    scan_paused             INTEGER NOT NULL DEFAULT 0,
    min_profit_fraction     TEXT NOT NULL DEFAULT '0',
    min_volume              TEXT NOT NULL DEFAULT '0',
    use_top_asset_universe  INTEGER NOT NULL DEFAULT 0,
    settlement_currency     TEXT NOT NULL DEFAULT 'USDT'
)
"#;

pub struct SqliteSubscriberStore {
    pool: SqlitePool,
}

impl SqliteSubscriberStore {
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(dir) = std::path::Path::new(path).parent() {
            if !dir.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(dir);
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }

    fn row_to_profile(row: &SqliteRow) -> Result<SubscriberProfile> {
        let profile = SubscriberProfile {
            chat_id: row.try_get("chat_id")?,
            asset_whitelist: decode_set(row.try_get("asset_whitelist")?)?,
            asset_blacklist: decode_set(row.try_get("asset_blacklist")?)?,
            venue_whitelist: decode_set(row.try_get("venue_whitelist")?)?,
            venue_filtering_paused: row.try_get("venue_filtering_paused")?,
            scan_paused: row.try_get("scan_paused")?,
            min_profit_fraction: decode_decimal(row.try_get("min_profit_fraction")?),
            min_volume: decode_decimal(row.try_get("min_volume")?),
            use_top_asset_universe: row.try_get("use_top_asset_universe")?,
            settlement_currency: row.try_get("settlement_currency")?,
        };

        Ok(profile.normalized())
    }
}

fn decode_set(json: String) -> Result<HashSet<String>> {
    Ok(serde_json::from_str(&json)?)
}

fn decode_decimal(text: String) -> Decimal {
    Decimal::from_str(&text).unwrap_or(Decimal::ZERO)
}

#[async_trait]
impl SubscriberStore for SqliteSubscriberStore {
    async fn list_all(&self) -> Result<Vec<SubscriberProfile>> {
        let rows = sqlx::query("SELECT * FROM subscribers")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    async fn get(&self, chat_id: &str) -> Result<Option<SubscriberProfile>> {
        let row = sqlx::query("SELECT * FROM subscribers WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn save(&self, profile: &SubscriberProfile) -> Result<()> {
        let profile = profile.clone().normalized();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO subscribers (
                chat_id, asset_whitelist, asset_blacklist, venue_whitelist,
                venue_filtering_paused, scan_paused, min_profit_fraction,
                min_volume, use_top_asset_universe, settlement_currency
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.chat_id)
        .bind(serde_json::to_string(&profile.asset_whitelist)?)
        .bind(serde_json::to_string(&profile.asset_blacklist)?)
        .bind(serde_json::to_string(&profile.venue_whitelist)?)
        .bind(profile.venue_filtering_paused)
        .bind(profile.scan_paused)
        .bind(profile.min_profit_fraction.to_string())
        .bind(profile.min_volume.to_string())
        .bind(profile.use_top_asset_universe)
        .bind(&profile.settlement_currency)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
