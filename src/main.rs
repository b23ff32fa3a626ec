//! Spreadwatch
//!
//! Multi-tenant cross-venue arbitrage alert bot.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use spreadwatch::{
    cache::{self, TopAssetCache},
    client::{CoinGeckoClient, PriceProvider},
    config::Config,
    market_data::MarketDataSource,
    notify::{DisabledNotifier, NotificationSink, TelegramNotifier},
    scanner::{run_scan_loop, ScanOrchestrator},
    storage::SqliteSubscriberStore,
    types::format_volume,
    universe::UniverseResolver,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spreadwatch")]
#[command(about = "Cross-venue crypto arbitrage alert bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scan engine with its timers
    Run,
    /// Execute a single scan cycle and exit
    Scan,
    /// Show the current top assets by market cap
    TopAssets {
        /// Number of assets to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Send a test notification to a chat
    TestNotify {
        /// Telegram chat id
        chat_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Scan => run_single_cycle(config).await,
        Commands::TopAssets { limit } => show_top_assets(config, limit).await,
        Commands::TestNotify { chat_id } => test_notify(config, &chat_id).await,
    }
}

fn build_notifier(config: &Config) -> Arc<dyn NotificationSink> {
    match &config.telegram {
        Some(tg) => Arc::new(TelegramNotifier::new(tg.bot_token.clone())),
        None => {
            tracing::warn!("Telegram not configured, notifications disabled");
            Arc::new(DisabledNotifier)
        }
    }
}

async fn build_engine(
    config: &Config,
) -> anyhow::Result<(
    Arc<ScanOrchestrator>,
    Arc<TopAssetCache>,
    Arc<dyn PriceProvider>,
)> {
    let provider: Arc<dyn PriceProvider> = Arc::new(CoinGeckoClient::new(&config.provider)?);
    let store = Arc::new(SqliteSubscriberStore::connect(&config.database.path).await?);
    let cache = Arc::new(TopAssetCache::new());

    let orchestrator = Arc::new(ScanOrchestrator::new(
        store,
        UniverseResolver::new(cache.clone()),
        MarketDataSource::new(provider.clone()),
        build_notifier(config),
        config.scan.max_concurrent_fetches,
    ));

    Ok((orchestrator, cache, provider))
}

async fn run_bot(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting spreadwatch scan engine");

    let (orchestrator, cache, provider) = build_engine(&config).await?;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let refresh = tokio::spawn(cache::run_refresh_loop(
        cache,
        provider,
        config.provider.top_assets_limit,
        Duration::from_secs(config.scan.cache_refresh_secs),
        shutdown_rx.clone(),
    ));

    let scan = tokio::spawn(run_scan_loop(
        orchestrator.clone(),
        Duration::from_secs(config.scan.interval_secs),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    orchestrator.shutdown();
    let _ = shutdown_tx.send(true);

    let _ = tokio::join!(refresh, scan);
    tracing::info!("Scan engine stopped");
    Ok(())
}

async fn run_single_cycle(config: Config) -> anyhow::Result<()> {
    let (orchestrator, cache, provider) = build_engine(&config).await?;

    cache::refresh(&cache, provider.as_ref(), config.provider.top_assets_limit).await;
    let stats = orchestrator.run_cycle().await;

    println!(
        "Cycle complete: {} subscribers, {} pairs scanned, {} opportunities, {} pairs skipped",
        stats.subscribers, stats.pairs_scanned, stats.opportunities, stats.pairs_skipped
    );
    Ok(())
}

async fn show_top_assets(config: Config, limit: usize) -> anyhow::Result<()> {
    let provider = CoinGeckoClient::new(&config.provider)?;
    let assets = provider.top_assets(limit).await?;

    println!("\n📊 Top {} assets by market cap:\n", assets.len());
    println!("{:<10} {:<28} {:>18}", "Symbol", "Name", "Market cap");
    println!("{}", "-".repeat(58));

    for asset in assets {
        let cap = asset
            .market_cap
            .map(format_volume)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<28} {:>18}",
            asset.symbol.to_uppercase(),
            asset.name,
            cap
        );
    }

    Ok(())
}

async fn test_notify(config: Config, chat_id: &str) -> anyhow::Result<()> {
    let tg = config
        .telegram
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Telegram not configured in config.toml"))?;

    let notifier = TelegramNotifier::new(tg.bot_token.clone());
    notifier
        .send(
            chat_id,
            "🧪 <b>Test Notification</b>\n\nIf you see this, Telegram integration is working!",
        )
        .await?;

    println!("✅ Test notification sent!");
    Ok(())
}
