use lapboard::config::SETTINGS;
use lapboard::core::{cache::SnapshotCache, ranking::SnapshotBuilder};
use lapboard::server::{self, AppState};
use lapboard::store::{client::HttpLapStore, LapStore};

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = &SETTINGS;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    let store: Arc<dyn LapStore> = Arc::new(HttpLapStore::new(
        settings.store_base_url.clone(),
        Duration::from_secs(settings.store_api_timeout_sec),
        settings.store_api_token.clone(),
    ));

    let builder = SnapshotBuilder::new(store.clone(), settings.timezone_hours_offset);
    let cache = SnapshotCache::new(builder, Duration::from_secs(settings.snapshot_ttl_sec));

    info!(
        "Starting lap board server, snapshot TTL {}s.",
        settings.snapshot_ttl_sec
    );
    server::serve(&settings.listen_addr, Arc::new(AppState { cache, store })).await?;

    Ok(())
}
