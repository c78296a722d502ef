pub mod client;

use crate::{core::ranking::RankingEntry, error::BoardResult};
use async_trait::async_trait;

/// Data-access collaborator holding runners and their lap counts. The fetch
/// returns a fully-materialized list since the builder sorts the whole set.
#[async_trait]
pub trait LapStore: Send + Sync {
    async fn fetch_runners_with_counts(&self) -> BoardResult<Vec<RankingEntry>>;

    /// Record one completed lap for a runner and return the new total.
    async fn record_lap(&self, runner_number: u32) -> BoardResult<u32>;
}
