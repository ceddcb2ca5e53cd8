// Repository trait for the externally loaded reading snapshot
use crate::domain::emission::EmissionSource;
use crate::domain::ranking::RankingEntry;
use crate::domain::reading::Reading;
use async_trait::async_trait;

/// Everything the views render from, loaded once.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub readings: Vec<Reading>,
    pub ranking: Vec<RankingEntry>,
    pub emissions: Vec<EmissionSource>,
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// City and station readings (current, history and forecast rows)
    async fn load_readings(&self) -> anyhow::Result<Vec<Reading>>;

    /// Most-polluted-city ranking, in rank order
    async fn load_ranking(&self) -> anyhow::Result<Vec<RankingEntry>>;

    /// Emission sources for the emissions map
    async fn load_emissions(&self) -> anyhow::Result<Vec<EmissionSource>>;
}

pub async fn load_snapshot(repository: &dyn SnapshotRepository) -> anyhow::Result<Snapshot> {
    let readings = repository.load_readings().await?;
    let ranking = repository.load_ranking().await?;
    let emissions = repository.load_emissions().await?;

    tracing::info!(
        "Loaded snapshot: {} readings, {} ranking entries, {} emission sources",
        readings.len(),
        ranking.len(),
        emissions.len()
    );

    Ok(Snapshot {
        readings,
        ranking,
        emissions,
    })
}
