// JSON file repository implementation
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::emission::EmissionSource;
use crate::domain::ranking::RankingEntry;
use crate::domain::reading::Reading;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonRepository {
    readings: PathBuf,
    ranking: Option<PathBuf>,
    emissions: Option<PathBuf>,
}

impl JsonRepository {
    pub fn new(readings: PathBuf, ranking: Option<PathBuf>, emissions: Option<PathBuf>) -> Self {
        Self {
            readings,
            ranking,
            emissions,
        }
    }

    async fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_slice(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Optional datasets read as empty when not configured.
    async fn read_optional<T: DeserializeOwned>(path: Option<&PathBuf>) -> Result<Vec<T>> {
        match path {
            Some(path) => Self::read_array(path).await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl SnapshotRepository for JsonRepository {
    async fn load_readings(&self) -> Result<Vec<Reading>> {
        Self::read_array(&self.readings).await
    }

    async fn load_ranking(&self) -> Result<Vec<RankingEntry>> {
        Self::read_optional(self.ranking.as_ref()).await
    }

    async fn load_emissions(&self) -> Result<Vec<EmissionSource>> {
        Self::read_optional(self.emissions.as_ref()).await
    }
}
