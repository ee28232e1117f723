//! Sync orchestration.
//!
//! A district sync fetches, normalizes and writes records one at a time,
//! swallowing per-record store failures. The batch orchestrator walks the
//! fixed district list strictly sequentially with a throttle pause between
//! districts; one district failing never stops the rest.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{FETCH_LIMIT, WriteMode},
    error::{FetchError, StoreError},
    fetch::RecordFetcher,
    normalize::{SchemeRecord, normalize},
    store::RecordStore,
};

/// Pacing between districts in a batch sync. The production impl sleeps;
/// tests substitute one that does not.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

pub struct FixedDelay(pub Duration);

#[async_trait]
impl Throttle for FixedDelay {
    async fn pause(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Counts for a single district sync. `synced` never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub total: usize,
}

/// Per-district result of a batch sync, in the wire shape the sync-all
/// endpoint returns.
#[derive(Serialize, Debug, Clone)]
pub struct DistrictOutcome {
    pub district: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DistrictOutcome {
    fn synced(district: &str, report: SyncReport) -> Self {
        Self {
            district: district.to_string(),
            success: true,
            synced: Some(report.synced),
            total: Some(report.total),
            error: None,
        }
    }

    fn failed(district: &str, error: String) -> Self {
        Self {
            district: district.to_string(),
            success: false,
            synced: None,
            total: None,
            error: Some(error),
        }
    }
}

pub struct Syncer {
    fetcher: Arc<dyn RecordFetcher>,
    store: Arc<dyn RecordStore>,
    throttle: Arc<dyn Throttle>,
    write_mode: WriteMode,
}

impl Syncer {
    pub fn new(
        fetcher: Arc<dyn RecordFetcher>,
        store: Arc<dyn RecordStore>,
        throttle: Arc<dyn Throttle>,
        write_mode: WriteMode,
    ) -> Self {
        Self {
            fetcher,
            store,
            throttle,
            write_mode,
        }
    }

    /// Sync one district. Zero fetched records is a success with zero counts;
    /// only the fetch itself failing is an error. Store failures are logged
    /// and counted as not-synced without aborting the loop.
    pub async fn sync_district(&self, district: &str) -> Result<SyncReport, FetchError> {
        let records = self.fetcher.fetch(district, FETCH_LIMIT).await?;
        let total = records.len();
        let mut synced = 0;

        for raw in &records {
            let record = normalize(raw, district, Utc::now());

            match self.write(&record).await {
                Ok(()) => synced += 1,
                Err(e) => warn!("Failed to store record for {district}: {e}"),
            }
        }

        info!("Synced {synced}/{total} records for {district}");
        Ok(SyncReport { synced, total })
    }

    /// Sync every district in order, strictly sequentially, pausing after
    /// each attempt. Always returns exactly one outcome per input district.
    pub async fn sync_all(&self, districts: &[&str]) -> Vec<DistrictOutcome> {
        let mut results = Vec::with_capacity(districts.len());

        for district in districts {
            let outcome = match self.sync_district(district).await {
                Ok(report) => DistrictOutcome::synced(district, report),
                Err(e) => {
                    warn!("Sync failed for {district}: {e}");
                    DistrictOutcome::failed(district, e.to_string())
                }
            };
            results.push(outcome);

            self.throttle.pause().await;
        }

        results
    }

    async fn write(&self, record: &SchemeRecord) -> Result<(), StoreError> {
        if self.write_mode == WriteMode::Upsert {
            if let Some(id) = self.existing_id(record).await? {
                return self.store.replace(&id, record).await;
            }
        }

        self.store.insert(record).await.map(|_| ())
    }

    /// Natural key for upsert mode is (district, fin_year). The store only
    /// filters on one field, so the fiscal year is matched here.
    async fn existing_id(&self, record: &SchemeRecord) -> Result<Option<String>, StoreError> {
        let listing = self.store.list(Some(("district", &record.district))).await?;

        Ok(listing
            .documents
            .into_iter()
            .find(|d| d.record.fin_year == record.fin_year)
            .map(|d| d.id))
    }
}
