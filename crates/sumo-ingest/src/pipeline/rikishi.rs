//! Wrestler catalog import
//!
//! Each record goes through resolve → write → history replace inside a
//! single transaction, so a failure leaves the wrestler exactly as it was.

use crate::config::SourceConfig;
use crate::error::Result;
use crate::history::{replace_history, HistoryCounts};
use crate::resolve::{resolve, IdentityKey, PgRikishiLookup, Resolution};
use crate::source::{RikishiRecord, SumoApiClient};
use crate::writer::{write_rikishi, ImportStats, WriteOutcome};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

const JOB: &str = "rikishi";

/// Imports single wrestler records.
#[derive(Debug, Clone)]
pub struct RikishiImporter {
    pool: PgPool,
}

impl RikishiImporter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve, write and replace history for one record in one transaction.
    pub async fn import_one(
        &self,
        record: &RikishiRecord,
    ) -> Result<(Resolution, WriteOutcome, HistoryCounts)> {
        let mut tx = self.pool.begin().await?;

        let key = IdentityKey::from(record);
        let resolution = resolve(&mut PgRikishiLookup::new(&mut tx), &key).await?;
        let outcome = write_rikishi(&mut tx, resolution, record).await?;
        let counts = replace_history(&mut tx, outcome.id(), record).await?;

        tx.commit().await?;
        Ok((resolution, outcome, counts))
    }

    /// Import one record and fold the result into `stats`. Failures are
    /// logged and counted; they never propagate.
    pub async fn import_record(&self, record: &RikishiRecord, stats: &mut ImportStats) {
        match self.import_one(record).await {
            Ok((resolution, outcome, counts)) => {
                debug!(
                    source_id = record.id,
                    shikona = %record.shikona_en,
                    ?resolution,
                    ?outcome,
                    "Imported rikishi"
                );
                stats.record_outcome(outcome);
                stats.add_history(counts);
            },
            Err(e) => {
                error!(
                    source_id = record.id,
                    shikona = %record.shikona_en,
                    error = %e,
                    "Failed to import rikishi"
                );
                stats.errored += 1;
            },
        }
    }
}

/// Stop conditions for the sequential id scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    upper_bound: u32,
    max_misses: u32,
    misses: u32,
}

impl CrawlBudget {
    /// Source ids are `i32`, so the bound never passes `i32::MAX`.
    pub fn new(total: u32, overscan: u32, max_misses: u32) -> Self {
        Self {
            upper_bound: total.saturating_add(overscan).min(i32::MAX.unsigned_abs()),
            max_misses,
            misses: 0,
        }
    }

    pub fn upper_bound(&self) -> u32 {
        self.upper_bound
    }

    pub fn allows(&self, id: u32) -> bool {
        id <= self.upper_bound && !self.exhausted()
    }

    /// The id to fetch after `id`, if the crawl should continue.
    pub fn next_id(&self, id: u32) -> Option<u32> {
        id.checked_add(1).filter(|&next| self.allows(next))
    }

    /// Too many unassigned ids in a row.
    pub fn exhausted(&self) -> bool {
        self.misses >= self.max_misses
    }

    pub fn hit(&mut self) {
        self.misses = 0;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }
}

/// Full-catalog crawl: fetch ids `1..=total + overscan` one at a time.
pub struct RikishiCrawler {
    client: SumoApiClient,
    importer: RikishiImporter,
    max_consecutive_misses: u32,
    crawl_overscan: u32,
}

impl RikishiCrawler {
    pub fn new(client: SumoApiClient, pool: PgPool, source: &SourceConfig) -> Self {
        Self {
            client,
            importer: RikishiImporter::new(pool),
            max_consecutive_misses: source.max_consecutive_misses,
            crawl_overscan: source.crawl_overscan,
        }
    }

    /// Run the crawl. Only failing to learn the catalog size is fatal.
    pub async fn run(&self) -> Result<ImportStats> {
        let mut stats = ImportStats::new();

        let first_page = self.client.fetch_rikishi_page(0).await?;
        let mut budget = CrawlBudget::new(
            first_page.total,
            self.crawl_overscan,
            self.max_consecutive_misses,
        );
        info!(
            total = first_page.total,
            upper_bound = budget.upper_bound(),
            "Starting rikishi crawl"
        );

        let mut last_id: u32 = 0;
        let mut not_found: u32 = 0;
        let mut next_id = budget.next_id(last_id);
        while let Some(id) = next_id {
            let Ok(source_id) = i32::try_from(id) else {
                break;
            };
            match self.client.fetch_rikishi_by_id(source_id).await {
                Ok(Some(record)) => {
                    budget.hit();
                    self.importer.import_record(&record, &mut stats).await;
                    stats.log_progress(JOB);
                },
                Ok(None) => {
                    budget.miss();
                    not_found += 1;
                },
                Err(e) => {
                    warn!(source_id, error = %e, "Failed to fetch rikishi");
                    stats.errored += 1;
                    stats.log_progress(JOB);
                },
            }
            last_id = id;
            next_id = budget.next_id(id);
        }

        if budget.exhausted() {
            info!(
                last_id,
                misses = self.max_consecutive_misses,
                "Stopped after consecutive unassigned ids"
            );
        }
        info!(not_found, "Unassigned ids seen");

        stats.complete();
        stats.log_summary(JOB);
        Ok(stats)
    }
}
