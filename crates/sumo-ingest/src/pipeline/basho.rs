//! Tournament header import

use crate::config::JobConfig;
use crate::error::Result;
use crate::source::SumoApiClient;
use crate::writer::{upsert_basho, BashoRow, ImportStats};
use sqlx::PgPool;
use sumo_common::types::BashoId;
use tracing::{debug, error, info};

const JOB: &str = "basho";

/// Upsert one tournament header. `Ok(None)` when the source has no data.
pub async fn import_basho(
    pool: &PgPool,
    client: &SumoApiClient,
    basho: &BashoId,
) -> Result<Option<bool>> {
    let Some(header) = client.fetch_basho_header(basho).await? else {
        return Ok(None);
    };
    let row = BashoRow::from_header(basho.clone(), &header);
    let inserted = upsert_basho(pool, &row).await?;
    Ok(Some(inserted))
}

/// Every regular tournament in the configured year range.
pub async fn run(pool: &PgPool, client: &SumoApiClient, jobs: &JobConfig) -> Result<ImportStats> {
    let schedule = BashoId::schedule(jobs.basho_from_year, jobs.to_year, &jobs.latest_basho);
    info!(
        from = jobs.basho_from_year,
        to = %jobs.latest_basho,
        tournaments = schedule.len(),
        "Starting basho import"
    );

    let mut stats = ImportStats::new();
    for basho in &schedule {
        match import_basho(pool, client, basho).await {
            Ok(Some(inserted)) => stats.record_upsert(inserted),
            Ok(None) => {
                debug!(basho = %basho, "No data for basho");
                stats.skipped += 1;
            },
            Err(e) => {
                error!(basho = %basho, error = %e, "Failed to import basho");
                stats.errored += 1;
            },
        }
        stats.log_progress(JOB);
    }

    stats.complete();
    stats.log_summary(JOB);
    Ok(stats)
}
