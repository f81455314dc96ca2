//! Height and weight refresh for known wrestlers

use crate::error::Result;
use crate::source::{RikishiRecord, SumoApiClient};
use crate::writer::ImportStats;
use sqlx::PgPool;
use tracing::{error, info, warn};

const JOB: &str = "measurements";

/// Write current height/weight; absent values keep the stored ones.
/// Returns `false` when the record carries no measurements.
pub async fn apply_measurements(pool: &PgPool, id: i32, record: &RikishiRecord) -> Result<bool> {
    if !record.has_measurements() {
        return Ok(false);
    }
    sqlx::query(
        r#"
        UPDATE rikishis
        SET height = COALESCE($2, height),
            weight = COALESCE($3, weight),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(record.height())
    .bind(record.weight())
    .execute(pool)
    .await?;
    Ok(true)
}

pub async fn run(pool: &PgPool, client: &SumoApiClient) -> Result<ImportStats> {
    let targets: Vec<(i32, i32)> = sqlx::query_as(
        r#"
        SELECT id, COALESCE(sumo_api_id, sumo_db_id)
        FROM rikishis
        WHERE sumo_db_id IS NOT NULL
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    info!(rikishi = targets.len(), "Starting measurements refresh");

    let mut stats = ImportStats::new();
    for (id, source_id) in targets {
        let record = match client.fetch_rikishi_by_id(source_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                stats.skipped += 1;
                continue;
            },
            Err(e) => {
                warn!(id, source_id, error = %e, "Failed to fetch rikishi");
                stats.errored += 1;
                continue;
            },
        };

        match apply_measurements(pool, id, &record).await {
            Ok(true) => stats.updated += 1,
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                error!(id, error = %e, "Failed to update measurements");
                stats.errored += 1;
            },
        }
        stats.log_progress(JOB);
    }

    stats.complete();
    stats.log_summary(JOB);
    Ok(stats)
}
