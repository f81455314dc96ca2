//! Recompute the `wins`/`losses` counters from the bout ledger

use crate::error::Result;
use crate::queries::load_bouts;
use crate::writer::ImportStats;
use sqlx::PgPool;
use sumo_stats::career_records;
use tracing::{error, info};

const JOB: &str = "records";

/// Rewrite every wrestler's counters; rows already correct are left alone
/// and counted as skipped.
pub async fn recompute_win_loss(pool: &PgPool) -> Result<ImportStats> {
    let bouts = load_bouts(pool, None).await?;
    let records = career_records(&bouts);

    let roster: Vec<(i32, String)> =
        sqlx::query_as("SELECT id, shikona_en FROM rikishis ORDER BY id")
            .fetch_all(pool)
            .await?;
    info!(bouts = bouts.len(), rikishi = roster.len(), "Recomputing win/loss records");

    let mut stats = ImportStats::new();
    for (id, shikona) in roster {
        let record = records.get(&shikona).copied().unwrap_or_default();
        let result = sqlx::query(
            r#"
            UPDATE rikishis
            SET wins = $1, losses = $2, updated_at = NOW()
            WHERE id = $3 AND (wins <> $1 OR losses <> $2)
            "#,
        )
        .bind(i32::try_from(record.wins).unwrap_or(i32::MAX))
        .bind(i32::try_from(record.losses).unwrap_or(i32::MAX))
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => stats.updated += 1,
            Ok(_) => stats.skipped += 1,
            Err(e) => {
                error!(id, shikona = %shikona, error = %e, "Failed to update record");
                stats.errored += 1;
            },
        }
        stats.log_progress(JOB);
    }

    stats.complete();
    stats.log_summary(JOB);
    Ok(stats)
}
