//! Bout ledger import
//!
//! Bouts are insert-if-absent, so re-running a range only fills gaps.

use crate::config::JobConfig;
use crate::error::Result;
use crate::source::SumoApiClient;
use crate::writer::{write_bout, ImportStats};
use sqlx::PgPool;
use sumo_common::types::{BashoId, Division};
use tracing::{error, info, warn};

const JOB: &str = "bouts";

/// Days in a regular tournament.
pub const TOURNAMENT_DAYS: u8 = 15;

/// Fetch and store one day of one division.
///
/// A failed fetch skips the day and counts one error.
pub async fn import_day(
    pool: &PgPool,
    client: &SumoApiClient,
    basho: &BashoId,
    division: Division,
    day: u8,
    stats: &mut ImportStats,
) {
    let schedule = match client.fetch_bouts_for_day(basho, division, day).await {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!(basho = %basho, %division, day, error = %e, "Skipping day");
            stats.errored += 1;
            return;
        },
    };

    for bout in &schedule.torikumi {
        match write_bout(pool, bout).await {
            Ok(true) => stats.imported += 1,
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                error!(
                    basho = %basho,
                    %division,
                    day,
                    match_no = bout.match_no,
                    error = %e,
                    "Failed to store bout"
                );
                stats.errored += 1;
            },
        }
    }
}

pub async fn run(pool: &PgPool, client: &SumoApiClient, jobs: &JobConfig) -> Result<ImportStats> {
    let schedule = BashoId::schedule(jobs.bouts_from_year, jobs.to_year, &jobs.latest_basho);
    info!(
        from = jobs.bouts_from_year,
        to = %jobs.latest_basho,
        tournaments = schedule.len(),
        divisions = ?jobs.bout_divisions,
        "Starting bout import"
    );

    let mut stats = ImportStats::new();
    for basho in &schedule {
        for &division in &jobs.bout_divisions {
            for day in 1..=TOURNAMENT_DAYS {
                import_day(pool, client, basho, division, day, &mut stats).await;
            }
            info!(
                basho = %basho,
                %division,
                imported = stats.imported,
                skipped = stats.skipped,
                "Division complete"
            );
        }
    }

    stats.complete();
    stats.log_summary(JOB);
    Ok(stats)
}
