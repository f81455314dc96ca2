//! Banzuke import for every stored tournament

use crate::error::Result;
use crate::source::{BanzukeRecord, SumoApiClient};
use crate::writer::{upsert_banzuke_entry, BanzukeRow, ImportStats};
use sqlx::PgPool;
use sumo_common::types::{BashoId, Division, Side};
use tracing::{debug, error, info, warn};

const JOB: &str = "banzuke";

/// Local wrestler for a banzuke line: by source id first, then by name.
pub async fn link_entry(pool: &PgPool, record: &BanzukeRecord) -> Result<Option<i32>> {
    let by_id: Option<i32> = sqlx::query_scalar("SELECT id FROM rikishis WHERE sumo_api_id = $1")
        .bind(record.rikishi_id)
        .fetch_optional(pool)
        .await?;
    if by_id.is_some() {
        return Ok(by_id);
    }

    let by_name = sqlx::query_scalar(
        "SELECT id FROM rikishis WHERE shikona_en = $1 ORDER BY id LIMIT 1",
    )
    .bind(record.shikona_en.trim())
    .fetch_optional(pool)
    .await?;
    Ok(by_name)
}

async fn store_entry(pool: &PgPool, mut row: BanzukeRow, record: &BanzukeRecord) -> Result<bool> {
    row.rikishi_id = link_entry(pool, record).await?;
    upsert_banzuke_entry(pool, &row).await
}

/// Store both sides of one division's sheet.
pub async fn import_division(
    pool: &PgPool,
    client: &SumoApiClient,
    basho: &BashoId,
    division: Division,
    stats: &mut ImportStats,
) {
    let sheet = match client.fetch_banzuke(basho, division).await {
        Ok(Some(sheet)) if !sheet.is_empty() => sheet,
        Ok(_) => {
            debug!(basho = %basho, %division, "No banzuke");
            return;
        },
        Err(e) => {
            warn!(basho = %basho, %division, error = %e, "Failed to fetch banzuke");
            stats.errored += 1;
            return;
        },
    };

    for (side, records) in [(Side::East, &sheet.east), (Side::West, &sheet.west)] {
        for record in records {
            let row = BanzukeRow::new(basho.clone(), division, side, record);
            match store_entry(pool, row, record).await {
                Ok(inserted) => stats.record_upsert(inserted),
                Err(e) => {
                    error!(
                        basho = %basho,
                        %division,
                        source_id = record.rikishi_id,
                        error = %e,
                        "Failed to store banzuke entry"
                    );
                    stats.errored += 1;
                },
            }
        }
    }
}

pub async fn run(pool: &PgPool, client: &SumoApiClient) -> Result<ImportStats> {
    let stored: Vec<String> = sqlx::query_scalar("SELECT basho_id FROM basho ORDER BY basho_id")
        .fetch_all(pool)
        .await?;
    info!(tournaments = stored.len(), "Starting banzuke import");

    let mut stats = ImportStats::new();
    for raw in stored {
        let basho: BashoId = match raw.parse() {
            Ok(basho) => basho,
            Err(e) => {
                warn!(basho = %raw, error = %e, "Skipping stored basho with invalid id");
                stats.skipped += 1;
                continue;
            },
        };
        for division in Division::ALL {
            import_division(pool, client, &basho, division, &mut stats).await;
        }
        info!(
            basho = %basho,
            imported = stats.imported,
            updated = stats.updated,
            errored = stats.errored,
            "Basho banzuke complete"
        );
    }

    stats.complete();
    stats.log_summary(JOB);
    Ok(stats)
}
