//! Loaders that read the stored ledger into `sumo_stats` inputs

use crate::error::{IngestError, Result};
use sqlx::PgPool;
use sumo_common::types::BashoId;
use sumo_stats::{BoutResult, RankEntry};

#[derive(Debug, sqlx::FromRow)]
struct BoutRow {
    basho_id: String,
    day: i32,
    match_no: i32,
    east_shikona: String,
    east_rank: Option<String>,
    west_shikona: String,
    west_rank: Option<String>,
    kimarite: Option<String>,
    winner_en: Option<String>,
}

impl From<BoutRow> for BoutResult {
    fn from(row: BoutRow) -> Self {
        Self {
            basho_id: row.basho_id,
            day: row.day,
            match_no: row.match_no,
            east_shikona: row.east_shikona,
            east_rank: row.east_rank,
            west_shikona: row.west_shikona,
            west_rank: row.west_rank,
            kimarite: row.kimarite,
            winner: row.winner_en.filter(|w| !w.trim().is_empty()),
        }
    }
}

const BOUT_COLUMNS: &str = "basho_id, day, match_no, east_shikona, east_rank, \
                            west_shikona, west_rank, kimarite, winner_en";

/// All bouts, or one tournament's, in schedule order.
pub async fn load_bouts(pool: &PgPool, basho: Option<&BashoId>) -> Result<Vec<BoutResult>> {
    let sql = format!(
        "SELECT {BOUT_COLUMNS} FROM bouts \
         WHERE ($1::TEXT IS NULL OR basho_id = $1) \
         ORDER BY basho_id, division, day, match_no"
    );
    let rows: Vec<BoutRow> = sqlx::query_as(&sql)
        .bind(basho.map(BashoId::as_str))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(BoutResult::from).collect())
}

/// Bouts one wrestler took part in, optionally within one tournament.
pub async fn load_rikishi_bouts(
    pool: &PgPool,
    shikona: &str,
    basho: Option<&BashoId>,
) -> Result<Vec<BoutResult>> {
    let sql = format!(
        "SELECT {BOUT_COLUMNS} FROM bouts \
         WHERE (east_shikona = $1 OR west_shikona = $1) \
           AND ($2::TEXT IS NULL OR basho_id = $2) \
         ORDER BY basho_id, day, match_no"
    );
    let rows: Vec<BoutRow> = sqlx::query_as(&sql)
        .bind(shikona)
        .bind(basho.map(BashoId::as_str))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(BoutResult::from).collect())
}

/// Decided bouts between `a` and `b`, in either east/west orientation.
pub async fn load_head_to_head_bouts(pool: &PgPool, a: &str, b: &str) -> Result<Vec<BoutResult>> {
    let sql = format!(
        "SELECT {BOUT_COLUMNS} FROM bouts \
         WHERE ((east_shikona = $1 AND west_shikona = $2) \
             OR (east_shikona = $2 AND west_shikona = $1)) \
           AND winner_en IS NOT NULL AND winner_en <> '' \
         ORDER BY basho_id, day"
    );
    let rows: Vec<BoutRow> = sqlx::query_as(&sql)
        .bind(a)
        .bind(b)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(BoutResult::from).collect())
}

pub async fn load_rank_history(pool: &PgPool, rikishi_id: i32) -> Result<Vec<RankEntry>> {
    let rows: Vec<(String, String, Option<i32>)> = sqlx::query_as(
        "SELECT basho_id, rank, rank_value FROM ranks WHERE rikishi_id = $1 ORDER BY basho_id",
    )
    .bind(rikishi_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(basho_id, rank, rank_value)| RankEntry::new(basho_id, rank, rank_value))
        .collect())
}

pub async fn rikishi_name(pool: &PgPool, rikishi_id: i32) -> Result<String> {
    sqlx::query_scalar("SELECT shikona_en FROM rikishis WHERE id = $1")
        .bind(rikishi_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| IngestError::not_found("Rikishi", rikishi_id))
}
