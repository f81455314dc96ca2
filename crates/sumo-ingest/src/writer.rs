//! Upsert writer for wrestlers, tournaments, bouts and banzuke entries

use crate::error::Result;
use crate::history::HistoryCounts;
use crate::resolve::Resolution;
use crate::source::models::{
    non_empty, parse_api_date, BanzukeRecord, BoutRecord, RikishiRecord, TorikumiDay,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use sumo_common::types::{BashoId, Division, Side};
use tracing::{info, warn};

/// Processed records between two progress lines.
pub const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted(i32),
    Updated(i32),
}

impl WriteOutcome {
    pub fn id(&self) -> i32 {
        match self {
            WriteOutcome::Inserted(id) | WriteOutcome::Updated(id) => *id,
        }
    }
}

/// The incoming API id, unless a different row already holds it.
async fn claimable_api_id(
    conn: &mut PgConnection,
    id: i32,
    sumo_api_id: Option<i32>,
) -> Result<Option<i32>> {
    let Some(api_id) = sumo_api_id else {
        return Ok(None);
    };

    let holder: Option<i32> =
        sqlx::query_scalar("SELECT id FROM rikishis WHERE sumo_api_id = $1 AND id <> $2")
            .bind(api_id)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match holder {
        Some(holder) => {
            warn!(
                rikishi_id = id,
                holder_id = holder,
                sumo_api_id = api_id,
                "sumo_api_id already belongs to another rikishi, keeping the stored value"
            );
            Ok(None)
        },
        None => Ok(Some(api_id)),
    }
}

/// Insert a new wrestler or update the resolved one in place.
///
/// External ids are never cleared by an update that lacks them, and the
/// same holds for height and weight. An API id already held by another
/// row is left alone.
pub async fn write_rikishi(
    conn: &mut PgConnection,
    resolution: Resolution,
    record: &RikishiRecord,
) -> Result<WriteOutcome> {
    let sumo_api_id = Some(record.id).filter(|id| *id > 0);

    match resolution.local_id() {
        Some(id) => {
            let sumo_api_id = claimable_api_id(conn, id, sumo_api_id).await?;
            sqlx::query(
                r#"
                UPDATE rikishis SET
                    sumo_api_id = COALESCE($2, sumo_api_id),
                    sumo_db_id = COALESCE($3, sumo_db_id),
                    nsk_id = COALESCE($4, nsk_id),
                    shikona_en = COALESCE(NULLIF($5, ''), shikona_en),
                    shikona_jp = COALESCE($6, shikona_jp),
                    current_rank = COALESCE($7, current_rank),
                    heya = COALESCE($8, heya),
                    birth_date = COALESCE($9, birth_date),
                    shusshin = COALESCE($10, shusshin),
                    height = COALESCE($11, height),
                    weight = COALESCE($12, weight),
                    debut = COALESCE($13, debut),
                    intai = COALESCE($14, intai),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(sumo_api_id)
            .bind(record.sumo_db_id())
            .bind(record.nsk_id())
            .bind(record.shikona_en.trim())
            .bind(non_empty(&record.shikona_jp))
            .bind(non_empty(&record.current_rank))
            .bind(non_empty(&record.heya))
            .bind(record.birth_date())
            .bind(non_empty(&record.shusshin))
            .bind(record.height())
            .bind(record.weight())
            .bind(record.debut())
            .bind(non_empty(&record.intai))
            .execute(&mut *conn)
            .await?;

            Ok(WriteOutcome::Updated(id))
        },
        None => {
            let id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO rikishis (
                    sumo_api_id, sumo_db_id, nsk_id, shikona_en, shikona_jp, current_rank,
                    heya, birth_date, shusshin, height, weight, debut, intai
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING id
                "#,
            )
            .bind(sumo_api_id)
            .bind(record.sumo_db_id())
            .bind(record.nsk_id())
            .bind(record.shikona_en.trim())
            .bind(non_empty(&record.shikona_jp))
            .bind(non_empty(&record.current_rank))
            .bind(non_empty(&record.heya))
            .bind(record.birth_date())
            .bind(non_empty(&record.shusshin))
            .bind(record.height())
            .bind(record.weight())
            .bind(record.debut())
            .bind(non_empty(&record.intai))
            .fetch_one(&mut *conn)
            .await?;

            Ok(WriteOutcome::Inserted(id))
        },
    }
}

/// Insert a bout unless its `(basho_id, division, day, match_no)` key
/// already exists. Returns `false` for an existing bout.
pub async fn write_bout(pool: &PgPool, bout: &BoutRecord) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO bouts (
            basho_id, division, day, match_no,
            east_id, east_shikona, east_rank,
            west_id, west_shikona, west_rank,
            kimarite, winner_id, winner_en, winner_jp
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (basho_id, division, day, match_no) DO NOTHING
        "#,
    )
    .bind(&bout.basho_id)
    .bind(&bout.division)
    .bind(bout.day)
    .bind(bout.match_no)
    .bind(bout.east_id)
    .bind(&bout.east_shikona)
    .bind(non_empty(&bout.east_rank))
    .bind(bout.west_id)
    .bind(&bout.west_shikona)
    .bind(non_empty(&bout.west_rank))
    .bind(non_empty(&bout.kimarite))
    .bind(bout.winner_id.filter(|id| *id > 0))
    .bind(non_empty(&bout.winner_en))
    .bind(non_empty(&bout.winner_jp))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Tournament header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BashoRow {
    pub basho_id: BashoId,
    pub date: String,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub division: Division,
    pub yusho_winner_id: Option<i32>,
    pub yusho_winner_name: Option<String>,
}

impl BashoRow {
    /// Build from a top-division day payload. Missing location and date
    /// fall back to `"Unknown"` and the tournament id.
    pub fn from_header(basho_id: BashoId, header: &TorikumiDay) -> Self {
        let division = Division::Makuuchi;
        let yusho = header.yusho_for(division.as_str());

        Self {
            date: non_empty(&header.date)
                .map(str::to_string)
                .unwrap_or_else(|| basho_id.to_string()),
            location: non_empty(&header.location).unwrap_or("Unknown").to_string(),
            start_date: header.start_date.as_deref().and_then(parse_api_date),
            end_date: header.end_date.as_deref().and_then(parse_api_date),
            division,
            yusho_winner_id: yusho.and_then(|y| y.rikishi_id).filter(|id| *id > 0),
            yusho_winner_name: yusho.and_then(|y| non_empty(&y.shikona_en)).map(str::to_string),
            basho_id,
        }
    }
}

/// Insert or overwrite a tournament by `basho_id`. Returns `true` when the
/// row was new.
pub async fn upsert_basho(pool: &PgPool, basho: &BashoRow) -> Result<bool> {
    let inserted = sqlx::query_scalar(
        r#"
        INSERT INTO basho (
            basho_id, date, location, start_date, end_date, division,
            yusho_winner_id, yusho_winner_name
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (basho_id) DO UPDATE SET
            date = EXCLUDED.date,
            location = EXCLUDED.location,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            division = EXCLUDED.division,
            yusho_winner_id = EXCLUDED.yusho_winner_id,
            yusho_winner_name = EXCLUDED.yusho_winner_name,
            updated_at = NOW()
        RETURNING (xmax = 0)
        "#,
    )
    .bind(basho.basho_id.as_str())
    .bind(&basho.date)
    .bind(&basho.location)
    .bind(basho.start_date)
    .bind(basho.end_date)
    .bind(basho.division.as_str())
    .bind(basho.yusho_winner_id)
    .bind(&basho.yusho_winner_name)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// One banzuke line, keyed by `(basho_id, sumo_db_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanzukeRow {
    pub basho_id: BashoId,
    pub division: Division,
    pub side: Side,
    /// Source record id of the entry.
    pub sumo_db_id: i32,
    /// Local wrestler, when one could be linked.
    pub rikishi_id: Option<i32>,
    pub shikona_en: String,
    pub shikona_jp: Option<String>,
    pub rank: String,
    pub rank_value: Option<i32>,
    pub heya: Option<String>,
}

impl BanzukeRow {
    pub fn new(basho_id: BashoId, division: Division, side: Side, record: &BanzukeRecord) -> Self {
        Self {
            basho_id,
            division,
            side,
            sumo_db_id: record.rikishi_id,
            rikishi_id: None,
            shikona_en: record.shikona_en.clone(),
            shikona_jp: non_empty(&record.shikona_jp).map(str::to_string),
            rank: record.rank.clone(),
            rank_value: record.rank_value,
            heya: non_empty(&record.heya).map(str::to_string),
        }
    }
}

/// Insert or overwrite a banzuke entry. Returns `true` when the row was new.
pub async fn upsert_banzuke_entry(pool: &PgPool, entry: &BanzukeRow) -> Result<bool> {
    let inserted = sqlx::query_scalar(
        r#"
        INSERT INTO banzuke (
            basho_id, sumo_db_id, rikishi_id, shikona_en, shikona_jp,
            rank, rank_value, division, heya, side
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (basho_id, sumo_db_id) DO UPDATE SET
            rikishi_id = EXCLUDED.rikishi_id,
            shikona_en = EXCLUDED.shikona_en,
            shikona_jp = EXCLUDED.shikona_jp,
            rank = EXCLUDED.rank,
            rank_value = EXCLUDED.rank_value,
            division = EXCLUDED.division,
            heya = EXCLUDED.heya,
            side = EXCLUDED.side
        RETURNING (xmax = 0)
        "#,
    )
    .bind(entry.basho_id.as_str())
    .bind(entry.sumo_db_id)
    .bind(entry.rikishi_id)
    .bind(&entry.shikona_en)
    .bind(&entry.shikona_jp)
    .bind(&entry.rank)
    .bind(entry.rank_value)
    .bind(entry.division.as_str())
    .bind(&entry.heya)
    .bind(entry.side.as_str())
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// Counters reported by every import job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportStats {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errored: usize,
    /// History rows written, per kind
    pub ranks: usize,
    pub measurements: usize,
    pub shikona: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ImportStats {
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.imported + self.updated + self.skipped + self.errored
    }

    /// Count an upsert by whether it created the row.
    pub fn record_upsert(&mut self, inserted: bool) {
        if inserted {
            self.imported += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn record_outcome(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted(_) => self.imported += 1,
            WriteOutcome::Updated(_) => self.updated += 1,
        }
    }

    pub fn add_history(&mut self, counts: HistoryCounts) {
        self.ranks += counts.ranks.unwrap_or(0);
        self.measurements += counts.measurements.unwrap_or(0);
        self.shikona += counts.shikona.unwrap_or(0);
    }

    /// Log a progress line every [`PROGRESS_INTERVAL`] processed records.
    pub fn log_progress(&self, job: &str) {
        let processed = self.processed();
        if processed > 0 && processed % PROGRESS_INTERVAL == 0 {
            info!(
                job,
                processed,
                imported = self.imported,
                updated = self.updated,
                skipped = self.skipped,
                errored = self.errored,
                "Import progress"
            );
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn duration_secs(&self) -> Option<f64> {
        let (start, end) = (self.started_at?, self.completed_at?);
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }

    pub fn log_summary(&self, job: &str) {
        info!(
            job,
            imported = self.imported,
            updated = self.updated,
            skipped = self.skipped,
            errored = self.errored,
            ranks = self.ranks,
            measurements = self.measurements,
            shikona = self.shikona,
            duration_secs = self.duration_secs().unwrap_or_default(),
            "Import finished"
        );
    }
}
