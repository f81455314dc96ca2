//! Snapshot replace of per-wrestler history rows
//!
//! Each kind (ranks, measurements, names) is replaced wholesale: delete
//! every row of that kind for the wrestler, then insert the incoming list.
//! No incremental diffing and no tombstones. Callers run this inside the
//! same transaction as the wrestler row write.
//!
//! A list the source did not send (absent or empty) leaves the stored rows
//! of that kind untouched.

use crate::error::Result;
use crate::source::models::{MeasurementRecord, RankHistoryRecord, RikishiRecord, ShikonaRecord};
use serde::Serialize;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::BTreeMap;

/// Rows per multi-row INSERT.
pub const DEFAULT_HISTORY_CHUNK_SIZE: usize = 500;

/// Rows written per kind; `None` means the kind was left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryCounts {
    pub ranks: Option<usize>,
    pub measurements: Option<usize>,
    pub shikona: Option<usize>,
}

/// A name held over a run of tournaments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePeriod {
    pub shikona_en: String,
    pub shikona_jp: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub is_current: bool,
}

/// Keep one entry per tournament, the last one seen, ordered by tournament.
pub fn dedupe_by_basho<T: Clone>(entries: &[T], basho_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut latest: BTreeMap<&str, &T> = BTreeMap::new();
    for entry in entries {
        latest.insert(basho_of(entry), entry);
    }
    latest.into_values().cloned().collect()
}

/// Collapse name history into periods.
///
/// Per-tournament rows (all carrying `bashoId`) are grouped into runs of the
/// same name; the final run is current. Rows that already describe periods
/// are taken as given.
pub fn name_periods(entries: &[ShikonaRecord]) -> Vec<NamePeriod> {
    if entries.is_empty() {
        return Vec::new();
    }

    let per_basho = entries
        .iter()
        .all(|e| e.basho_id.is_some() && e.date_start.is_none());
    if !per_basho {
        return entries
            .iter()
            .map(|e| NamePeriod {
                shikona_en: e.shikona_en.clone(),
                shikona_jp: e.shikona_jp.clone(),
                date_start: e.date_start.clone().or_else(|| e.basho_id.clone()),
                date_end: e.date_end.clone(),
                is_current: e.current.unwrap_or(false),
            })
            .collect();
    }

    let ordered = dedupe_by_basho(entries, |e| e.basho_id.as_deref().unwrap_or_default());
    let mut periods: Vec<NamePeriod> = Vec::new();
    for entry in ordered {
        let basho = entry.basho_id.clone();
        match periods.last_mut() {
            Some(last)
                if last.shikona_en == entry.shikona_en && last.shikona_jp == entry.shikona_jp =>
            {
                last.date_end = basho;
            },
            _ => periods.push(NamePeriod {
                shikona_en: entry.shikona_en,
                shikona_jp: entry.shikona_jp,
                date_start: basho.clone(),
                date_end: basho,
                is_current: false,
            }),
        }
    }
    if let Some(last) = periods.last_mut() {
        last.is_current = true;
        last.date_end = None;
    }
    periods
}

/// Replace every history kind the record carries.
pub async fn replace_history(
    conn: &mut PgConnection,
    rikishi_id: i32,
    record: &RikishiRecord,
) -> Result<HistoryCounts> {
    let mut counts = HistoryCounts::default();

    if let Some(ranks) = record.rank_history.as_deref().filter(|r| !r.is_empty()) {
        counts.ranks = Some(replace_ranks(conn, rikishi_id, ranks).await?);
    }
    if let Some(measurements) = record
        .measurement_history
        .as_deref()
        .filter(|m| !m.is_empty())
    {
        counts.measurements = Some(replace_measurements(conn, rikishi_id, measurements).await?);
    }
    if let Some(names) = record.shikona_history.as_deref().filter(|s| !s.is_empty()) {
        counts.shikona = Some(replace_shikona(conn, rikishi_id, names).await?);
    }

    Ok(counts)
}

pub async fn replace_ranks(
    conn: &mut PgConnection,
    rikishi_id: i32,
    entries: &[RankHistoryRecord],
) -> Result<usize> {
    let rows = dedupe_by_basho(entries, |e| e.basho_id.as_str());

    sqlx::query("DELETE FROM ranks WHERE rikishi_id = $1")
        .bind(rikishi_id)
        .execute(&mut *conn)
        .await?;

    for chunk in rows.chunks(DEFAULT_HISTORY_CHUNK_SIZE) {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO ranks (rikishi_id, basho_id, rank, rank_value) ");
        query_builder.push_values(chunk, |mut b, entry| {
            b.push_bind(rikishi_id)
                .push_bind(&entry.basho_id)
                .push_bind(&entry.rank)
                .push_bind(entry.rank_value);
        });
        query_builder.build().execute(&mut *conn).await?;
    }

    Ok(rows.len())
}

pub async fn replace_measurements(
    conn: &mut PgConnection,
    rikishi_id: i32,
    entries: &[MeasurementRecord],
) -> Result<usize> {
    let rows = dedupe_by_basho(entries, |e| e.basho_id.as_str());

    sqlx::query("DELETE FROM measurements WHERE rikishi_id = $1")
        .bind(rikishi_id)
        .execute(&mut *conn)
        .await?;

    for chunk in rows.chunks(DEFAULT_HISTORY_CHUNK_SIZE) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO measurements (rikishi_id, basho_id, height, weight) ",
        );
        query_builder.push_values(chunk, |mut b, entry| {
            b.push_bind(rikishi_id)
                .push_bind(&entry.basho_id)
                .push_bind(entry.height)
                .push_bind(entry.weight);
        });
        query_builder.build().execute(&mut *conn).await?;
    }

    Ok(rows.len())
}

pub async fn replace_shikona(
    conn: &mut PgConnection,
    rikishi_id: i32,
    entries: &[ShikonaRecord],
) -> Result<usize> {
    let periods = name_periods(entries);

    sqlx::query("DELETE FROM shikona WHERE rikishi_id = $1")
        .bind(rikishi_id)
        .execute(&mut *conn)
        .await?;

    for chunk in periods.chunks(DEFAULT_HISTORY_CHUNK_SIZE) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO shikona (rikishi_id, shikona_en, shikona_jp, date_start, date_end, is_current) ",
        );
        query_builder.push_values(chunk, |mut b, period| {
            b.push_bind(rikishi_id)
                .push_bind(&period.shikona_en)
                .push_bind(&period.shikona_jp)
                .push_bind(&period.date_start)
                .push_bind(&period.date_end)
                .push_bind(period.is_current);
        });
        query_builder.build().execute(&mut *conn).await?;
    }

    Ok(periods.len())
}
