//! Manual match log with paired counter updates
//!
//! Inserting or deleting a match and adjusting the wrestler's `wins` or
//! `losses` counter happen in one transaction. Any failure rolls both back.

use crate::error::{IngestError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
}

impl MatchResult {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::Win => "win",
            MatchResult::Loss => "loss",
        }
    }

    fn increment_sql(self) -> &'static str {
        match self {
            MatchResult::Win => "UPDATE rikishis SET wins = wins + 1 WHERE id = $1",
            MatchResult::Loss => "UPDATE rikishis SET losses = losses + 1 WHERE id = $1",
        }
    }

    fn decrement_sql(self) -> &'static str {
        match self {
            MatchResult::Win => "UPDATE rikishis SET wins = wins - 1 WHERE id = $1 AND wins > 0",
            MatchResult::Loss => {
                "UPDATE rikishis SET losses = losses - 1 WHERE id = $1 AND losses > 0"
            },
        }
    }
}

impl std::str::FromStr for MatchResult {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(MatchResult::Win),
            "loss" => Ok(MatchResult::Loss),
            other => Err(IngestError::Validation(format!(
                "match result must be 'win' or 'loss', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub rikishi_id: i32,
    pub rikishi_name: String,
    pub result: MatchResult,
    pub opponent: String,
    pub match_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchRow {
    pub id: i32,
    pub rikishi_id: i32,
    pub rikishi_name: String,
    pub result: String,
    pub opponent: String,
    pub match_date: Option<NaiveDate>,
}

/// Log a match and bump the wrestler's counter. Returns the new match id.
pub async fn record_match(pool: &PgPool, new_match: &NewMatch) -> Result<i32> {
    let mut tx = pool.begin().await?;

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO matches (rikishi_id, rikishi_name, result, opponent, match_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(new_match.rikishi_id)
    .bind(&new_match.rikishi_name)
    .bind(new_match.result.as_str())
    .bind(&new_match.opponent)
    .bind(new_match.match_date)
    .fetch_one(&mut *tx)
    .await?;

    let bumped = sqlx::query(new_match.result.increment_sql())
        .bind(new_match.rikishi_id)
        .execute(&mut *tx)
        .await?;
    if bumped.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(IngestError::not_found("Rikishi", new_match.rikishi_id));
    }

    tx.commit().await?;
    info!(
        match_id = id,
        rikishi_id = new_match.rikishi_id,
        result = %new_match.result,
        "Recorded match"
    );
    Ok(id)
}

/// Remove a match and take back its counter increment, never below zero.
pub async fn delete_match(pool: &PgPool, id: i32) -> Result<MatchRow> {
    let mut tx = pool.begin().await?;

    let row: Option<MatchRow> = sqlx::query_as(
        r#"
        SELECT id, rikishi_id, rikishi_name, result, opponent, match_date
        FROM matches
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        tx.rollback().await?;
        return Err(IngestError::not_found("Match", id));
    };
    let result: MatchResult = row.result.parse()?;

    sqlx::query("DELETE FROM matches WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(result.decrement_sql())
        .bind(row.rikishi_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(match_id = id, rikishi_id = row.rikishi_id, %result, "Deleted match");
    Ok(row)
}
