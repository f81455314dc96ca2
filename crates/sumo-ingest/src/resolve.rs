//! Identity resolution for incoming rikishi records
//!
//! Two exact-match tiers:
//!
//! 1. External identifiers (`sumo_db_id`, then the API's own id). A hit is
//!    authoritative.
//! 2. `(shikona_en, debut)`, where a local row with no debut matches any
//!    debut. Rows already carrying a different external id are never
//!    matched here. Two wrestlers sharing name and debut period can still
//!    collide; that is accepted.
//!
//! Anything else is [`Resolution::NoMatch`] and the writer creates a row.

use crate::error::Result;
use crate::source::models::RikishiRecord;
use async_trait::async_trait;
use sqlx::PgConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    MatchedById(i32),
    MatchedByName(i32),
    NoMatch,
}

impl Resolution {
    pub fn local_id(&self) -> Option<i32> {
        match self {
            Resolution::MatchedById(id) | Resolution::MatchedByName(id) => Some(*id),
            Resolution::NoMatch => None,
        }
    }
}

/// The identifying fields of an incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityKey<'a> {
    pub sumo_db_id: Option<i32>,
    pub sumo_api_id: Option<i32>,
    pub shikona_en: &'a str,
    pub debut: Option<&'a str>,
}

impl<'a> From<&'a RikishiRecord> for IdentityKey<'a> {
    fn from(record: &'a RikishiRecord) -> Self {
        Self {
            sumo_db_id: record.sumo_db_id(),
            sumo_api_id: Some(record.id).filter(|id| *id > 0),
            shikona_en: record.shikona_en.trim(),
            debut: record.debut(),
        }
    }
}

/// Lookups the resolver needs from the store.
#[async_trait]
pub trait RikishiLookup: Send {
    async fn find_by_sumo_db_id(&mut self, sumo_db_id: i32) -> Result<Option<i32>>;

    async fn find_by_sumo_api_id(&mut self, sumo_api_id: i32) -> Result<Option<i32>>;

    /// Lowest local id with this name whose debut equals `debut` or is
    /// unknown, excluding rows that carry a different external id.
    async fn find_by_name_and_debut(&mut self, key: &IdentityKey<'_>) -> Result<Option<i32>>;
}

pub async fn resolve<L>(lookup: &mut L, key: &IdentityKey<'_>) -> Result<Resolution>
where
    L: RikishiLookup + ?Sized,
{
    if let Some(sumo_db_id) = key.sumo_db_id {
        if let Some(id) = lookup.find_by_sumo_db_id(sumo_db_id).await? {
            return Ok(Resolution::MatchedById(id));
        }
    }
    if let Some(sumo_api_id) = key.sumo_api_id {
        if let Some(id) = lookup.find_by_sumo_api_id(sumo_api_id).await? {
            return Ok(Resolution::MatchedById(id));
        }
    }

    if key.shikona_en.is_empty() {
        return Ok(Resolution::NoMatch);
    }

    Ok(match lookup.find_by_name_and_debut(key).await? {
        Some(id) => Resolution::MatchedByName(id),
        None => Resolution::NoMatch,
    })
}

/// [`RikishiLookup`] over an open connection or transaction.
pub struct PgRikishiLookup<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgRikishiLookup<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RikishiLookup for PgRikishiLookup<'_> {
    async fn find_by_sumo_db_id(&mut self, sumo_db_id: i32) -> Result<Option<i32>> {
        let id = sqlx::query_scalar(
            "SELECT id FROM rikishis WHERE sumo_db_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(sumo_db_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn find_by_sumo_api_id(&mut self, sumo_api_id: i32) -> Result<Option<i32>> {
        let id = sqlx::query_scalar("SELECT id FROM rikishis WHERE sumo_api_id = $1")
            .bind(sumo_api_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(id)
    }

    async fn find_by_name_and_debut(&mut self, key: &IdentityKey<'_>) -> Result<Option<i32>> {
        let id = sqlx::query_scalar(
            r#"
            SELECT id FROM rikishis
            WHERE shikona_en = $1
              AND (debut = $2 OR debut IS NULL)
              AND (sumo_db_id IS NULL OR $3::INTEGER IS NULL OR sumo_db_id = $3)
              AND (sumo_api_id IS NULL OR $4::INTEGER IS NULL OR sumo_api_id = $4)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(key.shikona_en)
        .bind(key.debut)
        .bind(key.sumo_db_id)
        .bind(key.sumo_api_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(id)
    }
}
