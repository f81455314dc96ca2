//! Fixtures shared by the database tests
//!
//! ```rust,ignore
//! #[sqlx::test]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let id = TestRikishi::new("Abi").with_debut("201305").insert(&pool).await?;
//!     Ok(())
//! }
//! ```

#![allow(dead_code)]

use serde_json::{json, Value};
use sqlx::PgPool;
use sumo_ingest::config::SourceConfig;
use sumo_ingest::source::{RikishiRecord, SumoApiClient};
use wiremock::MockServer;

/// Unthrottled client pointed at a mock server.
pub fn client_for(server: &MockServer) -> SumoApiClient {
    let config = SourceConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        retry_backoff_ms: 0,
        ..SourceConfig::default()
    };
    SumoApiClient::new(&config).expect("client builds")
}

/// API payload for a wrestler with two rank entries and one of each other
/// history kind.
pub fn rikishi_json(id: i32, sumodb_id: i32, shikona: &str) -> Value {
    json!({
        "id": id,
        "sumodbId": sumodb_id,
        "nskId": 0,
        "shikonaEn": shikona,
        "shikonaJp": "例",
        "currentRank": "Maegashira 4 East",
        "heya": "Isegahama",
        "birthDate": "1996-04-01T00:00:00Z",
        "shusshin": "Tokyo",
        "height": 185,
        "weight": 160,
        "debut": "201501",
        "rankHistory": [
            { "bashoId": "202301", "rank": "Maegashira 5 West", "rankValue": 510 },
            { "bashoId": "202303", "rank": "Maegashira 4 East", "rankValue": 409 }
        ],
        "measurementHistory": [
            { "bashoId": "202303", "height": 185, "weight": 160 }
        ],
        "shikonaHistory": [
            { "bashoId": "202301", "shikonaEn": shikona },
            { "bashoId": "202303", "shikonaEn": shikona }
        ]
    })
}

pub fn rikishi_record(id: i32, sumodb_id: i32, shikona: &str) -> RikishiRecord {
    serde_json::from_value(rikishi_json(id, sumodb_id, shikona)).expect("valid fixture")
}

pub async fn count(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(pool)
        .await
        .expect("count query")
}

/// Builder for wrestler rows inserted directly into the store
#[derive(Debug, Clone)]
pub struct TestRikishi {
    pub shikona_en: String,
    pub sumo_api_id: Option<i32>,
    pub sumo_db_id: Option<i32>,
    pub debut: Option<String>,
}

impl TestRikishi {
    pub fn new(shikona_en: &str) -> Self {
        Self {
            shikona_en: shikona_en.to_string(),
            sumo_api_id: None,
            sumo_db_id: None,
            debut: None,
        }
    }

    pub fn with_sumo_api_id(mut self, id: i32) -> Self {
        self.sumo_api_id = Some(id);
        self
    }

    pub fn with_sumo_db_id(mut self, id: i32) -> Self {
        self.sumo_db_id = Some(id);
        self
    }

    pub fn with_debut(mut self, debut: &str) -> Self {
        self.debut = Some(debut.to_string());
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<i32> {
        sqlx::query_scalar(
            "INSERT INTO rikishis (shikona_en, sumo_api_id, sumo_db_id, debut) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&self.shikona_en)
        .bind(self.sumo_api_id)
        .bind(self.sumo_db_id)
        .bind(&self.debut)
        .fetch_one(pool)
        .await
    }
}
