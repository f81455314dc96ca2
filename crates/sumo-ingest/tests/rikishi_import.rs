//! Wrestler import against a real database

mod common;

use common::{client_for, count, rikishi_json, rikishi_record, TestRikishi};
use sqlx::PgPool;
use sumo_ingest::config::SourceConfig;
use sumo_ingest::pipeline::{RikishiCrawler, RikishiImporter};
use sumo_ingest::{Resolution, WriteOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Snapshot = (
    i32,
    Option<i32>,
    Option<i32>,
    String,
    Option<String>,
    Option<f32>,
    Option<f32>,
    Option<String>,
);

async fn snapshot(pool: &PgPool, id: i32) -> Snapshot {
    sqlx::query_as(
        "SELECT id, sumo_api_id, sumo_db_id, shikona_en, heya, height, weight, debut \
         FROM rikishis WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn ranks(pool: &PgPool, id: i32) -> Vec<(String, String, Option<i32>)> {
    sqlx::query_as(
        "SELECT basho_id, rank, rank_value FROM ranks WHERE rikishi_id = $1 ORDER BY basho_id",
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .unwrap()
}

#[sqlx::test]
async fn test_import_twice_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
    let importer = RikishiImporter::new(pool.clone());
    let record = rikishi_record(42, 4242, "Example");

    let (first_res, first, _) = importer.import_one(&record).await.unwrap();
    assert_eq!(first_res, Resolution::NoMatch);
    let id = match first {
        WriteOutcome::Inserted(id) => id,
        other => panic!("expected insert, got {other:?}"),
    };
    let row_before = snapshot(&pool, id).await;
    let ranks_before = ranks(&pool, id).await;

    let (second_res, second, counts) = importer.import_one(&record).await.unwrap();
    assert_eq!(second_res, Resolution::MatchedById(id));
    assert_eq!(second, WriteOutcome::Updated(id));
    assert_eq!(counts.ranks, Some(2));

    assert_eq!(snapshot(&pool, id).await, row_before);
    assert_eq!(ranks(&pool, id).await, ranks_before);
    assert_eq!(ranks_before.len(), 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM rikishis").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM measurements").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM shikona").await, 1);
    Ok(())
}

#[sqlx::test]
async fn test_history_is_replaced_not_merged(pool: PgPool) -> sqlx::Result<()> {
    let importer = RikishiImporter::new(pool.clone());
    let (_, outcome, _) = importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();

    let mut shorter = rikishi_json(42, 4242, "Example");
    shorter["rankHistory"] = serde_json::json!([
        { "bashoId": "202305", "rank": "Komusubi 1 East", "rankValue": 301 }
    ]);
    let shorter = serde_json::from_value(shorter).unwrap();
    importer.import_one(&shorter).await.unwrap();

    let rows = ranks(&pool, outcome.id()).await;
    assert_eq!(rows, vec![("202305".to_string(), "Komusubi 1 East".to_string(), Some(301))]);
    Ok(())
}

#[sqlx::test]
async fn test_absent_history_keeps_stored_rows(pool: PgPool) -> sqlx::Result<()> {
    let importer = RikishiImporter::new(pool.clone());
    let (_, outcome, _) = importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();

    let mut bare = rikishi_json(42, 4242, "Example");
    bare["rankHistory"] = serde_json::Value::Null;
    bare["measurementHistory"] = serde_json::json!([]);
    let bare = serde_json::from_value(bare).unwrap();
    let (_, _, counts) = importer.import_one(&bare).await.unwrap();

    assert_eq!(counts.ranks, None);
    assert_eq!(counts.measurements, None);
    assert_eq!(ranks(&pool, outcome.id()).await.len(), 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM measurements").await, 1);
    Ok(())
}

#[sqlx::test]
async fn test_name_match_adopts_existing_row(pool: PgPool) -> sqlx::Result<()> {
    let existing = TestRikishi::new("Example").insert(&pool).await?;
    let importer = RikishiImporter::new(pool.clone());

    let (resolution, outcome, _) =
        importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();
    assert_eq!(resolution, Resolution::MatchedByName(existing));
    assert_eq!(outcome, WriteOutcome::Updated(existing));

    let (sumo_api_id, sumo_db_id): (Option<i32>, Option<i32>) =
        sqlx::query_as("SELECT sumo_api_id, sumo_db_id FROM rikishis WHERE id = $1")
            .bind(existing)
            .fetch_one(&pool)
            .await?;
    assert_eq!((sumo_api_id, sumo_db_id), (Some(42), Some(4242)));
    Ok(())
}

#[sqlx::test]
async fn test_name_match_respects_debut_and_conflicting_ids(pool: PgPool) -> sqlx::Result<()> {
    TestRikishi::new("Example").with_debut("200901").insert(&pool).await?;
    TestRikishi::new("Example").with_sumo_db_id(1).insert(&pool).await?;
    let importer = RikishiImporter::new(pool.clone());

    let (resolution, outcome, _) =
        importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();
    assert_eq!(resolution, Resolution::NoMatch);
    assert!(matches!(outcome, WriteOutcome::Inserted(_)));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM rikishis").await, 3);
    Ok(())
}

#[sqlx::test]
async fn test_external_id_beats_name(pool: PgPool) -> sqlx::Result<()> {
    let by_name = TestRikishi::new("Example").insert(&pool).await?;
    let by_id = TestRikishi::new("Renamed").with_sumo_db_id(4242).insert(&pool).await?;
    let importer = RikishiImporter::new(pool.clone());

    let (resolution, _, _) =
        importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();
    assert_eq!(resolution, Resolution::MatchedById(by_id));
    assert_ne!(by_name, by_id);

    let name: String = sqlx::query_scalar("SELECT shikona_en FROM rikishis WHERE id = $1")
        .bind(by_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(name, "Example");
    Ok(())
}

#[sqlx::test]
async fn test_api_id_held_elsewhere_is_not_stolen(pool: PgPool) -> sqlx::Result<()> {
    let by_db_id = TestRikishi::new("Example").with_sumo_db_id(4242).insert(&pool).await?;
    let holder = TestRikishi::new("Other").with_sumo_api_id(42).insert(&pool).await?;
    let importer = RikishiImporter::new(pool.clone());

    let (resolution, outcome, _) =
        importer.import_one(&rikishi_record(42, 4242, "Example")).await.unwrap();
    assert_eq!(resolution, Resolution::MatchedById(by_db_id));
    assert_eq!(outcome, WriteOutcome::Updated(by_db_id));

    let updated = snapshot(&pool, by_db_id).await;
    assert_eq!((updated.1, updated.2), (None, Some(4242)));
    assert_eq!(updated.4.as_deref(), Some("Isegahama"));
    assert_eq!(snapshot(&pool, holder).await.1, Some(42));
    Ok(())
}

#[sqlx::test]
async fn test_crawler_stops_on_misses_and_survives_errors(pool: PgPool) -> sqlx::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rikishis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 5,
            "records": []
        })))
        .mount(&server)
        .await;
    for (id, shikona) in [(1, "Hakuho"), (2, "Kakuryu")] {
        Mock::given(method("GET"))
            .and(path(format!("/api/rikishi/{id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(rikishi_json(id, 100 + id, shikona)),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/rikishi/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    // 4 and 5 fall through to wiremock's default 404.
    Mock::given(method("GET"))
        .and(path("/api/rikishi/6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rikishi_json(6, 106, "Never")))
        .expect(0)
        .mount(&server)
        .await;

    let source = SourceConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        max_consecutive_misses: 2,
        crawl_overscan: 10,
        ..SourceConfig::default()
    };
    let crawler = RikishiCrawler::new(client_for(&server), pool.clone(), &source);
    let stats = crawler.run().await.unwrap();

    assert_eq!(stats.imported, 2);
    assert_eq!(stats.errored, 1);
    assert_eq!(stats.ranks, 4);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM rikishis").await, 2);
    Ok(())
}

#[sqlx::test]
async fn test_crawler_retries_server_error_before_counting_it(pool: PgPool) -> sqlx::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rikishis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 2,
            "records": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rikishi/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rikishi_json(1, 101, "Hakuho")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rikishi/2"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rikishi/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rikishi_json(2, 102, "Kakuryu")))
        .expect(1)
        .mount(&server)
        .await;

    let source = SourceConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        max_consecutive_misses: 2,
        crawl_overscan: 5,
        ..SourceConfig::default()
    };
    let crawler = RikishiCrawler::new(client_for(&server), pool.clone(), &source);
    let stats = crawler.run().await.unwrap();

    assert_eq!(stats.imported, 2);
    assert_eq!(stats.errored, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM rikishis").await, 2);
    Ok(())
}

#[sqlx::test]
async fn test_crawler_fails_without_catalog_size(pool: PgPool) -> sqlx::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rikishis"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = SourceConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        ..SourceConfig::default()
    };
    let crawler = RikishiCrawler::new(client_for(&server), pool, &source);
    assert!(crawler.run().await.is_err());
    Ok(())
}
