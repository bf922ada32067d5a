//! Query tests against a live Postgres.
//!
//! Each test creates its own schema and drops it afterwards. Without
//! `DATABASE_URL` the tests return early.

use std::sync::atomic::{AtomicU32, Ordering};

use energy_client::db::{location_queries, reading_queries, schema};
use energy_client::domain::NewReading;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use time::{macros::datetime, OffsetDateTime};

static NEXT_SCHEMA: AtomicU32 = AtomicU32::new(0);

struct Scratch {
    admin: PgPool,
    pool: PgPool,
    schema: String,
}

impl Scratch {
    async fn open() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres query test");
            return None;
        };
        let base: PgConnectOptions = url.parse().unwrap();
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(base.clone())
            .await
            .unwrap();

        let schema = format!(
            "energy_client_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::Relaxed)
        );
        sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(base.options([("search_path", schema.as_str())]))
            .await
            .unwrap();
        schema::apply_schema(&pool).await.unwrap();

        Some(Self { admin, pool, schema })
    }

    async fn close(self) {
        self.pool.close().await;
        sqlx::raw_sql(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
    }
}

fn reading(device_id: &str, ts: OffsetDateTime, energy: f64) -> NewReading {
    NewReading {
        device_id: device_id.to_string(),
        device_name: format!("{device_id}-name"),
        ts,
        voltage_v: None,
        current_a: None,
        active_power_w: None,
        energy_kwh: Some(energy),
    }
}

#[tokio::test]
async fn latest_queries_order_by_ts_then_id() {
    let Some(db) = Scratch::open().await else { return };

    let tie = datetime!(2026-10-16 12:00 UTC);
    reading_queries::insert_readings(
        &db.pool,
        &[
            reading("a", datetime!(2026-10-16 10:00 UTC), 1.0),
            reading("a", tie, 2.0),
            reading("a", tie, 3.0),
            reading("a", datetime!(2026-10-16 11:00 UTC), 4.0),
            reading("b", datetime!(2026-10-16 09:00 UTC), 5.0),
        ],
    )
    .await
    .unwrap();

    let latest = reading_queries::latest_reading(&db.pool, Some("a")).await.unwrap().unwrap();
    assert_eq!(latest.energy_kwh, Some(3.0));

    let overall = reading_queries::latest_reading(&db.pool, None).await.unwrap().unwrap();
    assert_eq!(overall.id, latest.id);

    assert!(reading_queries::latest_reading(&db.pool, Some("missing")).await.unwrap().is_none());

    let recent = reading_queries::recent_readings(&db.pool, Some("a"), 3).await.unwrap();
    let energies: Vec<_> = recent.iter().map(|r| r.energy_kwh).collect();
    assert_eq!(energies, vec![Some(3.0), Some(2.0), Some(4.0)]);

    db.close().await;
}

#[tokio::test]
async fn latest_per_device_ranks_within_each_device() {
    let Some(db) = Scratch::open().await else { return };

    for r in [
        reading("b", datetime!(2026-10-16 10:00 UTC), 1.0),
        reading("a", datetime!(2026-10-16 08:00 UTC), 2.0),
        reading("b", datetime!(2026-10-16 11:00 UTC), 3.0),
        reading("a", datetime!(2026-10-16 07:00 UTC), 4.0),
    ] {
        reading_queries::insert_reading(&db.pool, &r).await.unwrap();
    }

    let rows = reading_queries::latest_per_device(&db.pool).await.unwrap();
    let summary: Vec<_> = rows.iter().map(|r| (r.device_id.as_str(), r.energy_kwh)).collect();
    assert_eq!(summary, vec![("a", Some(2.0)), ("b", Some(3.0))]);

    db.close().await;
}

#[tokio::test]
async fn insert_returns_row_with_nulls_for_missing_channels() {
    let Some(db) = Scratch::open().await else { return };

    let mut new = reading("dev-1", datetime!(2026-10-16 10:15 UTC), 1834.2);
    new.voltage_v = Some(231.4);
    let stored = reading_queries::insert_reading(&db.pool, &new).await.unwrap();

    assert_eq!(stored.clone(), new.with_id(stored.id));
    assert_eq!(stored.current_a, None);

    db.close().await;
}

#[tokio::test]
async fn batch_insert_larger_than_one_statement() {
    let Some(db) = Scratch::open().await else { return };

    let ts = datetime!(2026-10-16 00:00 UTC);
    let batch: Vec<_> = (0..reading_queries::MAX_ROWS_PER_INSERT + 10)
        .map(|i| reading("bulk", ts, i as f64))
        .collect();

    let inserted = reading_queries::insert_readings(&db.pool, &batch).await.unwrap();
    assert_eq!(inserted, batch.len() as u64);

    db.close().await;
}

#[tokio::test]
async fn locations_are_listed_by_id() {
    let Some(db) = Scratch::open().await else { return };

    sqlx::raw_sql(
        "INSERT INTO blocks (id, name) VALUES (2, 'B'), (1, 'A');
         INSERT INTO units (id, block_id, name) VALUES (12, 1, 'A-2'), (11, 2, 'B-1'), (10, 1, 'A-1');",
    )
    .execute(&db.pool)
    .await
    .unwrap();

    let blocks = location_queries::list_blocks(&db.pool).await.unwrap();
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);

    let in_a = location_queries::list_units(&db.pool, Some(1)).await.unwrap();
    assert_eq!(in_a.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(), vec!["A-1", "A-2"]);

    db.close().await;
}
