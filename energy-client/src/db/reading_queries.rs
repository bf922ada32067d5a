use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{NewReading, Reading};

const READING_COLUMNS: &str =
    "id, device_id, device_name, ts, voltage_v, current_a, active_power_w, energy_kwh";

/// Bind parameters per row in an insert.
const INSERT_BINDS_PER_ROW: usize = 7;

/// Most rows one insert statement can carry under Postgres' 65535 bind limit.
pub const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / INSERT_BINDS_PER_ROW;

/// Insert a single reading and return it with its assigned id.
pub async fn insert_reading(pool: &PgPool, reading: &NewReading) -> Result<Reading> {
    let row = sqlx::query_as::<_, Reading>(&format!(
        r#"
        INSERT INTO readings (device_id, device_name, ts, voltage_v, current_a, active_power_w, energy_kwh)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {READING_COLUMNS}
        "#
    ))
    .bind(&reading.device_id)
    .bind(&reading.device_name)
    .bind(reading.ts)
    .bind(reading.voltage_v)
    .bind(reading.current_a)
    .bind(reading.active_power_w)
    .bind(reading.energy_kwh)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Insert many readings with multi-row statements of at most
/// [`MAX_ROWS_PER_INSERT`] rows each.
pub async fn insert_readings(pool: &PgPool, batch: &[NewReading]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in batch.chunks(MAX_ROWS_PER_INSERT) {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO readings (device_id, device_name, ts, voltage_v, current_a, active_power_w, energy_kwh) ",
        );
        builder.push_values(chunk, |mut b, r| {
            b.push_bind(&r.device_id)
                .push_bind(&r.device_name)
                .push_bind(r.ts)
                .push_bind(r.voltage_v)
                .push_bind(r.current_a)
                .push_bind(r.active_power_w)
                .push_bind(r.energy_kwh);
        });

        inserted += builder.build().execute(pool).await?.rows_affected();
    }

    Ok(inserted)
}

/// The most recent reading, optionally restricted to one device.
pub async fn latest_reading(pool: &PgPool, device_id: Option<&str>) -> Result<Option<Reading>> {
    let row = sqlx::query_as::<_, Reading>(&format!(
        r#"
        SELECT {READING_COLUMNS}
        FROM readings
        WHERE ($1::TEXT IS NULL OR device_id = $1)
        ORDER BY ts DESC, id DESC
        LIMIT 1
        "#
    ))
    .bind(device_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The most recent reading of every device, ordered by device id.
pub async fn latest_per_device(pool: &PgPool) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(&format!(
        r#"
        SELECT {READING_COLUMNS}
        FROM (
            SELECT
                r.*,
                ROW_NUMBER() OVER (PARTITION BY r.device_id ORDER BY r.ts DESC, r.id DESC) AS rn
            FROM readings r
        ) ranked
        WHERE ranked.rn = 1
        ORDER BY device_id
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The last `limit` readings, newest first.
pub async fn recent_readings(
    pool: &PgPool,
    device_id: Option<&str>,
    limit: i64,
) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(&format!(
        r#"
        SELECT {READING_COLUMNS}
        FROM readings
        WHERE ($1::TEXT IS NULL OR device_id = $1)
        ORDER BY ts DESC, id DESC
        LIMIT $2
        "#
    ))
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_insert_chunk_stays_under_bind_limit() {
        assert!(MAX_ROWS_PER_INSERT * INSERT_BINDS_PER_ROW <= u16::MAX as usize);
        assert!((MAX_ROWS_PER_INSERT + 1) * INSERT_BINDS_PER_ROW > u16::MAX as usize);
    }
}
