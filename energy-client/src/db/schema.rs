use anyhow::Result;
use sqlx::PgPool;

const SCHEMA: [(&str, &str); 2] = [
    ("01_readings.sql", include_str!("../../../sql/schema/01_readings.sql")),
    ("02_locations.sql", include_str!("../../../sql/schema/02_locations.sql")),
];

/// Apply the bundled `CREATE TABLE IF NOT EXISTS` scripts in order.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    for (name, sql) in SCHEMA {
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("failed to apply {name}: {e}"))?;
    }
    Ok(())
}
