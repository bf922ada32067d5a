use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{Block, Unit};

pub async fn list_blocks(pool: &PgPool) -> Result<Vec<Block>> {
    let rows = sqlx::query_as::<_, Block>("SELECT id, name FROM blocks ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Units, optionally only those belonging to `block_id`.
pub async fn list_units(pool: &PgPool, block_id: Option<i64>) -> Result<Vec<Unit>> {
    let rows = sqlx::query_as::<_, Unit>(
        r#"
        SELECT id, block_id, name
        FROM units
        WHERE ($1::BIGINT IS NULL OR block_id = $1)
        ORDER BY id
        "#,
    )
    .bind(block_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
