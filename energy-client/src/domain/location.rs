use serde::{Deserialize, Serialize};

/// A building block grouping several units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Block {
    pub id: i64,
    pub name: String,
}

/// A single metered unit (house) inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Unit {
    pub id: i64,
    pub block_id: i64,
    pub name: String,
}
