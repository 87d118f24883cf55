//! # Article Schema Module
//!
//! Creates the single flat `articles` table and its lookup indexes. Every
//! statement is `IF NOT EXISTS`, so opening an existing database is a no-op.
//!
//! The `url` column carries the UNIQUE constraint the store relies on for
//! deduplication, and `created_at` is filled in by the database at insert time.

use crate::store::error::StoreError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            url TEXT UNIQUE NOT NULL,
            source TEXT,
            publish_date TEXT,
            author TEXT,
            sub_category TEXT,
            category TEXT,
            summary TEXT,
            keywords TEXT,
            value_score INTEGER,
            value_reason TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create articles table: {}", e)))?;

    let indexes = [
        ("idx_url", "url"),
        ("idx_publish_date", "publish_date"),
        ("idx_value_score", "value_score"),
        ("idx_category", "category"),
    ];

    for (name, column) in indexes {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS {} ON articles({})", name, column),
            params![],
        )
        .await
        .map_err(|e| StoreError::Schema(format!("Failed to create index {}: {}", name, e)))?;
    }

    Ok(())
}
