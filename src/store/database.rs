//! Database operations for the article store

use crate::store::error::StoreError;
use crate::store::schema;
use crate::store::{ArticleRecord, SaveOutcome, split_keywords};
use libsql::{Connection, Row, Rows, Value, params};
use std::collections::HashSet;
use tracing::{debug, instrument};

const ARTICLE_COLUMNS: &str = "id, title, url, source, publish_date, author, sub_category, \
     category, summary, keywords, value_score, value_reason, created_at";

/// Append-only store for analyzed articles
#[derive(Clone)]
pub struct ArticleStore {
    conn: Connection,
}

impl ArticleStore {
    /// Create a store over an open connection, creating the schema if needed
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Open (or create) a local database file
    pub async fn new_from_path(path: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    /// Execute a custom query with parameters
    pub async fn execute_query<P>(&self, sql: &str, params: P) -> Result<Rows, StoreError>
    where
        P: libsql::params::IntoParams,
    {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute query: {}", e)))
    }

    /// Insert the record unless its URL is already stored
    ///
    /// A duplicate URL is not an error: the outcome reports `inserted = false`
    /// and the existing row is left untouched.
    #[instrument(skip(self, record), fields(url = %record.url))]
    pub async fn save(&self, record: &ArticleRecord) -> Result<SaveOutcome, StoreError> {
        if record.title.is_empty() || record.url.is_empty() {
            return Err(StoreError::Data(
                "Article title and url are required".to_string(),
            ));
        }

        let affected = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO articles (
                    title, url, source, publish_date, author,
                    sub_category, category, summary, keywords,
                    value_score, value_reason
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.title.clone(),
                    record.url.clone(),
                    record.source.clone(),
                    record.publish_date.clone(),
                    record.author.clone(),
                    record.sub_category.clone(),
                    record.category.clone(),
                    record.summary.clone(),
                    record.keywords_text(),
                    record.value_score,
                    record.value_reason.clone(),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save article: {}", e)))?;

        if affected == 0 {
            debug!("Article already stored");
            return Ok(SaveOutcome::duplicate());
        }

        let mut rows = self
            .conn
            .query("SELECT last_insert_rowid()", params![])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to get last insert ID: {}", e)))?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => {
                return Err(StoreError::Data(
                    "No ID returned from last_insert_rowid()".to_string(),
                ));
            }
            Err(e) => return Err(StoreError::Data(format!("Failed to get ID: {}", e))),
        };

        let id: i64 = row
            .get(0)
            .map_err(|e| StoreError::Data(format!("Failed to get ID: {}", e)))?;
        Ok(SaveOutcome::inserted(id))
    }

    /// Most recently stored articles, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<ArticleRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS
        );
        let rows = self.execute_query(&sql, params![limit as i64]).await?;
        collect_articles(rows).await
    }

    /// Highest scored articles, newest first among equal scores
    pub async fn top_valued(&self, limit: usize) -> Result<Vec<ArticleRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles
             ORDER BY value_score DESC, created_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS
        );
        let rows = self.execute_query(&sql, params![limit as i64]).await?;
        collect_articles(rows).await
    }

    /// Every article scoring at least `min_score`, highest first
    pub async fn high_value(&self, min_score: i64) -> Result<Vec<ArticleRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles WHERE value_score >= ?
             ORDER BY value_score DESC, created_at DESC, id DESC",
            ARTICLE_COLUMNS
        );
        let rows = self.execute_query(&sql, params![min_score]).await?;
        collect_articles(rows).await
    }

    /// All URLs currently stored
    pub async fn existing_urls(&self) -> Result<HashSet<String>, StoreError> {
        let mut rows = self
            .execute_query("SELECT url FROM articles", params![])
            .await?;

        let mut urls = HashSet::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Data(format!("Failed to read row: {}", e)))?
        {
            let url: String = row
                .get(0)
                .map_err(|e| StoreError::Data(format!("Failed to get url: {}", e)))?;
            urls.insert(url);
        }
        Ok(urls)
    }

    /// Number of stored articles
    pub async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .execute_query("SELECT COUNT(*) FROM articles", params![])
            .await?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(0),
            Err(e) => return Err(StoreError::Data(format!("Failed to get count: {}", e))),
        };

        let count: i64 = row
            .get(0)
            .map_err(|e| StoreError::Data(format!("Failed to get count: {}", e)))?;
        Ok(count as u64)
    }
}

async fn collect_articles(mut rows: Rows) -> Result<Vec<ArticleRecord>, StoreError> {
    let mut articles = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| StoreError::Data(format!("Failed to read row: {}", e)))?
    {
        articles.push(row_to_article(&row)?);
    }
    Ok(articles)
}

/// Convert a database row to an ArticleRecord
fn row_to_article(row: &Row) -> Result<ArticleRecord, StoreError> {
    Ok(ArticleRecord {
        id: Some(
            row.get(0)
                .map_err(|e| StoreError::Data(format!("Failed to get id: {}", e)))?,
        ),
        title: text_at(row, 1, "title")?,
        url: text_at(row, 2, "url")?,
        source: text_at(row, 3, "source")?,
        publish_date: text_at(row, 4, "publish_date")?,
        author: text_at(row, 5, "author")?,
        sub_category: text_at(row, 6, "sub_category")?,
        category: text_at(row, 7, "category")?,
        summary: text_at(row, 8, "summary")?,
        keywords: split_keywords(&text_at(row, 9, "keywords")?),
        value_score: match value_at(row, 10, "value_score")? {
            Value::Integer(score) => score,
            Value::Real(score) => score as i64,
            Value::Null => 0,
            other => {
                return Err(StoreError::Data(format!(
                    "Unexpected value_score value: {:?}",
                    other
                )));
            }
        },
        value_reason: text_at(row, 11, "value_reason")?,
        created_at: match value_at(row, 12, "created_at")? {
            Value::Null => None,
            Value::Text(ts) => Some(ts),
            other => Some(format!("{:?}", other)),
        },
    })
}

fn value_at(row: &Row, idx: i32, column: &str) -> Result<Value, StoreError> {
    row.get_value(idx)
        .map_err(|e| StoreError::Data(format!("Failed to get {}: {}", column, e)))
}

/// Nullable text column, with NULL read as an empty string
fn text_at(row: &Row, idx: i32, column: &str) -> Result<String, StoreError> {
    match value_at(row, idx, column)? {
        Value::Text(text) => Ok(text),
        Value::Null => Ok(String::new()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Real(n) => Ok(n.to_string()),
        Value::Blob(_) => Err(StoreError::Data(format!(
            "Unexpected blob in column {}",
            column
        ))),
    }
}
