//! SQLite record store.
//!
//! Every unit of work is one sqlx transaction. Dropping an uncommitted
//! `SqliteDao` rolls the transaction back.

mod dao;
mod expand;
mod merge;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error_handling::StoreError;
use crate::marc::{MarcRecord, RecordCodec};
use crate::merger::RelationHints;
use crate::models::{Record, RecordId};

use super::pool::init_db_pool_with_path;
use super::{RawRecordStore, RecordDao};

type RecordRow = (String, i32, bool, String, Vec<u8>, i64, i64, String);

/// Record store backed by a SQLite database.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    codec: Arc<dyn RecordCodec>,
    hints: Arc<dyn RelationHints>,
    authority_agency: i32,
}

impl SqliteRecordStore {
    /// Opens (creating if needed) the database at `db_path` and applies migrations.
    pub async fn open(
        db_path: &Path,
        max_connections: u32,
        acquire_timeout: Duration,
        codec: Arc<dyn RecordCodec>,
        hints: Arc<dyn RelationHints>,
        authority_agency: i32,
    ) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(db_path, max_connections, acquire_timeout).await?;
        super::run_migrations(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migrations failed: {e}")))?;
        info!("Record store ready at {}", db_path.display());
        Ok(Self::from_pool(pool, codec, hints, authority_agency))
    }

    /// Wraps an existing pool. Does not run migrations.
    pub fn from_pool(
        pool: SqlitePool,
        codec: Arc<dyn RecordCodec>,
        hints: Arc<dyn RelationHints>,
        authority_agency: i32,
    ) -> Self {
        SqliteRecordStore {
            pool,
            codec,
            hints,
            authority_agency,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts or replaces a record slot.
    pub async fn save_record(&self, record: &Record) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO records (bibliographic_record_id, agency_id, deleted, mimetype, content,
                                  created_ms, modified_ms, tracking_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(bibliographic_record_id, agency_id) DO UPDATE SET
                 deleted=excluded.deleted,
                 mimetype=excluded.mimetype,
                 content=excluded.content,
                 modified_ms=excluded.modified_ms,
                 tracking_id=excluded.tracking_id",
        )
        .bind(&record.id.bibliographic_record_id)
        .bind(record.id.agency_id)
        .bind(record.deleted)
        .bind(&record.mime_type)
        .bind(&record.content)
        .bind(record.created.timestamp_millis())
        .bind(record.modified.timestamp_millis())
        .bind(&record.tracking_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Adds the relation `from` → `to`. Existing relations are left alone.
    pub async fn add_relation(&self, from: &RecordId, to: &RecordId) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO relations (bibliographic_record_id, agency_id,
                                              refer_bibliographic_record_id, refer_agency_id)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&from.bibliographic_record_id)
        .bind(from.agency_id)
        .bind(&to.bibliographic_record_id)
        .bind(to.agency_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RawRecordStore for SqliteRecordStore {
    async fn begin(&self) -> Result<Box<dyn RecordDao>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteDao {
            tx,
            codec: Arc::clone(&self.codec),
            hints: Arc::clone(&self.hints),
            authority_agency: self.authority_agency,
        }))
    }
}

/// One unit of work against `SqliteRecordStore`.
pub(crate) struct SqliteDao {
    tx: Transaction<'static, Sqlite>,
    codec: Arc<dyn RecordCodec>,
    hints: Arc<dyn RelationHints>,
    authority_agency: i32,
}

impl SqliteDao {
    async fn exists(&mut self, id: &RecordId, include_deleted: bool) -> Result<bool, StoreError> {
        let deleted: Option<bool> = sqlx::query_scalar(
            "SELECT deleted FROM records WHERE bibliographic_record_id = ? AND agency_id = ?",
        )
        .bind(&id.bibliographic_record_id)
        .bind(id.agency_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(match deleted {
            Some(deleted) => include_deleted || !deleted,
            None => false,
        })
    }

    async fn fetch(&mut self, id: &RecordId) -> Result<Record, StoreError> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT bibliographic_record_id, agency_id, deleted, mimetype, content,
                    created_ms, modified_ms, tracking_id
             FROM records WHERE bibliographic_record_id = ? AND agency_id = ?",
        )
        .bind(&id.bibliographic_record_id)
        .bind(id.agency_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(match row {
            Some(row) => record_from_row(row),
            None => Record::empty(id.clone()),
        })
    }

    /// Relations leaving `id`; `same_bibliographic_id` picks siblings (true) or parents (false).
    async fn outgoing(
        &mut self,
        id: &RecordId,
        same_bibliographic_id: Option<bool>,
    ) -> Result<HashSet<RecordId>, StoreError> {
        let filter = match same_bibliographic_id {
            Some(true) => " AND refer_bibliographic_record_id = bibliographic_record_id",
            Some(false) => " AND refer_bibliographic_record_id <> bibliographic_record_id",
            None => "",
        };
        let rows: Vec<(String, i32)> = sqlx::query_as(&format!(
            "SELECT refer_bibliographic_record_id, refer_agency_id FROM relations
             WHERE bibliographic_record_id = ? AND agency_id = ?{filter}"
        ))
        .bind(&id.bibliographic_record_id)
        .bind(id.agency_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(bib, agency)| RecordId::new(bib, agency))
            .collect())
    }

    /// Relations pointing at `id`; `same_bibliographic_id` picks siblings (true) or children (false).
    async fn incoming(
        &mut self,
        id: &RecordId,
        same_bibliographic_id: bool,
    ) -> Result<HashSet<RecordId>, StoreError> {
        let filter = if same_bibliographic_id {
            " AND bibliographic_record_id = refer_bibliographic_record_id"
        } else {
            " AND bibliographic_record_id <> refer_bibliographic_record_id"
        };
        let rows: Vec<(String, i32)> = sqlx::query_as(&format!(
            "SELECT bibliographic_record_id, agency_id FROM relations
             WHERE refer_bibliographic_record_id = ? AND refer_agency_id = ?{filter}"
        ))
        .bind(&id.bibliographic_record_id)
        .bind(id.agency_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(bib, agency)| RecordId::new(bib, agency))
            .collect())
    }

    async fn agencies_for(&mut self, bibliographic_record_id: &str) -> Result<HashSet<i32>, StoreError> {
        let agencies: Vec<i32> = sqlx::query_scalar(
            "SELECT agency_id FROM records WHERE bibliographic_record_id = ? AND deleted = 0",
        )
        .bind(bibliographic_record_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(agencies.into_iter().collect())
    }

    fn decode(&self, record: &Record) -> Result<MarcRecord, StoreError> {
        self.codec
            .decode(&record.content)
            .map_err(|source| StoreError::Content {
                id: record.id.clone(),
                source,
            })
    }

    fn encode(&self, id: &RecordId, record: &MarcRecord) -> Result<Vec<u8>, StoreError> {
        self.codec.encode(record).map_err(|source| StoreError::Content {
            id: id.clone(),
            source,
        })
    }
}

fn record_from_row(row: RecordRow) -> Record {
    let (bib, agency, deleted, mime_type, content, created_ms, modified_ms, tracking_id) = row;
    Record {
        enrichment_trail: agency.to_string(),
        id: RecordId::new(bib, agency),
        content,
        mime_type,
        deleted,
        created: DateTime::<Utc>::from_timestamp_millis(created_ms).unwrap_or_default(),
        modified: DateTime::<Utc>::from_timestamp_millis(modified_ms).unwrap_or_default(),
        tracking_id,
    }
}
