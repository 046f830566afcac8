//! Shared test helpers for storage module tests.
//!
//! This module provides an in-memory record store and small builders for
//! seeding records and relations.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use crate::config::{Config, AUTHORITY_AGENCY, MIMETYPE_MARCXCHANGE};
use crate::marc::{DataField, JsonRecordCodec, Leader, MarcRecord, RecordCodec};
use crate::merger::StaticRelationHints;
use crate::models::{Record, RecordId};
use crate::storage::{run_migrations, SqliteRecordStore};

/// Creates a record store over an in-memory database with migrations applied.
pub async fn create_test_store() -> SqliteRecordStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    SqliteRecordStore::from_pool(
        pool,
        Arc::new(JsonRecordCodec),
        Arc::new(StaticRelationHints::from_config(&Config::default())),
        AUTHORITY_AGENCY,
    )
}

/// A record with an `001` identity field and one `245 *a` title.
pub fn marc(bibliographic_record_id: &str, agency_id: i32, title: &str) -> MarcRecord {
    MarcRecord::new(Leader("00000n    2200000   4500".to_string()))
        .with_field(
            DataField::new("001")
                .with_subfield('a', bibliographic_record_id)
                .with_subfield('b', agency_id.to_string()),
        )
        .with_field(DataField::new("245").with_subfield('a', title))
}

/// Stores `content` under `bibliographic_record_id:agency_id`.
pub async fn seed(
    store: &SqliteRecordStore,
    bibliographic_record_id: &str,
    agency_id: i32,
    content: &MarcRecord,
    mime_type: &str,
    deleted: bool,
) -> RecordId {
    let id = RecordId::new(bibliographic_record_id, agency_id);
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let record = Record {
        enrichment_trail: agency_id.to_string(),
        id: id.clone(),
        content: JsonRecordCodec.encode(content).expect("encode"),
        mime_type: mime_type.to_string(),
        deleted,
        created: stamp,
        modified: stamp,
        tracking_id: "test".to_string(),
    };
    store.save_record(&record).await.expect("Failed to save record");
    id
}

/// Stores a live MARC exchange record titled after its identity.
pub async fn seed_live(store: &SqliteRecordStore, bibliographic_record_id: &str, agency_id: i32) -> RecordId {
    let content = marc(
        bibliographic_record_id,
        agency_id,
        &format!("Title of {bibliographic_record_id}"),
    );
    seed(
        store,
        bibliographic_record_id,
        agency_id,
        &content,
        MIMETYPE_MARCXCHANGE,
        false,
    )
    .await
}
