// Shared test helpers for repository setup and record seeding.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test file uses a different subset

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use rawrepo_record_service::config::{AUTHORITY_AGENCY, MIMETYPE_MARCXCHANGE};
use rawrepo_record_service::marc::{DataField, Leader};
use rawrepo_record_service::{
    Config, JsonRecordCodec, MarcRecord, MergerPools, Record, RecordCodec, RecordId,
    RecordService, SqliteRecordStore, StaticRelationHints,
};

/// A seeded repository on a temporary database file.
///
/// Keep it alive for the whole test: dropping it removes the database.
pub struct TestRepo {
    _dir: TempDir,
    pub store: SqliteRecordStore,
    pub service: RecordService,
}

/// Creates a repository with merger pools of the given capacities.
pub async fn create_test_repo(default_pool: usize, parent_pool: usize) -> TestRepo {
    create_test_repo_with(default_pool, parent_pool, 8, Duration::from_secs(30)).await
}

/// Like `create_test_repo`, with explicit database connection settings.
pub async fn create_test_repo_with(
    default_pool: usize,
    parent_pool: usize,
    max_connections: u32,
    acquire_timeout: Duration,
) -> TestRepo {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::default();
    let store = SqliteRecordStore::open(
        &dir.path().join("rawrepo.db"),
        max_connections,
        acquire_timeout,
        Arc::new(JsonRecordCodec),
        Arc::new(StaticRelationHints::from_config(&config)),
        AUTHORITY_AGENCY,
    )
    .await
    .expect("Failed to open record store");

    let service = RecordService::new(
        Arc::new(store.clone()),
        Arc::new(JsonRecordCodec),
        MergerPools::new(default_pool, parent_pool),
    );

    TestRepo {
        _dir: dir,
        store,
        service,
    }
}

/// A record with an `001` identity field and a `245 *a` title.
pub fn marc(bibliographic_record_id: &str, agency_id: i32, title: &str) -> MarcRecord {
    MarcRecord::new(Leader("00000n    2200000   4500".to_string()))
        .with_field(
            DataField::new("001")
                .with_subfield('a', bibliographic_record_id)
                .with_subfield('b', agency_id.to_string()),
        )
        .with_field(DataField::new("245").with_subfield('a', title))
}

/// Stores `content` bytes verbatim.
pub async fn seed_bytes(
    store: &SqliteRecordStore,
    bibliographic_record_id: &str,
    agency_id: i32,
    content: Vec<u8>,
    mime_type: &str,
    deleted: bool,
) -> RecordId {
    let id = RecordId::new(bibliographic_record_id, agency_id);
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let record = Record {
        id: id.clone(),
        content,
        mime_type: mime_type.to_string(),
        deleted,
        created: stamp,
        modified: stamp,
        tracking_id: "seed".to_string(),
        enrichment_trail: agency_id.to_string(),
    };
    store.save_record(&record).await.expect("Failed to save record");
    id
}

pub async fn seed(
    store: &SqliteRecordStore,
    content: &MarcRecord,
    bibliographic_record_id: &str,
    agency_id: i32,
    mime_type: &str,
    deleted: bool,
) -> RecordId {
    let bytes = JsonRecordCodec.encode(content).expect("Failed to encode record");
    seed_bytes(store, bibliographic_record_id, agency_id, bytes, mime_type, deleted).await
}

/// Stores a live MARC exchange record titled `Title of <id>`.
pub async fn seed_live(store: &SqliteRecordStore, bibliographic_record_id: &str, agency_id: i32) -> RecordId {
    let content = marc(
        bibliographic_record_id,
        agency_id,
        &format!("Title of {bibliographic_record_id}"),
    );
    seed(store, &content, bibliographic_record_id, agency_id, MIMETYPE_MARCXCHANGE, false).await
}

pub fn title(record: &MarcRecord) -> Option<String> {
    record
        .data_field("245")
        .and_then(|f| f.subfield('a'))
        .map(str::to_string)
}

pub fn decode(record: &Record) -> MarcRecord {
    JsonRecordCodec.decode(&record.content).expect("Failed to decode record")
}

/// A `Write` handle onto a buffer the test can inspect after the dump.
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sleeps on the first write only, then behaves like `SharedBuffer`.
#[derive(Clone, Default)]
pub struct SlowFirstWrite {
    pub buffer: SharedBuffer,
    pub delay: Duration,
    started: Arc<Mutex<bool>>,
}

impl SlowFirstWrite {
    pub fn new(delay: Duration) -> Self {
        SlowFirstWrite {
            delay,
            ..Default::default()
        }
    }
}

impl Write for SlowFirstWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let first = !std::mem::replace(&mut *self.started.lock().unwrap(), true);
        if first {
            std::thread::sleep(self.delay);
        }
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
