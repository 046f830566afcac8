//! Shared dump sink.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Inner = Arc<Mutex<Box<dyn Write + Send>>>;

/// Append-only byte sink shared by all dump workers.
///
/// Each `write` appends one record's bytes under the lock, so records from
/// different workers never interleave. The underlying writer is blocking
/// (a file, a pipe); it is only ever driven from tokio's blocking pool.
pub struct RecordByteWriter {
    inner: Inner,
    records: AtomicUsize,
    bytes: AtomicUsize,
}

impl RecordByteWriter {
    pub fn new(inner: Box<dyn Write + Send>) -> Self {
        RecordByteWriter {
            inner: Arc::new(Mutex::new(inner)),
            records: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
        }
    }

    /// Appends one record. Returns once the bytes reached the writer.
    pub async fn write(&self, record: &[u8]) -> io::Result<()> {
        let len = record.len();
        let record = record.to_vec();
        run_blocking(&self.inner, move |writer| writer.write_all(&record)).await?;
        self.records.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len, Ordering::Relaxed);
        Ok(())
    }

    pub async fn flush(&self) -> io::Result<()> {
        run_blocking(&self.inner, |writer| writer.flush()).await
    }

    /// Records appended so far.
    pub fn records(&self) -> usize {
        self.records.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> usize {
        self.bytes.load(Ordering::Relaxed)
    }
}

async fn run_blocking<F>(inner: &Inner, op: F) -> io::Result<()>
where
    F: FnOnce(&mut Box<dyn Write + Send>) -> io::Result<()> + Send + 'static,
{
    let inner = Arc::clone(inner);
    tokio::task::spawn_blocking(move || op(&mut lock(&inner)))
        .await
        .map_err(|e| io::Error::other(format!("sink task failed: {e}")))?
}

fn lock(inner: &Inner) -> MutexGuard<'_, Box<dyn Write + Send>> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
