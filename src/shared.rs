use crate::error::{InsertionLogError, Result};
use crate::insertion_log::InsertionLog;
use crate::store::Message;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// A cloneable handle for logging from several threads or tasks into one [InsertionLog].
///
/// Each operation holds the lock for its whole mutate-then-redraw sequence. A panic while the lock
/// is held leaves the screen in an unknown state, so every later call fails with
/// [InsertionLogError::Poisoned].
pub struct SharedInsertionLog<W: Write> {
    inner: Arc<Mutex<InsertionLog<W>>>,
}

impl<W: Write> Clone for SharedInsertionLog<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SharedInsertionLog<W> {
    pub fn new(output: W) -> Self {
        Self::from(InsertionLog::new(output))
    }

    fn lock(&self) -> Result<MutexGuard<'_, InsertionLog<W>>> {
        self.inner.lock().map_err(|_| InsertionLogError::Poisoned)
    }

    /// Runs `f` with exclusive access, for sequences that must not interleave with other callers.
    pub fn with<T>(&self, f: impl FnOnce(&mut InsertionLog<W>) -> Result<T>) -> Result<T> {
        f(&mut *self.lock()?)
    }

    pub fn log(&self, text: &str, id: Option<&str>) -> Result<()> {
        self.lock()?.log(text, id)
    }

    pub fn append(&self, id: &str, extra: &str) -> Result<()> {
        self.lock()?.append(id, extra)
    }

    pub fn insert_before(&self, before_id: &str, text: &str, id: Option<&str>) -> Result<()> {
        self.lock()?.insert_before(before_id, text, id)
    }

    pub fn insert_after(&self, after_id: &str, text: &str, id: Option<&str>) -> Result<()> {
        self.lock()?.insert_after(after_id, text, id)
    }

    pub fn replace(&self, id: &str, text: &str) -> Result<()> {
        self.lock()?.replace(id, text)
    }

    pub fn flush(&self, id: &str) -> Result<()> {
        self.lock()?.flush(id)
    }

    /// Copy of the tracked messages at this instant.
    pub fn messages(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.messages().to_vec())
    }

    /// Gives the log back if this is the last handle and no holder panicked.
    pub fn into_inner(self) -> Option<InsertionLog<W>> {
        Arc::try_unwrap(self.inner).ok()?.into_inner().ok()
    }
}

impl<W: Write> From<InsertionLog<W>> for SharedInsertionLog<W> {
    fn from(log: InsertionLog<W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }
}
