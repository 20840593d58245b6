//! Shared helpers for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use vlist::provider::DataProvider;
use vlist::storage::{User, UserTable};
use vlist::{Key, Result, VlistError};

/// A data-source call as seen by the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Count,
    Range(usize, usize),
    Next(Key, usize),
    Previous(Key, usize),
}

/// Wraps a provider and logs every call made through it.
pub struct RecordingProvider<P> {
    inner: P,
    calls: Mutex<Vec<Call>>,
    fail_keyset: Mutex<bool>,
}

impl<P> RecordingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_keyset: Mutex::new(false),
        }
    }

    /// Makes `fetch_next` and `fetch_previous` fail while `on` is set.
    pub fn fail_keyset(&self, on: bool) {
        *self.fail_keyset.lock() = on;
    }

    fn check_keyset(&self) -> Result<()> {
        if *self.fail_keyset.lock() {
            return Err(VlistError::data_source("keyset query timed out"));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Number of page fetches (everything but `Count`).
    pub fn page_fetches(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| !matches!(c, Call::Count))
            .count()
    }

    pub fn count_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Count))
            .count()
    }
}

impl<P: DataProvider> DataProvider for RecordingProvider<P> {
    type Item = P::Item;

    fn fetch_count(&self) -> Result<usize> {
        self.calls.lock().push(Call::Count);
        self.inner.fetch_count()
    }

    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<P::Item>> {
        self.calls.lock().push(Call::Range(offset, limit));
        self.inner.fetch_range(offset, limit)
    }

    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<P::Item>> {
        self.calls.lock().push(Call::Next(after, limit));
        self.check_keyset()?;
        self.inner.fetch_next(after, limit)
    }

    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<P::Item>> {
        self.calls.lock().push(Call::Previous(before, limit));
        self.check_keyset()?;
        self.inner.fetch_previous(before, limit)
    }
}

/// A table whose users carry exactly the given ids.
pub fn users_with_ids(ids: impl IntoIterator<Item = Key>) -> Arc<UserTable> {
    let mut table = UserTable::new();
    for id in ids {
        table.insert(User::new(id, format!("User {}", id), format!("user{}@example.com", id)));
    }
    Arc::new(table)
}

/// A table whose users carry the given names, with ids starting at 1.
pub fn users_named(names: &[&str]) -> Arc<UserTable> {
    let mut table = UserTable::new();
    for (i, name) in names.iter().enumerate() {
        table.insert(User::new(i as Key + 1, *name, ""));
    }
    Arc::new(table)
}
