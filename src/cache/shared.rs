use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{PageItem, Result};
use crate::provider::DataProvider;

use super::VirtualizingCollection;

/// A cloneable, thread-safe handle to one [`VirtualizingCollection`].
///
/// Every call holds the instance lock for its whole duration, fetches
/// included. Two threads reading into the same absent page therefore never
/// fetch it twice: the second one waits and then finds the page tracked.
pub struct SharedCollection<P: DataProvider> {
    inner: Arc<Mutex<VirtualizingCollection<P>>>,
}

impl<P: DataProvider> Clone for SharedCollection<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> SharedCollection<P>
where
    P: DataProvider,
    P::Item: PageItem,
{
    pub fn new(collection: VirtualizingCollection<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collection)),
        }
    }

    pub fn get(&self, index: usize) -> Result<Option<P::Item>> {
        self.inner.lock().get(index)
    }

    pub fn len(&self) -> Result<usize> {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.inner.lock().is_empty()
    }

    pub fn index_of(&self, item: &P::Item) -> Option<usize> {
        self.inner.lock().index_of(item)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn tracked_page_count(&self) -> usize {
        self.inner.lock().tracked_page_count()
    }

    /// Runs `f` with exclusive access to the collection.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut VirtualizingCollection<P>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<P> From<VirtualizingCollection<P>> for SharedCollection<P>
where
    P: DataProvider,
    P::Item: PageItem,
{
    fn from(collection: VirtualizingCollection<P>) -> Self {
        Self::new(collection)
    }
}
