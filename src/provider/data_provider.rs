use std::sync::Arc;

use crate::common::{Key, Result};

/// The paginated data source a virtualized collection reads from.
///
/// Every call blocks until the backing store answers. Items must come back
/// ordered by their identifier, ascending, for all four operations.
pub trait DataProvider {
    type Item;

    /// Total number of items matching the provider's query.
    fn fetch_count(&self) -> Result<usize>;

    /// Up to `limit` items starting at the zero-based `offset`.
    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>>;

    /// Up to `limit` items whose identifier is strictly greater than `after`.
    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<Self::Item>>;

    /// The `limit` items immediately preceding `before` (identifier strictly
    /// less than it), returned in ascending order.
    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<Self::Item>>;
}

impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    type Item = P::Item;

    fn fetch_count(&self) -> Result<usize> {
        (**self).fetch_count()
    }

    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_range(offset, limit)
    }

    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_next(after, limit)
    }

    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_previous(before, limit)
    }
}

impl<P: DataProvider + ?Sized> DataProvider for &P {
    type Item = P::Item;

    fn fetch_count(&self) -> Result<usize> {
        (**self).fetch_count()
    }

    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_range(offset, limit)
    }

    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_next(after, limit)
    }

    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_previous(before, limit)
    }
}
