use std::fmt;

/// Identifier used for keyset pagination. Must be unique per item and
/// ordered the same way as the backing store orders its items.
pub type Key = i64;

/// Page index type - identifies a page of the virtualized sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub usize);

impl PageIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the page that owns the given absolute item index.
    pub fn containing(index: usize, page_size: usize) -> Self {
        Self(index / page_size)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }

    /// Absolute index of the first item of this page.
    ///
    /// Only valid for pages obtained from [`PageIndex::containing`], whose
    /// first item never exceeds the index they were computed from.
    pub fn first_item(&self, page_size: usize) -> usize {
        self.0 * page_size
    }

    /// Like [`first_item`](Self::first_item), but None when the page starts
    /// beyond `usize::MAX`.
    pub fn checked_first_item(&self, page_size: usize) -> Option<usize> {
        self.0.checked_mul(page_size)
    }

    /// Returns None past the last representable page.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Returns None for page 0.
    pub fn prev(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageIndex({})", self.0)
    }
}

/// The first page is pinned: it is never evicted.
pub const PINNED_PAGE: PageIndex = PageIndex(0);

/// An item that can live in a virtualized page.
///
/// Types with a stable, ordered integer identifier override [`PageItem::key`]
/// so the cache can chain keyset fetches between neighbouring pages. Types
/// that keep the default are always fetched by offset.
pub trait PageItem: Clone + PartialEq {
    fn key(&self) -> Option<Key> {
        None
    }
}
