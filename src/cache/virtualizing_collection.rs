use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::common::{
    CacheConfig, PageIndex, PageItem, Result, VlistError, PINNED_PAGE,
};
use crate::provider::DataProvider;

use super::{Clock, SystemClock};

/// A read-only, randomly indexable sequence that materializes pages of a
/// [`DataProvider`] on demand.
///
/// Reading an index fetches the page that owns it, requests the neighbouring
/// page in the direction of travel, and drops pages that have been idle for
/// longer than the configured timeout. Page 0 is never dropped by the timeout.
///
/// When the previous (or next) page is already cached and the item type
/// exposes a key, a new page is fetched with a keyset query chained off that
/// neighbour. Otherwise it is fetched by offset.
pub struct VirtualizingCollection<P: DataProvider> {
    provider: P,
    config: CacheConfig,
    /// Page table: an empty vector is a requested page that holds no items yet
    pages: HashMap<PageIndex, Vec<P::Item>>,
    /// Last time each tracked page was touched; drives both idle eviction
    /// and the page cap
    page_touched: HashMap<PageIndex, Instant>,
    /// Logical length, fetched once
    count: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl<P> VirtualizingCollection<P>
where
    P: DataProvider,
    P::Item: PageItem,
{
    /// Creates a collection with the default page size and timeout.
    pub fn new(provider: P) -> Self {
        Self::build(provider, CacheConfig::default())
    }

    pub fn with_page_size(provider: P, page_size: usize) -> Result<Self> {
        Self::with_config(provider, CacheConfig::default().with_page_size(page_size))
    }

    pub fn with_config(provider: P, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(provider, config))
    }

    fn build(provider: P, config: CacheConfig) -> Self {
        Self {
            provider,
            config,
            pages: HashMap::new(),
            page_touched: HashMap::new(),
            count: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for page touch times.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Returns the logical length, asking the provider the first time only.
    pub fn len(&mut self) -> Result<usize> {
        if let Some(count) = self.count {
            return Ok(count);
        }
        let count = self.provider.fetch_count()?;
        debug!("Fetched item count: {}", count);
        self.count = Some(count);
        Ok(count)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads the item at `index`.
    ///
    /// Returns `Ok(None)` when the owning page holds nothing at that offset,
    /// which is the case for a page that is requested but not yet populated
    /// and for indices past the end of the data.
    pub fn get(&mut self, index: usize) -> Result<Option<P::Item>> {
        let page_size = self.page_size();
        let page = PageIndex::containing(index, page_size);
        let offset = index % page_size;

        self.cleanup_pages();

        self.request_next_page(page)?;
        let mut neighbour = None;

        if offset > page_size / 2 {
            if let Some(next) = page.next() {
                let in_range = match next.checked_first_item(page_size) {
                    Some(start) => start < self.len()?,
                    None => false,
                };
                if in_range {
                    self.request_next_page(next)?;
                    neighbour = Some(next);
                }
            }
        }

        if offset < page_size / 2 {
            if let Some(prev) = page.prev() {
                self.request_previous_page(prev)?;
                neighbour = Some(prev);
            }
        }

        self.enforce_page_cap(page, neighbour);

        Ok(self
            .pages
            .get(&page)
            .and_then(|items| items.get(offset))
            .cloned())
    }

    /// Iterates over `0..len`, reading every index through [`get`](Self::get).
    pub fn iter(&mut self) -> Iter<'_, P> {
        Iter {
            collection: self,
            next: 0,
            len: None,
        }
    }

    /// Finds `item` among the cached pages only.
    ///
    /// Items outside the current window are reported as not found.
    pub fn index_of(&self, item: &P::Item) -> Option<usize> {
        let mut tracked: Vec<_> = self.pages.iter().collect();
        tracked.sort_by_key(|(page, _)| **page);

        tracked.into_iter().find_map(|(page, items)| {
            items
                .iter()
                .position(|candidate| candidate == item)
                .map(|pos| page.first_item(self.page_size()) + pos)
        })
    }

    /// Drops every cached page. The logical length is kept.
    pub fn clear(&mut self) {
        debug!("Clearing {} cached pages", self.pages.len());
        self.pages.clear();
        self.page_touched.clear();
    }

    /// Drops pages (other than page 0) idle for longer than the page timeout.
    pub fn cleanup_pages(&mut self) {
        let now = self.clock.now();
        let timeout = self.config.page_timeout();

        let expired: Vec<PageIndex> = self
            .page_touched
            .iter()
            .filter(|&(&page, &touched)| {
                page != PINNED_PAGE && now.saturating_duration_since(touched) > timeout
            })
            .map(|(&page, _)| page)
            .collect();

        for page in expired {
            debug!("Evicting idle {}", page);
            self.evict_page(page);
        }
    }

    /// Returns the tracked page indices in ascending order.
    pub fn tracked_pages(&self) -> Vec<PageIndex> {
        let mut pages: Vec<PageIndex> = self.pages.keys().copied().collect();
        pages.sort();
        pages
    }

    pub fn tracked_page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_page_tracked(&self, page: PageIndex) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn set(&mut self, _index: usize, _item: P::Item) -> Result<()> {
        Err(VlistError::UnsupportedOperation("set"))
    }

    pub fn insert(&mut self, _index: usize, _item: P::Item) -> Result<()> {
        Err(VlistError::UnsupportedOperation("insert"))
    }

    pub fn push(&mut self, _item: P::Item) -> Result<()> {
        Err(VlistError::UnsupportedOperation("push"))
    }

    pub fn remove(&mut self, _item: &P::Item) -> Result<bool> {
        Err(VlistError::UnsupportedOperation("remove"))
    }

    pub fn remove_at(&mut self, _index: usize) -> Result<P::Item> {
        Err(VlistError::UnsupportedOperation("remove_at"))
    }

    /// Membership over the whole logical sequence cannot be answered from
    /// the window; use [`index_of`](Self::index_of) for a cache-only lookup.
    pub fn contains(&self, _item: &P::Item) -> Result<bool> {
        Err(VlistError::UnsupportedOperation("contains"))
    }

    /// Requests a page while moving forward, chaining off the tail of the
    /// previous page when possible.
    fn request_next_page(&mut self, page: PageIndex) -> Result<()> {
        if self.pages.contains_key(&page) {
            self.touch(page);
            return Ok(());
        }

        self.pages.insert(page, Vec::new());

        let after = match page.prev() {
            Some(prev) if self.pages.len() > 1 => self
                .pages
                .get(&prev)
                .and_then(|items| items.last())
                .and_then(|item| item.key()),
            _ => None,
        };

        let page_size = self.page_size();
        let fetched = match after {
            Some(after) => {
                debug!("Fetching {} after key {}", page, after);
                self.provider.fetch_next(after, page_size)
            }
            None => {
                debug!("Fetching {} at offset {}", page, page.first_item(page_size));
                self.provider
                    .fetch_range(page.first_item(page_size), page_size)
            }
        };

        self.populate_page(page, fetched)
    }

    /// Requests a page while moving backward, chaining off the head of the
    /// next page when possible.
    fn request_previous_page(&mut self, page: PageIndex) -> Result<()> {
        if self.pages.contains_key(&page) {
            self.touch(page);
            return Ok(());
        }

        self.pages.insert(page, Vec::new());

        let before = match page.next() {
            Some(next) if self.pages.len() > 1 => self
                .pages
                .get(&next)
                .and_then(|items| items.first())
                .and_then(|item| item.key()),
            _ => None,
        };

        let page_size = self.page_size();
        let fetched = match before {
            Some(before) => {
                debug!("Fetching {} before key {}", page, before);
                self.provider.fetch_previous(before, page_size)
            }
            None => {
                debug!("Fetching {} at offset {}", page, page.first_item(page_size));
                self.provider
                    .fetch_range(page.first_item(page_size), page_size)
            }
        };

        self.populate_page(page, fetched)
    }

    /// Fills a claimed slot, or releases it when the fetch failed so the next
    /// read retries.
    fn populate_page(&mut self, page: PageIndex, fetched: Result<Vec<P::Item>>) -> Result<()> {
        match fetched {
            Ok(items) => {
                trace!("Populated {} with {} items", page, items.len());
                self.pages.insert(page, items);
                self.touch(page);
                Ok(())
            }
            Err(err) => {
                warn!("Fetching {} failed: {}", page, err);
                self.pages.remove(&page);
                Err(err)
            }
        }
    }

    fn touch(&mut self, page: PageIndex) {
        trace!("Touching {}", page);
        self.page_touched.insert(page, self.clock.now());
    }

    /// Shrinks the page table to the configured cap by dropping the least
    /// recently touched pages, sparing page 0 and the pages touched by the
    /// current read. Ties go to the lower page index.
    fn enforce_page_cap(&mut self, current: PageIndex, neighbour: Option<PageIndex>) {
        let Some(max_pages) = self.config.max_pages else {
            return;
        };

        while self.pages.len() > max_pages {
            let victim = self
                .page_touched
                .iter()
                .filter(|&(&page, _)| {
                    page != PINNED_PAGE && page != current && Some(page) != neighbour
                })
                .min_by_key(|&(&page, &touched)| (touched, page))
                .map(|(&page, _)| page);

            match victim {
                Some(victim) => {
                    debug!("Evicting {} to stay within {} pages", victim, max_pages);
                    self.evict_page(victim);
                }
                None => break,
            }
        }
    }

    fn evict_page(&mut self, page: PageIndex) {
        self.pages.remove(&page);
        self.page_touched.remove(&page);
    }
}

/// Iterator over a [`VirtualizingCollection`], yielding one read per index.
pub struct Iter<'a, P: DataProvider> {
    collection: &'a mut VirtualizingCollection<P>,
    next: usize,
    len: Option<usize>,
}

impl<P> Iterator for Iter<'_, P>
where
    P: DataProvider,
    P::Item: PageItem,
{
    type Item = Result<Option<P::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = match self.len {
            Some(len) => len,
            None => match self.collection.len() {
                Ok(len) => {
                    self.len = Some(len);
                    len
                }
                Err(err) => {
                    self.len = Some(0);
                    return Some(Err(err));
                }
            },
        };

        if self.next >= len {
            return None;
        }

        let index = self.next;
        self.next += 1;
        Some(self.collection.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::common::Key;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Key,
    }

    impl PageItem for Row {
        fn key(&self) -> Option<Key> {
            Some(self.id)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Count,
        Range(usize, usize),
        Next(Key, usize),
        Previous(Key, usize),
    }

    struct RowProvider {
        rows: Vec<Row>,
        calls: Mutex<Vec<Call>>,
        failing: Mutex<bool>,
    }

    impl RowProvider {
        fn with_ids(ids: impl IntoIterator<Item = Key>) -> Self {
            Self {
                rows: ids.into_iter().map(|id| Row { id }).collect(),
                calls: Mutex::new(Vec::new()),
                failing: Mutex::new(false),
            }
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock())
        }

        fn record(&self, call: Call) -> Result<()> {
            self.calls.lock().push(call);
            if *self.failing.lock() {
                return Err(VlistError::data_source("backing store unavailable"));
            }
            Ok(())
        }
    }

    impl DataProvider for RowProvider {
        type Item = Row;

        fn fetch_count(&self) -> Result<usize> {
            self.record(Call::Count)?;
            Ok(self.rows.len())
        }

        fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<Row>> {
            self.record(Call::Range(offset, limit))?;
            Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
        }

        fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<Row>> {
            self.record(Call::Next(after, limit))?;
            Ok(self
                .rows
                .iter()
                .filter(|r| r.id > after)
                .take(limit)
                .cloned()
                .collect())
        }

        fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<Row>> {
            self.record(Call::Previous(before, limit))?;
            let preceding: Vec<Row> = self.rows.iter().filter(|r| r.id < before).cloned().collect();
            let start = preceding.len().saturating_sub(limit);
            Ok(preceding[start..].to_vec())
        }
    }

    fn collection(
        provider: &RowProvider,
        page_size: usize,
    ) -> VirtualizingCollection<&RowProvider> {
        VirtualizingCollection::with_page_size(provider, page_size).unwrap()
    }

    #[test]
    fn test_get_fetches_first_page_by_offset() {
        let provider = RowProvider::with_ids(1..=20);
        let mut list = collection(&provider, 10);

        assert_eq!(list.get(0).unwrap(), Some(Row { id: 1 }));
        assert_eq!(provider.take_calls(), vec![Call::Range(0, 10)]);
        assert_eq!(list.tracked_pages(), vec![PageIndex::new(0)]);
    }

    #[test]
    fn test_forward_read_ahead_chains_keyset() {
        let provider = RowProvider::with_ids([5, 9, 14, 20, 22, 40, 41]);
        let mut list = collection(&provider, 3);

        // Offset 2 is in the upper half of page 0
        assert_eq!(list.get(2).unwrap(), Some(Row { id: 14 }));
        assert_eq!(
            provider.take_calls(),
            vec![Call::Range(0, 3), Call::Count, Call::Next(14, 3)]
        );
        assert!(list.is_page_tracked(PageIndex::new(1)));
    }

    #[test]
    fn test_backward_read_ahead_chains_keyset() {
        let provider = RowProvider::with_ids((1..=30).map(|i| i * 10));
        let mut list = collection(&provider, 10);

        // Offset 0 of page 2 is in the lower half
        assert_eq!(list.get(20).unwrap(), Some(Row { id: 210 }));
        assert_eq!(
            provider.take_calls(),
            vec![Call::Range(20, 10), Call::Previous(210, 10)]
        );
        assert_eq!(list.get(19).unwrap(), Some(Row { id: 200 }));
    }

    #[test]
    fn test_tracked_page_is_only_touched() {
        let provider = RowProvider::with_ids(1..=20);
        let mut list = collection(&provider, 10);

        list.get(3).unwrap();
        provider.take_calls();

        list.get(4).unwrap();
        assert!(provider.take_calls().is_empty());
    }

    #[test]
    fn test_count_fetched_once() {
        let provider = RowProvider::with_ids(1..=20);
        let mut list = collection(&provider, 10);

        assert_eq!(list.len().unwrap(), 20);
        assert_eq!(list.len().unwrap(), 20);
        list.get(8).unwrap();
        list.clear();
        assert_eq!(list.len().unwrap(), 20);

        let counts = provider
            .take_calls()
            .into_iter()
            .filter(|c| *c == Call::Count)
            .count();
        assert_eq!(counts, 1);
    }

    #[test]
    fn test_past_the_end_is_not_available() {
        let provider = RowProvider::with_ids(1..=5);
        let mut list = collection(&provider, 10);

        assert_eq!(list.get(7).unwrap(), None);
        assert_eq!(list.get(42).unwrap(), None);
    }

    #[test]
    fn test_failed_fetch_releases_slot() {
        let provider = RowProvider::with_ids(1..=20);
        let mut list = collection(&provider, 10);

        *provider.failing.lock() = true;
        assert!(matches!(list.get(0), Err(VlistError::DataSource(_))));
        assert_eq!(list.tracked_page_count(), 0);

        *provider.failing.lock() = false;
        provider.take_calls();
        assert_eq!(list.get(0).unwrap(), Some(Row { id: 1 }));
        assert_eq!(provider.take_calls(), vec![Call::Range(0, 10)]);
    }

    #[test]
    fn test_eviction_skips_page_zero() {
        let provider = RowProvider::with_ids(1..=50);
        let clock = ManualClock::new();
        let mut list = VirtualizingCollection::with_config(
            &provider,
            CacheConfig::new(10, 1_000),
        )
        .unwrap()
        .with_clock(clock.clone());

        list.get(0).unwrap();
        list.get(35).unwrap();
        assert_eq!(
            list.tracked_pages(),
            vec![PageIndex::new(0), PageIndex::new(3)]
        );

        clock.advance_ms(1_001);
        list.cleanup_pages();
        assert_eq!(list.tracked_pages(), vec![PageIndex::new(0)]);
    }

    #[test]
    fn test_page_cap_spares_current_and_pinned_pages() {
        let provider = RowProvider::with_ids(1..=200);
        let config = CacheConfig::new(10, 60_000).with_max_pages(3);
        let mut list = VirtualizingCollection::with_config(&provider, config).unwrap();

        for index in [0, 55, 95, 145, 185] {
            list.get(index).unwrap();
            assert!(list.tracked_page_count() <= 3);
            assert!(list.is_page_tracked(PageIndex::new(0)));
            assert!(list.is_page_tracked(PageIndex::containing(index, 10)));
        }
    }

    #[test]
    fn test_read_near_usize_max_is_not_available() {
        let provider = RowProvider::with_ids(1..=10);
        let mut list = collection(&provider, 4);

        // Offset 3 is in the upper half, and the next page would start past usize::MAX
        assert_eq!(list.get(usize::MAX).unwrap(), None);
        assert_eq!(
            list.tracked_pages(),
            vec![PageIndex::containing(usize::MAX, 4)]
        );
        assert_eq!(provider.take_calls(), vec![Call::Range(usize::MAX - 3, 4)]);

        let mut wide = collection(&provider, 100);
        assert_eq!(wide.get(usize::MAX - 20).unwrap(), None);
    }

    #[test]
    fn test_page_cap_drops_least_recently_touched() {
        let provider = RowProvider::with_ids(1..=200);
        let clock = ManualClock::new();
        let config = CacheConfig::new(10, 60_000).with_max_pages(3);
        let mut list = VirtualizingCollection::with_config(&provider, config)
            .unwrap()
            .with_clock(clock.clone());

        // Offset 5 reads ahead in neither direction
        for index in [5, 35, 65, 35] {
            list.get(index).unwrap();
            clock.advance_ms(10);
        }
        assert_eq!(list.tracked_page_count(), 3);

        // Page 6 was touched before page 3's second read
        list.get(95).unwrap();
        assert_eq!(
            list.tracked_pages(),
            vec![PageIndex::new(0), PageIndex::new(3), PageIndex::new(9)]
        );
    }

    #[test]
    fn test_index_of_searches_window_only() {
        let provider = RowProvider::with_ids(1..=100);
        let mut list = collection(&provider, 10);

        list.get(42).unwrap();
        assert_eq!(list.index_of(&Row { id: 43 }), Some(42));
        assert_eq!(list.index_of(&Row { id: 90 }), None);
    }

    #[test]
    fn test_mutation_is_unsupported() {
        let provider = RowProvider::with_ids(1..=3);
        let mut list = collection(&provider, 10);

        assert!(matches!(
            list.set(0, Row { id: 9 }),
            Err(VlistError::UnsupportedOperation("set"))
        ));
        assert!(list.insert(0, Row { id: 9 }).is_err());
        assert!(list.push(Row { id: 9 }).is_err());
        assert!(list.remove(&Row { id: 1 }).is_err());
        assert!(list.remove_at(0).is_err());
        assert!(list.contains(&Row { id: 1 }).is_err());
    }

    #[test]
    fn test_iter_reads_every_index() {
        let provider = RowProvider::with_ids(1..=25);
        let mut list = collection(&provider, 10);

        let ids: Vec<Key> = list
            .iter()
            .map(|item| item.unwrap().unwrap().id)
            .collect();
        assert_eq!(ids, (1..=25).collect::<Vec<Key>>());
    }
}
