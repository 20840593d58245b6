use std::sync::Arc;

use crate::common::{Key, Result};
use crate::storage::{NameFilter, User, UserTable};

use super::DataProvider;

/// Pages over the users whose name contains a search term, ignoring case.
///
/// The same filter applies to the count and to every fetch, so offsets and
/// keyset cursors refer to positions within the filtered result.
#[derive(Debug, Clone)]
pub struct UserSearchProvider {
    table: Arc<UserTable>,
    filter: NameFilter,
}

impl UserSearchProvider {
    pub fn new(table: Arc<UserTable>, search_term: &str) -> Self {
        Self {
            table,
            filter: NameFilter::new(search_term),
        }
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }
}

impl DataProvider for UserSearchProvider {
    type Item = User;

    fn fetch_count(&self) -> Result<usize> {
        Ok(self.table.search_count(&self.filter))
    }

    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.search_range(&self.filter, offset, limit))
    }

    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.search_after(&self.filter, after, limit))
    }

    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.search_before(&self.filter, before, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<UserTable> {
        let mut table = UserTable::new();
        for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Natalia"), (4, "Khalid"), (5, "Kalinda")] {
            table.insert(User::new(id, name, ""));
        }
        Arc::new(table)
    }

    #[test]
    fn test_search_provider_filters_every_operation() {
        let provider = UserSearchProvider::new(table(), "aLi");

        assert_eq!(provider.fetch_count().unwrap(), 4);

        let range: Vec<Key> = provider.fetch_range(0, 2).unwrap().iter().map(|u| u.id).collect();
        assert_eq!(range, vec![1, 3]);

        let next: Vec<Key> = provider.fetch_next(3, 10).unwrap().iter().map(|u| u.id).collect();
        assert_eq!(next, vec![4, 5]);

        let prev: Vec<Key> = provider.fetch_previous(4, 10).unwrap().iter().map(|u| u.id).collect();
        assert_eq!(prev, vec![1, 3]);
    }

    #[test]
    fn test_search_provider_no_matches() {
        let provider = UserSearchProvider::new(table(), "zzz");
        assert_eq!(provider.fetch_count().unwrap(), 0);
        assert!(provider.fetch_range(0, 100).unwrap().is_empty());
    }
}
