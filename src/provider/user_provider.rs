use std::sync::Arc;

use crate::common::{Key, Result};
use crate::storage::{User, UserTable};

use super::DataProvider;

/// Pages over every row of the user table.
#[derive(Debug, Clone)]
pub struct UserProvider {
    table: Arc<UserTable>,
}

impl UserProvider {
    pub fn new(table: Arc<UserTable>) -> Self {
        Self { table }
    }
}

impl DataProvider for UserProvider {
    type Item = User;

    fn fetch_count(&self) -> Result<usize> {
        Ok(self.table.len())
    }

    fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.user_range(offset, limit))
    }

    fn fetch_next(&self, after: Key, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.users_after(after, limit))
    }

    fn fetch_previous(&self, before: Key, limit: usize) -> Result<Vec<User>> {
        Ok(self.table.users_before(before, limit))
    }
}
