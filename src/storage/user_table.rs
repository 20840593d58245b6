use std::collections::BTreeMap;
use std::ops::Bound;

use crate::common::Key;

use super::{SubscriptionType, User, UserStatus};

const FIRST_NAMES: [&str; 16] = [
    "Alice", "Bob", "Carla", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Ingrid", "Jamal",
    "Kalinda", "Luis", "Malik", "Natalia", "Oscar", "Priya",
];

const LAST_NAMES: [&str; 12] = [
    "Anders", "Bailey", "Chen", "Dalton", "Esposito", "Fischer", "Gonzales", "Haddad", "Ivanova",
    "Jensen", "Khalid", "Lopez",
];

/// 2020-01-01T00:00:00Z
const EPOCH_2020: u64 = 1_577_836_800;
const SECONDS_PER_DAY: u64 = 86_400;

/// Case-insensitive substring predicate on a user's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }

    pub fn term(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, user: &User) -> bool {
        self.needle.is_empty() || user.name.to_lowercase().contains(&self.needle)
    }
}

/// In-memory user table ordered by id.
///
/// Answers the ordered range queries a relational `user` table would:
/// offset/limit scans, `id > ?` and `id < ?` keyset scans, each with an
/// optional name filter. The unfiltered count is kept alongside the rows so
/// it never requires a scan.
#[derive(Debug, Default)]
pub struct UserTable {
    rows: BTreeMap<Key, User>,
    total_users: usize,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table of `num_records` users with ids `1..=num_records`.
    ///
    /// The data is deterministic so that runs are reproducible.
    pub fn generate(num_records: usize) -> Self {
        let mut table = Self::new();
        for i in 0..num_records {
            let id = i as Key + 1;
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let registered_at = EPOCH_2020 + (i as u64 * 7919 % 1461) * SECONDS_PER_DAY;

            let user = User {
                id,
                name: format!("{} {}", first, last),
                email: format!(
                    "{}.{}{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    id
                ),
                registered_at,
                last_login: registered_at + (i as u64 * 104_729 % 365) * SECONDS_PER_DAY,
                status: UserStatus::ALL[i % UserStatus::ALL.len()],
                points: (i as u32).wrapping_mul(2_654_435_761) % 10_001,
                subscription: SubscriptionType::ALL[(i / 3) % SubscriptionType::ALL.len()],
            };
            table.insert(user);
        }
        table
    }

    /// Inserts or replaces a user. Returns the previous row with the same id.
    pub fn insert(&mut self, user: User) -> Option<User> {
        let previous = self.rows.insert(user.id, user);
        if previous.is_none() {
            self.total_users += 1;
        }
        previous
    }

    pub fn get(&self, id: Key) -> Option<&User> {
        self.rows.get(&id)
    }

    pub fn len(&self) -> usize {
        self.total_users
    }

    pub fn is_empty(&self) -> bool {
        self.total_users == 0
    }

    pub fn user_range(&self, offset: usize, limit: usize) -> Vec<User> {
        self.rows.values().skip(offset).take(limit).cloned().collect()
    }

    pub fn users_after(&self, id: Key, limit: usize) -> Vec<User> {
        self.rows
            .range((Bound::Excluded(id), Bound::Unbounded))
            .take(limit)
            .map(|(_, user)| user.clone())
            .collect()
    }

    pub fn users_before(&self, id: Key, limit: usize) -> Vec<User> {
        let mut users: Vec<User> = self
            .rows
            .range(..id)
            .rev()
            .take(limit)
            .map(|(_, user)| user.clone())
            .collect();
        users.reverse();
        users
    }

    pub fn search_count(&self, filter: &NameFilter) -> usize {
        self.rows.values().filter(|u| filter.matches(u)).count()
    }

    pub fn search_range(&self, filter: &NameFilter, offset: usize, limit: usize) -> Vec<User> {
        self.rows
            .values()
            .filter(|u| filter.matches(u))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn search_after(&self, filter: &NameFilter, id: Key, limit: usize) -> Vec<User> {
        self.rows
            .range((Bound::Excluded(id), Bound::Unbounded))
            .map(|(_, user)| user)
            .filter(|u| filter.matches(u))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn search_before(&self, filter: &NameFilter, id: Key, limit: usize) -> Vec<User> {
        let mut users: Vec<User> = self
            .rows
            .range(..id)
            .rev()
            .map(|(_, user)| user)
            .filter(|u| filter.matches(u))
            .take(limit)
            .cloned()
            .collect();
        users.reverse();
        users
    }
}
