use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{Key, PageItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl UserStatus {
    pub const ALL: [UserStatus; 4] = [
        UserStatus::Active,
        UserStatus::Inactive,
        UserStatus::Suspended,
        UserStatus::Pending,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 4] = [
        SubscriptionType::Free,
        SubscriptionType::Basic,
        SubscriptionType::Premium,
        SubscriptionType::Enterprise,
    ];
}

/// A row of the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Key,
    pub name: String,
    pub email: String,
    /// Unix seconds
    pub registered_at: u64,
    /// Unix seconds
    pub last_login: u64,
    pub status: UserStatus,
    pub points: u32,
    pub subscription: SubscriptionType,
}

impl User {
    /// Creates an active free-tier user with zeroed timestamps.
    pub fn new(id: Key, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            registered_at: 0,
            last_login: 0,
            status: UserStatus::Active,
            points: 0,
            subscription: SubscriptionType::Free,
        }
    }
}

impl PageItem for User {
    fn key(&self) -> Option<Key> {
        Some(self.id)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} <{}>", self.id, self.name, self.email)
    }
}
