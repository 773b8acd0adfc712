use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};
use xxhash_rust::xxh3::Xxh3;

///
/// ItemKey
///
/// Identity value used to correlate single-item refresh events.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ItemKey {
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Uint(u64),
    #[display("{_0}")]
    Text(String),
    #[display("#{_0:016x}")]
    Hash(u64),
}

impl From<i64> for ItemKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ItemKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ItemKey {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<u32> for ItemKey {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

///
/// Identity
///
/// Maps an item to its `ItemKey`.
/// The hashed default gives value-equality identity: equal items share a key.
///

pub struct Identity<T> {
    key: Arc<dyn Fn(&T) -> ItemKey + Send + Sync>,
}

impl<T: 'static> Identity<T> {
    pub fn new(key: impl Fn(&T) -> ItemKey + Send + Sync + 'static) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Value-equality identity via a stable xxh3 hash of the item.
    #[must_use]
    pub fn hashed() -> Self
    where
        T: Hash,
    {
        Self::new(|item| ItemKey::Hash(hash_item(item)))
    }

    #[must_use]
    pub fn key(&self, item: &T) -> ItemKey {
        (self.key)(item)
    }
}

impl<T> Clone for Identity<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
        }
    }
}

impl<T> fmt::Debug for Identity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Identity(..)")
    }
}

fn hash_item<T: Hash + ?Sized>(item: &T) -> u64 {
    let mut hasher = Xxh3::new();
    item.hash(&mut hasher);

    hasher.finish()
}
