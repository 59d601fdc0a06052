use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::Address;

/// In-memory set of subscribed addresses.
///
/// Membership only grows; there is no unsubscribe. Writers take the exclusive
/// lock, lookups share it.
#[derive(Debug, Default)]
pub struct Registry {
    observers: RwLock<HashSet<Address>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never leave the set half-updated; a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<Address>> {
        self.observers.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<Address>> {
        self.observers.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an address. Idempotent; always returns `true`.
    pub fn subscribe(&self, address: &str) -> bool {
        self.insert(Address::new(address));
        true
    }

    pub fn insert(&self, address: Address) {
        self.write().insert(address);
    }

    pub fn is_subscribed(&self, address: &str) -> bool {
        self.contains(&Address::new(address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.read().contains(address)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sorted snapshot of the current members
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.read().iter().cloned().collect();
        addresses.sort();
        addresses
    }
}
