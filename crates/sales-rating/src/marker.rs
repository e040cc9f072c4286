//! Per-device memory of which way the visitor voted.

use std::cell::RefCell;
use std::collections::HashMap;

use sales_cache::{cache_key, Cache};
use sales_core::SaleId;

use crate::error::StoreError;
use crate::vote::VoteDirection;

/// Key-value store of vote markers, one per sale.
///
/// Markers survive restarts and never expire.
pub trait VoteMarkerStore {
    fn get(&self, sale: &SaleId) -> Result<Option<VoteDirection>, StoreError>;
    fn set(&self, sale: &SaleId, direction: VoteDirection) -> Result<(), StoreError>;
}

/// Markers kept in a `Cache` under `vote:<sale-id>`.
#[derive(Debug)]
pub struct CacheMarkerStore {
    cache: Cache,
}

impl CacheMarkerStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl VoteMarkerStore for CacheMarkerStore {
    fn get(&self, sale: &SaleId) -> Result<Option<VoteDirection>, StoreError> {
        self.cache
            .get(&cache_key!("vote", sale))
            .map_err(|e| StoreError::Marker(e.to_string()))
    }

    fn set(&self, sale: &SaleId, direction: VoteDirection) -> Result<(), StoreError> {
        self.cache
            .set(&cache_key!("vote", sale), &direction)
            .map_err(|e| StoreError::Marker(e.to_string()))
    }
}

/// Markers held in memory.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    markers: RefCell<HashMap<SaleId, VoteDirection>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(self, sale: impl Into<SaleId>, direction: VoteDirection) -> Self {
        self.markers.borrow_mut().insert(sale.into(), direction);
        self
    }
}

impl VoteMarkerStore for MemoryMarkerStore {
    fn get(&self, sale: &SaleId) -> Result<Option<VoteDirection>, StoreError> {
        Ok(self.markers.borrow().get(sale).copied())
    }

    fn set(&self, sale: &SaleId, direction: VoteDirection) -> Result<(), StoreError> {
        self.markers.borrow_mut().insert(sale.clone(), direction);
        Ok(())
    }
}
