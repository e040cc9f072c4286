//! The vote store seam.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use sales_core::SaleId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::vote::VoteDirection;

/// Authoritative hot/cold counts for one sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounts {
    #[serde(default)]
    pub hot_votes: u32,
    #[serde(default)]
    pub cold_votes: u32,
}

/// External store of vote counts.
#[async_trait(?Send)]
pub trait VoteStore {
    /// Current counts, or `None` if nobody voted on the sale yet.
    async fn get_counts(&self, sale: &SaleId) -> Result<Option<VoteCounts>, StoreError>;

    /// Count a vote atomically and return the new totals.
    ///
    /// With `previous` set to the opposite direction the old vote is moved:
    /// its bucket loses one and `direction` gains one, so the total is unchanged.
    async fn cast_vote(
        &self,
        sale: &SaleId,
        direction: VoteDirection,
        previous: Option<VoteDirection>,
    ) -> Result<VoteCounts, StoreError>;
}

/// Vote store held in memory.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    counts: RefCell<HashMap<SaleId, VoteCounts>>,
    cast_calls: Cell<usize>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed counts for a sale.
    pub fn with_counts(self, sale: impl Into<SaleId>, hot_votes: u32, cold_votes: u32) -> Self {
        self.counts.borrow_mut().insert(
            sale.into(),
            VoteCounts {
                hot_votes,
                cold_votes,
            },
        );
        self
    }

    /// Number of `cast_vote` calls received.
    pub fn cast_calls(&self) -> usize {
        self.cast_calls.get()
    }
}

#[async_trait(?Send)]
impl VoteStore for MemoryVoteStore {
    async fn get_counts(&self, sale: &SaleId) -> Result<Option<VoteCounts>, StoreError> {
        Ok(self.counts.borrow().get(sale).copied())
    }

    async fn cast_vote(
        &self,
        sale: &SaleId,
        direction: VoteDirection,
        previous: Option<VoteDirection>,
    ) -> Result<VoteCounts, StoreError> {
        self.cast_calls.set(self.cast_calls.get() + 1);

        let mut all = self.counts.borrow_mut();
        let counts = all.entry(sale.clone()).or_default();
        if previous == Some(direction) {
            return Ok(*counts);
        }
        if let Some(previous) = previous {
            let slot = bucket_mut(counts, previous);
            *slot = slot.saturating_sub(1);
        }
        let slot = bucket_mut(counts, direction);
        *slot = slot.saturating_add(1);
        Ok(*counts)
    }
}

fn bucket_mut(counts: &mut VoteCounts, direction: VoteDirection) -> &mut u32 {
    match direction {
        VoteDirection::Hot => &mut counts.hot_votes,
        VoteDirection::Cold => &mut counts.cold_votes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_vote_increments() {
        let store = MemoryVoteStore::new();
        let sale = SaleId::new("s1");
        assert_eq!(store.get_counts(&sale).await.unwrap(), None);

        let counts = store.cast_vote(&sale, VoteDirection::Hot, None).await.unwrap();
        assert_eq!(counts, VoteCounts { hot_votes: 1, cold_votes: 0 });
    }

    #[tokio::test]
    async fn test_switch_moves_vote() {
        let store = MemoryVoteStore::new().with_counts("s1", 3, 1);
        let sale = SaleId::new("s1");

        let counts = store
            .cast_vote(&sale, VoteDirection::Cold, Some(VoteDirection::Hot))
            .await
            .unwrap();
        assert_eq!(counts, VoteCounts { hot_votes: 2, cold_votes: 2 });
        assert_eq!(store.cast_calls(), 1);
    }

    #[test]
    fn test_counts_decode_store_row() {
        let counts: VoteCounts = serde_json::from_str(r#"{"hot_votes":4,"cold_votes":1}"#).unwrap();
        assert_eq!(counts.hot_votes, 4);
        let partial: VoteCounts = serde_json::from_str(r#"{"hot_votes":2}"#).unwrap();
        assert_eq!(partial.cold_votes, 0);
    }
}
