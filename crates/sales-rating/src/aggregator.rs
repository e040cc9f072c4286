//! Ratings and vote casting for the sales shown to one visitor.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use edge_observability::StructuredLogger;
use sales_core::{catalog::Sale, listing::ListingPipeline, SaleId};
use serde::Serialize;

use crate::error::{StoreError, VoteError};
use crate::marker::VoteMarkerStore;
use crate::rating::Rating;
use crate::store::VoteStore;
use crate::vote::{VoteDirection, VoteKind, VoteState};

/// How long a vote may stay in flight before it counts as failed.
pub const DEFAULT_VOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// A counted vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteReceipt {
    pub sale_id: SaleId,
    pub direction: VoteDirection,
    pub kind: VoteKind,
    /// Rating recomputed from the counts the store returned.
    pub rating: Rating,
}

impl VoteReceipt {
    /// German confirmation for the visitor.
    pub fn confirmation(&self) -> &'static str {
        match (self.kind, self.direction) {
            (VoteKind::Fresh, VoteDirection::Hot) => "🌿 Hot vote abgegeben!",
            (VoteKind::Fresh, VoteDirection::Cold) => "❄️ Cold vote abgegeben!",
            (VoteKind::Switch, VoteDirection::Hot) => "🌿 Vote zu Hot geändert!",
            (VoteKind::Switch, VoteDirection::Cold) => "❄️ Vote zu Cold geändert!",
        }
    }
}

/// Derives ratings from the vote store and mediates votes.
///
/// Reads fail softly: the last known rating (or zero) is kept and the failure
/// is logged. Votes are checked locally first (expired sale, same direction
/// again, vote already in flight) so rejected votes never reach the store.
/// Each sale has its own busy flag; votes on different sales are independent.
pub struct RatingAggregator {
    store: Rc<dyn VoteStore>,
    markers: Rc<dyn VoteMarkerStore>,
    logger: StructuredLogger,
    today: NaiveDate,
    vote_timeout: Duration,
    ratings: RefCell<HashMap<SaleId, Rating>>,
    in_flight: RefCell<HashSet<SaleId>>,
}

impl RatingAggregator {
    pub fn new(
        store: Rc<dyn VoteStore>,
        markers: Rc<dyn VoteMarkerStore>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            store,
            markers,
            logger,
            today: ListingPipeline::today(),
            vote_timeout: DEFAULT_VOTE_TIMEOUT,
            ratings: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    /// Date used to decide whether a sale has expired.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_vote_timeout(mut self, timeout: Duration) -> Self {
        self.vote_timeout = timeout;
        self
    }

    /// Last known rating without touching the store.
    pub fn rating(&self, sale: &SaleId) -> Rating {
        self.ratings.borrow().get(sale).copied().unwrap_or_default()
    }

    /// Fetch the current rating.
    ///
    /// A sale nobody voted on has a zero rating. On failure the last known
    /// rating is returned.
    pub async fn get_rating(&self, sale: &SaleId) -> Rating {
        match self.store.get_counts(sale).await {
            Ok(counts) => {
                let rating = Rating::from_counts(counts.unwrap_or_default());
                self.ratings.borrow_mut().insert(sale.clone(), rating);
                rating
            }
            Err(e) => {
                self.logger
                    .error_builder("Failed to fetch rating")
                    .field("sale_id", sale.as_str())
                    .field("error", e.to_string())
                    .emit();
                self.rating(sale)
            }
        }
    }

    /// This visitor's vote on `sale`; unreadable markers count as unvoted.
    pub fn my_vote(&self, sale: &SaleId) -> VoteState {
        match self.markers.get(sale) {
            Ok(direction) => VoteState::from(direction),
            Err(e) => {
                self.logger
                    .warn_builder("Failed to read vote marker")
                    .field("sale_id", sale.as_str())
                    .field("error", e.to_string())
                    .emit();
                VoteState::Unvoted
            }
        }
    }

    /// Whether a vote on `sale` is in flight.
    pub fn is_busy(&self, sale: &SaleId) -> bool {
        self.in_flight.borrow().contains(sale)
    }

    pub async fn vote_hot(&self, sale: &Sale) -> Result<VoteReceipt, VoteError> {
        self.vote(sale, VoteDirection::Hot).await
    }

    pub async fn vote_cold(&self, sale: &Sale) -> Result<VoteReceipt, VoteError> {
        self.vote(sale, VoteDirection::Cold).await
    }

    /// Vote on `sale`.
    ///
    /// On any failure the marker and the known rating stay as they were.
    pub async fn vote(
        &self,
        sale: &Sale,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, VoteError> {
        if sale.is_expired(self.today) {
            return Err(self.conflict(VoteError::SaleExpired(sale.id.clone())));
        }

        let state = self.my_vote(&sale.id);
        let Some((_, kind)) = state.transition(direction) else {
            return Err(self.conflict(VoteError::AlreadyVoted {
                sale: sale.id.clone(),
                direction,
            }));
        };

        let _guard = InFlight::acquire(&self.in_flight, &sale.id)
            .ok_or_else(|| VoteError::Busy(sale.id.clone()))?;

        let cast = self.store.cast_vote(&sale.id, direction, state.direction());
        let counts = match with_timeout(self.vote_timeout, cast).await {
            Some(Ok(counts)) => counts,
            Some(Err(e)) => {
                self.logger
                    .warn_builder("Vote failed")
                    .field("sale_id", sale.id.as_str())
                    .field("direction", direction.as_str())
                    .field("error", e.to_string())
                    .emit();
                return Err(VoteError::Remote(e));
            }
            None => {
                self.logger
                    .warn_builder("Vote timed out")
                    .field("sale_id", sale.id.as_str())
                    .duration_ms("timeout_ms", self.vote_timeout)
                    .emit();
                return Err(VoteError::Timeout {
                    sale: sale.id.clone(),
                    after: self.vote_timeout,
                });
            }
        };

        let rating = Rating::from_counts(counts);
        self.ratings.borrow_mut().insert(sale.id.clone(), rating);

        // the vote is counted either way; a lost marker only re-enables the button
        if let Err(e) = self.markers.set(&sale.id, direction) {
            self.logger
                .warn_builder("Failed to store vote marker")
                .field("sale_id", sale.id.as_str())
                .field("error", e.to_string())
                .emit();
        }

        self.logger
            .info_builder("Vote counted")
            .field("sale_id", sale.id.as_str())
            .field("direction", direction.as_str())
            .field_bool("switch", kind == VoteKind::Switch)
            .field_i64("hot_votes", rating.hot_votes() as i64)
            .field_i64("cold_votes", rating.cold_votes() as i64)
            .emit();

        Ok(VoteReceipt {
            sale_id: sale.id.clone(),
            direction,
            kind,
            rating,
        })
    }

    fn conflict(&self, error: VoteError) -> VoteError {
        self.logger
            .debug_builder("Vote rejected")
            .field("reason", error.to_string())
            .emit();
        error
    }
}

/// Marks a sale busy until dropped.
struct InFlight<'a> {
    set: &'a RefCell<HashSet<SaleId>>,
    sale: SaleId,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a RefCell<HashSet<SaleId>>, sale: &SaleId) -> Option<Self> {
        if !set.borrow_mut().insert(sale.clone()) {
            return None;
        }
        Some(Self {
            set,
            sale: sale.clone(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.borrow_mut().remove(&self.sale);
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn with_timeout<F, T>(after: Duration, future: F) -> Option<Result<T, StoreError>>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(after, future).await.ok()
}

// Spin bounds outbound calls itself and has no timer for us to race against.
#[cfg(target_arch = "wasm32")]
async fn with_timeout<F, T>(_after: Duration, future: F) -> Option<Result<T, StoreError>>
where
    F: Future<Output = Result<T, StoreError>>,
{
    Some(future.await)
}
