//! Hot/cold ratings for ohmysales.
//!
//! Raw vote counts live in an external vote store; everything shown to a
//! visitor (total, percentage, the "hot" flag, the net score) is derived from
//! those two counts on demand. Each browser or device remembers its own vote
//! per sale in a marker store, which lets a visitor switch sides but never vote
//! twice in the same direction.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_rating::prelude::*;
//!
//! let aggregator = RatingAggregator::new(store, markers, logger);
//! let rating = aggregator.get_rating(&sale.id).await;
//! match aggregator.vote_hot(&sale).await {
//!     Ok(receipt) => println!("{}", receipt.confirmation()),
//!     Err(e) => println!("{}", e.notice()),
//! }
//! ```

mod aggregator;
mod error;
mod marker;
mod rating;
mod store;
mod vote;

pub use aggregator::{RatingAggregator, VoteReceipt, DEFAULT_VOTE_TIMEOUT};
pub use error::{StoreError, VoteError};
pub use marker::{CacheMarkerStore, MemoryMarkerStore, VoteMarkerStore};
pub use rating::{Rating, RatingTone, HOT_MIN_PERCENTAGE, HOT_MIN_VOTES};
pub use store::{MemoryVoteStore, VoteCounts, VoteStore};
pub use vote::{VoteDirection, VoteKind, VoteState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CacheMarkerStore, MemoryMarkerStore, MemoryVoteStore, Rating, RatingAggregator,
        RatingTone, StoreError, VoteCounts, VoteDirection, VoteError, VoteKind,
        VoteMarkerStore, VoteReceipt, VoteState, VoteStore,
    };
}
