//! Ratings derived from raw vote counts.

use serde::{Serialize, Serializer};

use crate::store::VoteCounts;

/// Hot votes needed before a sale can be flagged hot.
pub const HOT_MIN_VOTES: u32 = 5;

/// Share of hot votes, in percent, needed before a sale can be flagged hot.
pub const HOT_MIN_PERCENTAGE: f64 = 70.0;

/// Colour of the score badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingTone {
    Hot,
    Cold,
    Neutral,
}

/// Display-ready rating of one sale.
///
/// Only the two counts are held; every other attribute is computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rating {
    counts: VoteCounts,
}

impl Rating {
    pub fn from_counts(counts: VoteCounts) -> Self {
        Self { counts }
    }

    pub fn new(hot_votes: u32, cold_votes: u32) -> Self {
        Self::from_counts(VoteCounts {
            hot_votes,
            cold_votes,
        })
    }

    pub fn counts(&self) -> VoteCounts {
        self.counts
    }

    pub fn hot_votes(&self) -> u32 {
        self.counts.hot_votes
    }

    pub fn cold_votes(&self) -> u32 {
        self.counts.cold_votes
    }

    pub fn total_votes(&self) -> u64 {
        self.counts.hot_votes as u64 + self.counts.cold_votes as u64
    }

    /// Hot share in percent; 0 when nobody voted.
    pub fn hot_percentage(&self) -> f64 {
        match self.total_votes() {
            0 => 0.0,
            total => self.counts.hot_votes as f64 / total as f64 * 100.0,
        }
    }

    /// Trending hot: at least five hot votes and at least 70% of all votes.
    pub fn is_hot(&self) -> bool {
        self.counts.hot_votes >= HOT_MIN_VOTES && self.hot_percentage() >= HOT_MIN_PERCENTAGE
    }

    /// Net score, hot minus cold.
    pub fn score(&self) -> i64 {
        self.counts.hot_votes as i64 - self.counts.cold_votes as i64
    }

    /// Score as shown on a sale card: "+3", "-2", "0", or "—" without votes.
    pub fn score_label(&self) -> String {
        match self.score() {
            _ if self.total_votes() == 0 => "—".to_string(),
            score if score > 0 => format!("+{}", score),
            score => score.to_string(),
        }
    }

    pub fn tone(&self) -> RatingTone {
        match self.score() {
            s if s > 0 => RatingTone::Hot,
            s if s < 0 => RatingTone::Cold,
            _ => RatingTone::Neutral,
        }
    }
}

impl From<VoteCounts> for Rating {
    fn from(counts: VoteCounts) -> Self {
        Self::from_counts(counts)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct RatingView {
            hot_votes: u32,
            cold_votes: u32,
            total_votes: u64,
            hot_percentage: f64,
            is_hot: bool,
            score: i64,
        }

        RatingView {
            hot_votes: self.hot_votes(),
            cold_votes: self.cold_votes(),
            total_votes: self.total_votes(),
            hot_percentage: self.hot_percentage(),
            is_hot: self.is_hot(),
            score: self.score(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hot_boundaries() {
        let rating = Rating::new(5, 2);
        assert!((rating.hot_percentage() - 71.428).abs() < 0.01);
        assert!(rating.is_hot());

        // 100% but below the vote floor
        assert!(!Rating::new(4, 0).is_hot());
        // exactly 70%
        assert!(Rating::new(7, 3).is_hot());
        assert!(!Rating::new(6, 3).is_hot());
    }

    #[test]
    fn test_zero_votes() {
        let rating = Rating::default();
        assert_eq!(rating.total_votes(), 0);
        assert_eq!(rating.hot_percentage(), 0.0);
        assert!(!rating.is_hot());
        assert_eq!(rating.score_label(), "—");
        assert_eq!(rating.tone(), RatingTone::Neutral);
    }

    #[test]
    fn test_score_label_and_tone() {
        assert_eq!(Rating::new(5, 2).score_label(), "+3");
        assert_eq!(Rating::new(1, 4).score_label(), "-3");
        assert_eq!(Rating::new(2, 2).score_label(), "0");
        assert_eq!(Rating::new(1, 4).tone(), RatingTone::Cold);
        assert_eq!(Rating::new(2, 2).tone(), RatingTone::Neutral);
    }

    #[test]
    fn test_serializes_derived_fields() {
        let value = serde_json::to_value(Rating::new(5, 0)).unwrap();
        assert_eq!(value["total_votes"], 5);
        assert_eq!(value["hot_percentage"], 100.0);
        assert_eq!(value["is_hot"], true);
        assert_eq!(value["score"], 5);
    }
}
