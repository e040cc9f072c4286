//! Rating and voting errors.

use std::time::Duration;

use sales_core::SaleId;
use thiserror::Error;

use crate::vote::VoteDirection;

/// Failures of the vote store or the local marker store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Vote store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error.
    #[error("Vote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with something that is not a count pair.
    #[error("Unexpected vote store response: {0}")]
    Malformed(String),

    /// The local marker store failed.
    #[error("Vote marker store failed: {0}")]
    Marker(String),
}

/// Why a vote was not counted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoteError {
    #[error("Sale {0} has expired")]
    SaleExpired(SaleId),

    #[error("Already voted {direction} on sale {sale}")]
    AlreadyVoted {
        sale: SaleId,
        direction: VoteDirection,
    },

    /// Another vote for the same sale is still in flight.
    #[error("A vote on sale {0} is already in progress")]
    Busy(SaleId),

    #[error("Vote on sale {sale} timed out after {after:?}")]
    Timeout { sale: SaleId, after: Duration },

    #[error("Vote failed: {0}")]
    Remote(#[from] StoreError),
}

impl VoteError {
    /// Rejected locally before any store call; a notice, not a system error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::SaleExpired(_) | Self::AlreadyVoted { .. })
    }

    /// Short German notice for the visitor.
    pub fn notice(&self) -> String {
        match self {
            Self::SaleExpired(_) => "Dieser Sale ist abgelaufen".to_string(),
            Self::AlreadyVoted { direction, .. } => {
                format!("Du hast bereits {} gevotet!", direction)
            }
            Self::Busy(_) => "Deine Stimme wird gerade gezählt".to_string(),
            Self::Timeout { .. } | Self::Remote(_) => "Fehler beim Abstimmen".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts() {
        let sale = SaleId::new("s1");
        assert!(VoteError::SaleExpired(sale.clone()).is_conflict());
        assert!(VoteError::AlreadyVoted {
            sale: sale.clone(),
            direction: VoteDirection::Hot
        }
        .is_conflict());
        assert!(!VoteError::Busy(sale.clone()).is_conflict());
        assert!(!VoteError::Remote(StoreError::Unavailable("down".into())).is_conflict());
    }

    #[test]
    fn test_notices() {
        let sale = SaleId::new("s1");
        assert_eq!(
            VoteError::AlreadyVoted {
                sale: sale.clone(),
                direction: VoteDirection::Cold
            }
            .notice(),
            "Du hast bereits cold gevotet!"
        );
        assert_eq!(VoteError::SaleExpired(sale.clone()).notice(), "Dieser Sale ist abgelaufen");
        assert_eq!(
            VoteError::Timeout {
                sale,
                after: Duration::from_secs(10)
            }
            .notice(),
            "Fehler beim Abstimmen"
        );
    }
}
