//! Vote directions and the per-sale vote state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which way a visitor voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Hot,
    Cold,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Hot => Self::Cold,
            Self::Cold => Self::Hot,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Self::Hot),
            "cold" => Ok(Self::Cold),
            other => Err(format!("expected hot or cold, got {:?}", other)),
        }
    }
}

/// A visitor's vote on one sale.
///
/// There is no way back to `Unvoted` once a vote was cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    #[default]
    Unvoted,
    VotedHot,
    VotedCold,
}

/// Whether a vote was the first one or replaced the opposite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    Fresh,
    Switch,
}

impl VoteState {
    pub fn direction(&self) -> Option<VoteDirection> {
        match self {
            Self::Unvoted => None,
            Self::VotedHot => Some(VoteDirection::Hot),
            Self::VotedCold => Some(VoteDirection::Cold),
        }
    }

    /// State after voting `direction`, or `None` if that vote is already cast.
    pub fn transition(&self, direction: VoteDirection) -> Option<(VoteState, VoteKind)> {
        match self.direction() {
            Some(current) if current == direction => None,
            Some(_) => Some((direction.into(), VoteKind::Switch)),
            None => Some((direction.into(), VoteKind::Fresh)),
        }
    }
}

impl From<VoteDirection> for VoteState {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Hot => Self::VotedHot,
            VoteDirection::Cold => Self::VotedCold,
        }
    }
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(direction: Option<VoteDirection>) -> Self {
        direction.map(Self::from).unwrap_or(Self::Unvoted)
    }
}
