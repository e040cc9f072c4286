//! Dependency tagging for semantic categorization.

use std::time::Duration;

/// Well-known outbound dependencies with semantic meaning.
///
/// Each tag carries a default timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Sale listing reads.
    Sales,
    /// Hot/cold count reads.
    Ratings,
    /// Vote-casting RPC calls.
    Votes,
    /// Third-party prerender service.
    Prerender,
    /// The application origin behind the edge proxy.
    Origin,
}

impl DependencyTag {
    /// Get the default timeout for this dependency type.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Sales => Duration::from_secs(5),
            Self::Ratings => Duration::from_secs(3),
            Self::Votes => Duration::from_secs(10),
            Self::Prerender => Duration::from_secs(20),
            Self::Origin => Duration::from_secs(30),
        }
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Ratings => "ratings",
            Self::Votes => "votes",
            Self::Prerender => "prerender",
            Self::Origin => "origin",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
