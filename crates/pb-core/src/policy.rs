//! Tunable constants of the catalog.

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Time from creation until voting closes
    pub vote_window: Duration,
    /// Time from creation until the listing closes
    pub listing_window: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            vote_window: Duration::days(1),
            listing_window: Duration::days(7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurationPolicy {
    /// How many of the most viewed posts the landing page draws from
    pub candidate_pool_size: usize,
    /// `bestResponsePost` is drawn from this many most-commented candidates
    pub best_response_pool: usize,
    /// Maximum permit/reject gap, in percentage points, for `neckAndNeckPost`
    pub neck_and_neck_margin: u8,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self {
            candidate_pool_size: 50,
            best_response_pool: 5,
            neck_and_neck_margin: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogPolicy {
    pub lifecycle: LifecyclePolicy,
    pub curation: CurationPolicy,
}
