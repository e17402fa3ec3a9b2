//! proposal-board/crates/pb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for the proposal board:
//! lifecycle evaluation, vote ratios, listing order and landing curation,
//! orchestrated by [`PostCatalog`] over pluggable stores.

pub mod catalog;
pub mod curation;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod ratio;
pub mod sorting;
pub mod system;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exporting for easier access in other crates
pub use catalog::{CatalogPorts, Landing, PostCatalog};
pub use curation::{Candidate, CuratedSlots, LandingLabel};
pub use error::*;
pub use models::*;
pub use policy::*;
pub use ratio::{ratio, VoteRatio};
pub use sorting::SortCriterion;
pub use system::{SystemClock, ThreadRandom};
pub use traits::*;
