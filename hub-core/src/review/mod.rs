//! Human review workflow for withheld queries

mod gate;
mod store;
mod types;

pub use gate::{APPROVED_MESSAGE, FlagDecision, PENDING_REVIEW_STATUS, ReviewGate};
pub use store::{MemoryReviewStore, ReviewStore};
pub use types::{
    PendingReviewNotice, ReviewDecision, ReviewFlag, ReviewStats, ReviewStatus, ReviewTransition,
    ReviewView, SubmitterStatus,
};
