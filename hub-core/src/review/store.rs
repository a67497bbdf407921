//! Review flag storage

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ReviewFlag, ReviewStatus, ReviewTransition};
use crate::error::{HubError, HubResult};

/// Persistence for review flags
///
/// `transition` must be an atomic compare-and-set from `Pending`: of two
/// concurrent transitions on one flag exactly one commits and the other
/// fails with [`HubError::InvalidTransition`].
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, flag: ReviewFlag) -> HubResult<()>;

    async fn get(&self, id: Uuid) -> HubResult<Option<ReviewFlag>>;

    async fn transition(&self, id: Uuid, transition: ReviewTransition) -> HubResult<ReviewFlag>;

    /// Flags in submission order, optionally restricted to one status
    async fn list(&self, status: Option<ReviewStatus>) -> HubResult<Vec<ReviewFlag>>;
}

#[derive(Default)]
pub struct MemoryReviewStore {
    flags: RwLock<HashMap<Uuid, ReviewFlag>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn insert(&self, flag: ReviewFlag) -> HubResult<()> {
        self.flags.write().await.insert(flag.id, flag);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> HubResult<Option<ReviewFlag>> {
        Ok(self.flags.read().await.get(&id).cloned())
    }

    async fn transition(&self, id: Uuid, transition: ReviewTransition) -> HubResult<ReviewFlag> {
        let mut flags = self.flags.write().await;
        let flag = flags.get_mut(&id).ok_or(HubError::UnknownReviewFlag(id))?;

        if flag.status != ReviewStatus::Pending {
            return Err(HubError::InvalidTransition {
                id,
                from: flag.status,
                to: transition.status,
            });
        }

        flag.status = transition.status;
        flag.reviewer_id = Some(transition.reviewer_id);
        flag.reviewer_notes = transition.reviewer_notes;
        flag.modified_response = transition.modified_response;
        flag.reviewed_at = Some(transition.reviewed_at);
        Ok(flag.clone())
    }

    async fn list(&self, status: Option<ReviewStatus>) -> HubResult<Vec<ReviewFlag>> {
        let flags = self.flags.read().await;
        let mut matching: Vec<ReviewFlag> = flags
            .values()
            .filter(|flag| status.is_none_or(|s| flag.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|flag| flag.flagged_at);
        Ok(matching)
    }
}
