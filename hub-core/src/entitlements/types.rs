//! Resolved entitlement record

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agency::{Agency, ClassificationLevel};

/// What a user may access
///
/// Built once by [`super::PermissionResolver`] and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntitlements {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub groups: BTreeSet<String>,
    pub agencies: BTreeSet<Agency>,
    pub max_classification: ClassificationLevel,
    pub is_admin: bool,
    pub is_reviewer: bool,
    pub resolved_at: DateTime<Utc>,
}

impl UserEntitlements {
    /// Entitlements granting nothing beyond PUBLIC in no agency
    pub fn empty(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            display_name: None,
            groups: BTreeSet::new(),
            agencies: BTreeSet::new(),
            max_classification: ClassificationLevel::Public,
            is_admin: false,
            is_reviewer: false,
            resolved_at: Utc::now(),
        }
    }

    /// Agencies this user may search; admins reach every agency
    pub fn accessible_agencies(&self) -> BTreeSet<Agency> {
        if self.is_admin {
            Agency::ALL.into_iter().collect()
        } else {
            self.agencies.clone()
        }
    }

    pub fn can_access_agency(&self, agency: Agency) -> bool {
        self.is_admin || self.agencies.contains(&agency)
    }

    pub fn can_access_classification(&self, level: ClassificationLevel) -> bool {
        self.is_admin || level.access_level() <= self.max_classification.access_level()
    }

    /// Reviewers and admins may act on review flags
    pub fn can_review(&self) -> bool {
        self.is_admin || self.is_reviewer
    }

    pub fn in_any_group<'a, I>(&self, groups: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        groups.into_iter().any(|group| self.groups.contains(group))
    }
}
