//! Two-layer security trimming
//!
//! [`SecurityFilter::build_predicate`] produces the advisory query-time filter
//! for the backend. [`SecurityFilter::filter_results`] re-checks every returned
//! item against [`SecurityFilter::is_visible`], which evaluates the visibility
//! rule directly and never consults the predicate or the backend.

use std::collections::BTreeSet;

use tracing::warn;

use super::Predicate;
use crate::agency::ClassificationLevel;
use crate::document::{AccessLabel, Labeled};
use crate::entitlements::UserEntitlements;

#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityFilter;

impl SecurityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Query-time filter for the backend; admins are unrestricted
    pub fn build_predicate(&self, entitlements: &UserEntitlements) -> Predicate {
        if entitlements.is_admin {
            return Predicate::True;
        }

        let levels: BTreeSet<ClassificationLevel> =
            entitlements.max_classification.at_or_below().collect();

        Predicate::and(vec![
            Predicate::AgencyIn {
                agencies: entitlements.agencies.clone(),
            },
            Predicate::ClassificationIn { levels },
            Predicate::or(vec![
                Predicate::ClassificationIs {
                    level: ClassificationLevel::Public,
                },
                Predicate::GroupsIntersect {
                    groups: entitlements.groups.clone(),
                },
            ]),
        ])
    }

    /// Whether a user may see a document with this label
    pub fn is_visible(&self, label: &AccessLabel, entitlements: &UserEntitlements) -> bool {
        if entitlements.is_admin {
            return true;
        }

        entitlements.agencies.contains(&label.agency)
            && label.classification.access_level()
                <= entitlements.max_classification.access_level()
            && (label.classification == ClassificationLevel::Public
                || entitlements.in_any_group(&label.allowed_groups))
    }

    /// Drop every item the user may not see, whatever the backend enforced
    pub fn filter_results<T: Labeled>(
        &self,
        results: Vec<T>,
        entitlements: &UserEntitlements,
    ) -> Vec<T> {
        let before = results.len();
        let kept: Vec<T> = results
            .into_iter()
            .filter(|item| self.is_visible(item.label(), entitlements))
            .collect();

        let dropped = before - kept.len();
        if dropped > 0 {
            warn!(
                user_id = %entitlements.user_id,
                dropped,
                "Backend returned results outside the caller's entitlements"
            );
        }
        kept
    }
}
