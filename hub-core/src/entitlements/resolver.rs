//! Group name → entitlement resolution
//!
//! Group names are split into normalized tokens and each token is looked up
//! in a fixed grant table. Grants from every group are folded with set union
//! and max, so the result does not depend on group order and adding groups
//! never lowers privilege.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::{Identity, UserEntitlements};
use crate::agency::{Agency, ClassificationLevel};
use crate::clock::{Clock, SystemClock};

/// What a single token grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Access to one agency
    Agency(Agency),
    /// Access to every agency
    AllAgencies,
    /// Classification ceiling implied by a role
    Ceiling(ClassificationLevel),
    /// May act on review flags
    Reviewer,
}

/// Accumulated grants for one user
#[derive(Debug, Clone, PartialEq, Eq)]
struct GrantSet {
    agencies: BTreeSet<Agency>,
    ceiling: ClassificationLevel,
    reviewer: bool,
}

impl GrantSet {
    fn new() -> Self {
        Self {
            agencies: BTreeSet::new(),
            ceiling: ClassificationLevel::Public,
            reviewer: false,
        }
    }

    fn apply(&mut self, grant: Grant) {
        match grant {
            Grant::Agency(agency) => {
                self.agencies.insert(agency);
            }
            Grant::AllAgencies => self.agencies.extend(Agency::ALL),
            Grant::Ceiling(level) => self.ceiling = self.ceiling.max(level),
            Grant::Reviewer => self.reviewer = true,
        }
    }
}

/// Turns directory groups into [`UserEntitlements`]
pub struct PermissionResolver {
    table: HashMap<String, Grant>,
    clock: Arc<dyn Clock>,
}

impl PermissionResolver {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: default_grant_table(),
            clock,
        }
    }

    /// Grant for an exact normalized token or two-token phrase, if any
    pub fn lookup(&self, token: &str) -> Option<Grant> {
        self.table.get(token).copied()
    }

    /// Resolve raw group names into an entitlement record
    pub fn resolve(
        &self,
        user_id: &str,
        email: &str,
        groups: &[String],
        display_name: Option<&str>,
    ) -> UserEntitlements {
        let mut grants = GrantSet::new();
        for group in groups {
            for grant in self.grants_for_group(group) {
                grants.apply(grant);
            }
        }

        let is_admin = grants.ceiling == ClassificationLevel::Confidential;

        debug!(
            user_id,
            agencies = grants.agencies.len(),
            max_classification = %grants.ceiling,
            is_admin,
            is_reviewer = grants.reviewer,
            "Resolved entitlements"
        );

        UserEntitlements {
            user_id: user_id.to_string(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            groups: groups.iter().cloned().collect(),
            agencies: grants.agencies,
            max_classification: grants.ceiling,
            is_admin,
            is_reviewer: grants.reviewer,
            resolved_at: self.clock.now(),
        }
    }

    /// Resolve an [`Identity`]
    pub fn resolve_identity(&self, identity: &Identity) -> UserEntitlements {
        self.resolve(
            &identity.user_id,
            &identity.email,
            &identity.groups,
            identity.display_name.as_deref(),
        )
    }

    /// Every grant implied by one group name
    pub fn grants_for_group(&self, group: &str) -> Vec<Grant> {
        let tokens = tokenize(group);
        let phrases = tokens
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]));

        tokens
            .iter()
            .cloned()
            .chain(phrases)
            .filter_map(|token| self.lookup(&token))
            .collect()
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase and split on separators commonly used in directory group names
pub fn tokenize(group: &str) -> Vec<String> {
    group
        .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | '.' | ':' | '/' | '\\'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn default_grant_table() -> HashMap<String, Grant> {
    let mut table = HashMap::new();

    for agency in Agency::ALL {
        table.insert(agency.code().to_lowercase(), Grant::Agency(agency));
    }
    table.insert("allagencies".to_string(), Grant::AllAgencies);
    table.insert("all agencies".to_string(), Grant::AllAgencies);

    let roles = [
        ("admin", ClassificationLevel::Confidential),
        ("admins", ClassificationLevel::Confidential),
        ("administrator", ClassificationLevel::Confidential),
        ("administrators", ClassificationLevel::Confidential),
        ("manager", ClassificationLevel::Restricted),
        ("managers", ClassificationLevel::Restricted),
        ("staff", ClassificationLevel::Internal),
    ];
    for (token, level) in roles {
        table.insert(token.to_string(), Grant::Ceiling(level));
    }

    for token in ["reviewer", "reviewers", "compliance"] {
        table.insert(token.to_string(), Grant::Reviewer);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(names: &[&str]) -> UserEntitlements {
        PermissionResolver::new().resolve("u-1", "u1@example.gov", &groups(names), None)
    }

    #[test]
    fn test_staff_group() {
        let e = resolve(&["DMV_Staff"]);
        assert_eq!(e.agencies, BTreeSet::from([Agency::Dmv]));
        assert_eq!(e.max_classification, ClassificationLevel::Internal);
        assert!(!e.is_admin);
        assert!(!e.is_reviewer);
    }

    #[test]
    fn test_manager_group() {
        let e = resolve(&["DOL-Managers"]);
        assert_eq!(e.agencies, BTreeSet::from([Agency::Dol]));
        assert_eq!(e.max_classification, ClassificationLevel::Restricted);
    }

    #[test]
    fn test_all_agencies_admin() {
        let e = resolve(&["AllAgencies_Admin"]);
        assert_eq!(e.agencies.len(), Agency::ALL.len());
        assert_eq!(e.max_classification, ClassificationLevel::Confidential);
        assert!(e.is_admin);
    }

    #[test]
    fn test_all_agencies_with_separator() {
        let e = resolve(&["All_Agencies_Staff"]);
        assert_eq!(e.agencies.len(), Agency::ALL.len());
        assert_eq!(e.max_classification, ClassificationLevel::Internal);
    }

    #[test]
    fn test_reviewer_groups() {
        assert!(resolve(&["Compliance_Team"]).is_reviewer);
        assert!(resolve(&["DOH Reviewers"]).is_reviewer);
    }

    #[test]
    fn test_case_insensitive() {
        let e = resolve(&["dmv_STAFF"]);
        assert_eq!(e.agencies, BTreeSet::from([Agency::Dmv]));
        assert_eq!(e.max_classification, ClassificationLevel::Internal);
    }

    #[test]
    fn test_exact_tokens_do_not_match_lookalikes() {
        // "dmvx" and "staffing" are not table entries
        let e = resolve(&["DMVX_Staffing"]);
        assert!(e.agencies.is_empty());
        assert_eq!(e.max_classification, ClassificationLevel::Public);
    }

    #[test]
    fn test_unmatched_groups_contribute_nothing() {
        let e = resolve(&["Everyone", "Parking_Permit_Holders"]);
        assert!(e.agencies.is_empty());
        assert_eq!(e.max_classification, ClassificationLevel::Public);
        assert!(!e.is_admin);
        assert!(!e.is_reviewer);
    }

    #[test]
    fn test_max_of_ceilings_wins() {
        let e = resolve(&["DMV_Staff", "DOL_Managers"]);
        assert_eq!(e.agencies, BTreeSet::from([Agency::Dmv, Agency::Dol]));
        assert_eq!(e.max_classification, ClassificationLevel::Restricted);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = resolve(&["DMV_Staff", "DOH_Admin", "Compliance"]);
        let b = resolve(&["Compliance", "DOH_Admin", "DMV_Staff"]);
        assert_eq!(a.agencies, b.agencies);
        assert_eq!(a.max_classification, b.max_classification);
        assert_eq!(a.is_admin, b.is_admin);
        assert_eq!(a.is_reviewer, b.is_reviewer);
    }

    #[test]
    fn test_resolved_at_uses_clock() {
        let clock = Arc::new(crate::clock::ManualClock::default());
        let resolver = PermissionResolver::with_clock(clock.clone());
        let e = resolver.resolve("u", "u@example.gov", &[], None);
        assert_eq!(e.resolved_at, clock.now());
    }

    #[test]
    fn test_resolve_identity_carries_display_name() {
        let identity = Identity::new("u-2", "u2@example.gov")
            .with_name("Pat")
            .with_group("DOT_Staff");
        let e = PermissionResolver::new().resolve_identity(&identity);
        assert_eq!(e.display_name.as_deref(), Some("Pat"));
        assert!(e.groups.contains("DOT_Staff"));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("DMV_Staff"), vec!["dmv", "staff"]);
        assert_eq!(tokenize("  DOL - Managers "), vec!["dol", "managers"]);
        assert_eq!(tokenize("ou:doh/admins"), vec!["ou", "doh", "admins"]);
    }
}
