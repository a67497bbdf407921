//! Structured access predicate
//!
//! Handed to the search backend as data; each backend adapter translates it
//! into its own query language. The in-memory backend evaluates it directly
//! through [`Predicate::matches`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::agency::{Agency, ClassificationLevel};
use crate::document::AccessLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// No restriction
    True,
    And { clauses: Vec<Predicate> },
    Or { clauses: Vec<Predicate> },
    AgencyIn { agencies: BTreeSet<Agency> },
    ClassificationIn { levels: BTreeSet<ClassificationLevel> },
    ClassificationIs { level: ClassificationLevel },
    /// Document's allowed groups share at least one entry with these
    GroupsIntersect { groups: BTreeSet<String> },
}

impl Predicate {
    pub fn and(clauses: Vec<Predicate>) -> Self {
        Self::And { clauses }
    }

    pub fn or(clauses: Vec<Predicate>) -> Self {
        Self::Or { clauses }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Evaluate against a document label
    pub fn matches(&self, label: &AccessLabel) -> bool {
        match self {
            Self::True => true,
            Self::And { clauses } => clauses.iter().all(|clause| clause.matches(label)),
            Self::Or { clauses } => clauses.iter().any(|clause| clause.matches(label)),
            Self::AgencyIn { agencies } => agencies.contains(&label.agency),
            Self::ClassificationIn { levels } => levels.contains(&label.classification),
            Self::ClassificationIs { level } => label.classification == *level,
            Self::GroupsIntersect { groups } => {
                !groups.is_disjoint(&label.allowed_groups)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(agency: Agency, level: ClassificationLevel, groups: &[&str]) -> AccessLabel {
        AccessLabel {
            agency,
            classification: level,
            allowed_groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_true_matches_everything() {
        let l = label(Agency::Doh, ClassificationLevel::Confidential, &[]);
        assert!(Predicate::True.matches(&l));
        assert!(Predicate::True.is_unrestricted());
    }

    #[test]
    fn test_agency_in() {
        let p = Predicate::AgencyIn {
            agencies: BTreeSet::from([Agency::Dmv]),
        };
        assert!(p.matches(&label(Agency::Dmv, ClassificationLevel::Public, &[])));
        assert!(!p.matches(&label(Agency::Dol, ClassificationLevel::Public, &[])));
    }

    #[test]
    fn test_groups_intersect() {
        let p = Predicate::GroupsIntersect {
            groups: BTreeSet::from(["DMV_Staff".to_string()]),
        };
        assert!(p.matches(&label(
            Agency::Dmv,
            ClassificationLevel::Internal,
            &["DMV_Staff", "DMV_Managers"]
        )));
        assert!(!p.matches(&label(Agency::Dmv, ClassificationLevel::Internal, &[])));
    }

    #[test]
    fn test_and_or_composition() {
        let p = Predicate::and(vec![
            Predicate::AgencyIn {
                agencies: BTreeSet::from([Agency::Dmv]),
            },
            Predicate::or(vec![
                Predicate::ClassificationIs {
                    level: ClassificationLevel::Public,
                },
                Predicate::GroupsIntersect {
                    groups: BTreeSet::from(["DMV_Staff".to_string()]),
                },
            ]),
        ]);

        assert!(p.matches(&label(Agency::Dmv, ClassificationLevel::Public, &[])));
        assert!(p.matches(&label(
            Agency::Dmv,
            ClassificationLevel::Internal,
            &["DMV_Staff"]
        )));
        assert!(!p.matches(&label(Agency::Dmv, ClassificationLevel::Internal, &[])));
    }

    #[test]
    fn test_serializes_as_tagged_data() {
        let p = Predicate::ClassificationIs {
            level: ClassificationLevel::Public,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["op"], "classification_is");
        assert_eq!(json["level"], "PUBLIC");
    }
}
