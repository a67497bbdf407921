//! Agencies and classification levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// A participating agency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Agency {
    Dmv,
    Dol,
    Doh,
    Dot,
    Doe,
}

impl Agency {
    /// Every agency, in a stable order
    pub const ALL: [Agency; 5] = [
        Agency::Dmv,
        Agency::Dol,
        Agency::Doh,
        Agency::Dot,
        Agency::Doe,
    ];

    /// Short code, as used in group names and on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dmv => "DMV",
            Self::Dol => "DOL",
            Self::Doh => "DOH",
            Self::Dot => "DOT",
            Self::Doe => "DOE",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Dmv => "Department of Motor Vehicles",
            Self::Dol => "Department of Labor",
            Self::Doh => "Department of Health",
            Self::Dot => "Department of Transportation",
            Self::Doe => "Department of Education",
        }
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Agency {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Agency::ALL
            .into_iter()
            .find(|agency| agency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HubError::Validation(format!("unknown agency: {}", s)))
    }
}

/// Document sensitivity tier
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// [`ClassificationLevel::access_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassificationLevel {
    Public,
    Internal,
    Restricted,
    Confidential,
}

impl ClassificationLevel {
    pub const ALL: [ClassificationLevel; 4] = [
        ClassificationLevel::Public,
        ClassificationLevel::Internal,
        ClassificationLevel::Restricted,
        ClassificationLevel::Confidential,
    ];

    /// Integer access level used for comparisons
    pub fn access_level(&self) -> u8 {
        match self {
            Self::Public => 1,
            Self::Internal => 2,
            Self::Restricted => 3,
            Self::Confidential => 4,
        }
    }

    /// All levels at or below this one
    pub fn at_or_below(&self) -> impl Iterator<Item = ClassificationLevel> + '_ {
        Self::ALL
            .into_iter()
            .filter(|level| level.access_level() <= self.access_level())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Internal => "INTERNAL",
            Self::Restricted => "RESTRICTED",
            Self::Confidential => "CONFIDENTIAL",
        }
    }
}

impl fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationLevel {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassificationLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HubError::Validation(format!("unknown classification: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agency_parse_is_case_insensitive() {
        assert_eq!("dmv".parse::<Agency>().unwrap(), Agency::Dmv);
        assert_eq!(" DoH ".parse::<Agency>().unwrap(), Agency::Doh);
    }

    #[test]
    fn agency_parse_rejects_unknown_code() {
        let err = "FBI".parse::<Agency>().unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
    }

    #[test]
    fn agency_serializes_as_code() {
        let json = serde_json::to_string(&Agency::Dol).unwrap();
        assert_eq!(json, "\"DOL\"");
        let parsed: Agency = serde_json::from_str("\"DOT\"").unwrap();
        assert_eq!(parsed, Agency::Dot);
    }

    #[test]
    fn agency_full_names() {
        assert_eq!(Agency::Dmv.full_name(), "Department of Motor Vehicles");
        assert_eq!(Agency::Doe.full_name(), "Department of Education");
    }

    #[test]
    fn classification_order_matches_access_level() {
        for pair in ClassificationLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].access_level() < pair[1].access_level());
        }
    }

    #[test]
    fn at_or_below_internal() {
        let levels: Vec<_> = ClassificationLevel::Internal.at_or_below().collect();
        assert_eq!(
            levels,
            vec![ClassificationLevel::Public, ClassificationLevel::Internal]
        );
    }

    #[test]
    fn classification_roundtrips_through_str() {
        for level in ClassificationLevel::ALL {
            assert_eq!(level.as_str().parse::<ClassificationLevel>().unwrap(), level);
        }
    }
}
