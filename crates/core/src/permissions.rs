// crates/core/src/permissions.rs

//! Section-level access checks (machtigingen).

use std::collections::{BTreeMap, BTreeSet};

/// UI sections gated on group membership.
pub mod sections {
    pub const BEHEER_CENTRUM: &str = "BeheerCentrum";
    pub const ADMIN_INSTELLINGEN: &str = "AdminInstellingen";
    pub const BEHANDELEN: &str = "Behandelen";
    pub const ZITTINGSVRIJ: &str = "Zittingsvrij";
    pub const RAPPORTAGE: &str = "Rapportage";
}

const SHAREPOINT_BEHEER: &str = "1. Sharepoint beheer";
const MULDER_MT: &str = "1.1. Mulder MT";
const SENIOREN: &str = "2.3. Senioren beoordelen";
const ROOSTERAARS: &str = "2.6 Roosteraars";
const ZITTINGSPLANNERS: &str = "2.8 Zittingsplanners";

/// Section name -> groups that may use it.
#[derive(Debug, Clone, Default)]
pub struct PermissionRules {
    rules: BTreeMap<String, Vec<String>>,
}

impl PermissionRules {
    /// No rules: every section is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::empty()
            .with_rule(sections::BEHEER_CENTRUM, [SHAREPOINT_BEHEER, MULDER_MT, ROOSTERAARS])
            .with_rule(sections::ADMIN_INSTELLINGEN, [SHAREPOINT_BEHEER])
            .with_rule(
                sections::BEHANDELEN,
                [SHAREPOINT_BEHEER, MULDER_MT, SENIOREN, ROOSTERAARS],
            )
            .with_rule(
                sections::ZITTINGSVRIJ,
                [SHAREPOINT_BEHEER, ROOSTERAARS, ZITTINGSPLANNERS],
            )
            .with_rule(sections::RAPPORTAGE, [SHAREPOINT_BEHEER, MULDER_MT])
    }

    pub fn with_rule<I, S>(mut self, section: &str, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .insert(section.to_string(), groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn required_groups(&self, section: &str) -> Option<&[String]> {
        self.rules.get(section).map(Vec::as_slice)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// True iff `section` has at least one configured group and the user is in
    /// one of them. Unknown sections are denied.
    pub fn is_allowed(&self, section: &str, user_groups: &BTreeSet<String>) -> bool {
        has_access(self.required_groups(section).unwrap_or(&[]), user_groups)
    }
}

/// Group names compare case-insensitively, including non-ASCII letters.
pub fn same_group(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive intersection test. An empty requirement list denies.
pub fn has_access(required: &[String], user_groups: &BTreeSet<String>) -> bool {
    required
        .iter()
        .any(|needed| user_groups.iter().any(|have| same_group(have, needed)))
}
