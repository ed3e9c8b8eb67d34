//! Fixed role mapping between display codes and numeric feature values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playing role of an entity. The discriminant is the numeric feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "GK")]
    Goalkeeper = 1,
    #[serde(rename = "DEF")]
    Defender = 2,
    #[serde(rename = "MID")]
    Midfielder = 3,
    #[serde(rename = "FWD")]
    Forward = 4,
    #[serde(rename = "AM")]
    AttackingMidfielder = 5,
}

impl Role {
    /// All roles in code order.
    pub const ALL: [Role; 5] = [
        Role::Goalkeeper,
        Role::Defender,
        Role::Midfielder,
        Role::Forward,
        Role::AttackingMidfielder,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DEF",
            Role::Midfielder => "MID",
            Role::Forward => "FWD",
            Role::AttackingMidfielder => "AM",
        }
    }

    /// Parse a display label. Surrounding whitespace is ignored; matching is
    /// case-sensitive.
    pub fn from_label(label: &str) -> Option<Role> {
        let label = label.trim();
        Role::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn from_code(code: i64) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_fixed_codes() {
        assert_eq!(Role::from_label("GK").map(Role::code), Some(1));
        assert_eq!(Role::from_label("DEF").map(Role::code), Some(2));
        assert_eq!(Role::from_label("MID").map(Role::code), Some(3));
        assert_eq!(Role::from_label("FWD").map(Role::code), Some(4));
        assert_eq!(Role::from_label("AM").map(Role::code), Some(5));
    }

    #[test]
    fn codes_round_trip_to_labels() {
        for role in Role::ALL {
            assert_eq!(Role::from_code(role.code()), Some(role));
            assert_eq!(Role::from_label(role.label()), Some(role));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(Role::from_label("GKP"), None);
        assert_eq!(Role::from_label("fwd"), None);
        assert_eq!(Role::from_code(0), None);
        assert_eq!(Role::from_code(6), None);
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(Role::from_label(" MID "), Some(Role::Midfielder));
    }
}
