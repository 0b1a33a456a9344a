use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Note categories. Each one is also a subdirectory of `notes/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    People,
    Puzzles,
    Rooms,
    Items,
    Lore,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Investigation status of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Complete,
    NeedsInvestigation,
    ActiveInvestigation,
    Theory,
    Confirmed,
}

/// Shared behaviour of the closed string sets stored in frontmatter.
pub trait Choice: Sized + Copy + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn parse_choice(value: &str) -> Result<Self, VaultError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| {
                VaultError::validation(
                    Self::FIELD,
                    format!("'{}' must be one of: {}", value, Self::allowed()),
                )
            })
    }
}

impl Choice for Category {
    const FIELD: &'static str = "category";
    const ALL: &'static [Self] = &[
        Self::People,
        Self::Puzzles,
        Self::Rooms,
        Self::Items,
        Self::Lore,
        Self::General,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Puzzles => "puzzles",
            Self::Rooms => "rooms",
            Self::Items => "items",
            Self::Lore => "lore",
            Self::General => "general",
        }
    }
}

impl Choice for Confidence {
    const FIELD: &'static str = "confidence";
    const ALL: &'static [Self] = &[Self::High, Self::Medium, Self::Low];

    fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Choice for Status {
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[
        Self::Complete,
        Self::NeedsInvestigation,
        Self::ActiveInvestigation,
        Self::Theory,
        Self::Confirmed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::NeedsInvestigation => "needs_investigation",
            Self::ActiveInvestigation => "active_investigation",
            Self::Theory => "theory",
            Self::Confirmed => "confirmed",
        }
    }
}

macro_rules! impl_choice_traits {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = VaultError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse_choice(s)
                }
            }
        )*
    };
}

impl_choice_traits!(Category, Confidence, Status);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("lore".parse::<Category>().unwrap(), Category::Lore);
        assert_eq!("medium".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert_eq!(
            "needs_investigation".parse::<Status>().unwrap(),
            Status::NeedsInvestigation
        );
    }

    #[test]
    fn test_rejection_names_field_and_allowed_values() {
        let err = "person".parse::<Category>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("category"));
        assert!(message.contains("people, puzzles, rooms, items, lore, general"));

        let err = "certain".parse::<Confidence>().unwrap_err();
        assert!(matches!(err, VaultError::Validation { ref field, .. } if field == "confidence"));
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for status in Status::ALL {
            let yaml = serde_yaml::to_string(status).unwrap();
            assert_eq!(yaml.trim(), status.as_str());
        }
    }
}
