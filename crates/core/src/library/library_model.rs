//! Library content domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{Error, ValidationError};

/// Kind of library content managed by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LibraryContentKind {
    World,
    Campaign,
    Adventure,
    Encounter,
    Asset,
}

impl LibraryContentKind {
    pub const ALL: [LibraryContentKind; 5] = [
        LibraryContentKind::World,
        LibraryContentKind::Campaign,
        LibraryContentKind::Adventure,
        LibraryContentKind::Encounter,
        LibraryContentKind::Asset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryContentKind::World => "World",
            LibraryContentKind::Campaign => "Campaign",
            LibraryContentKind::Adventure => "Adventure",
            LibraryContentKind::Encounter => "Encounter",
            LibraryContentKind::Asset => "Asset",
        }
    }

    /// Plural path segment used by the admin API (`worlds`, `campaigns`, ...).
    pub fn plural(&self) -> &'static str {
        match self {
            LibraryContentKind::World => "worlds",
            LibraryContentKind::Campaign => "campaigns",
            LibraryContentKind::Adventure => "adventures",
            LibraryContentKind::Encounter => "encounters",
            LibraryContentKind::Asset => "assets",
        }
    }

    /// Kind a `parent_id` of this kind must point at.
    pub fn parent_kind(&self) -> Option<LibraryContentKind> {
        match self {
            LibraryContentKind::Campaign => Some(LibraryContentKind::World),
            LibraryContentKind::Adventure => Some(LibraryContentKind::Campaign),
            LibraryContentKind::Encounter => Some(LibraryContentKind::Adventure),
            LibraryContentKind::World | LibraryContentKind::Asset => None,
        }
    }

    pub fn child_kind(&self) -> Option<LibraryContentKind> {
        LibraryContentKind::ALL
            .into_iter()
            .find(|k| k.parent_kind() == Some(*self))
    }
}

impl fmt::Display for LibraryContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryContentKind {
    type Err = Error;

    /// Accepts the variant name or its plural path segment, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LibraryContentKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s) || k.plural().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown library content kind '{}'",
                    s
                )))
            })
    }
}

/// Domain model for a piece of library content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryContent {
    pub id: String,
    pub kind: LibraryContentKind,
    pub parent_id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating library content
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewLibraryContent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Partial update of library content
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryContentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
}

/// Restricts a search to content owned by the master user or by others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    #[default]
    All,
    Master,
    User,
}

/// Search criteria for library content
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySearchRequest {
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_type: OwnerType,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
    #[serde(default)]
    pub sort_descending: bool,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl LibrarySearchRequest {
    pub fn pagination(&self) -> (u32, u32) {
        let take = match self.take {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(t) => t.min(MAX_PAGE_SIZE),
        };
        (self.skip.unwrap_or(0), take)
    }
}

/// One page of library content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryContentPage {
    pub items: Vec<LibraryContent>,
    pub total_count: u64,
    pub has_more: bool,
}

/// Ownership transfer request; `action` is `take` or `grant`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferOwnershipRequest {
    pub action: String,
    #[serde(default)]
    pub target_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryKindInfo {
    pub kind: LibraryContentKind,
    pub path: String,
    pub child_kind: Option<LibraryContentKind>,
}

/// Library administration settings exposed to admin clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryConfig {
    pub master_user_id: String,
    pub kinds: Vec<LibraryKindInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hierarchy() {
        assert_eq!(LibraryContentKind::World.child_kind(), Some(LibraryContentKind::Campaign));
        assert_eq!(
            LibraryContentKind::Adventure.child_kind(),
            Some(LibraryContentKind::Encounter)
        );
        assert_eq!(LibraryContentKind::Encounter.child_kind(), None);
        assert_eq!(LibraryContentKind::Asset.parent_kind(), None);
    }

    #[test]
    fn test_kind_parses_plural_segments() {
        assert_eq!("worlds".parse::<LibraryContentKind>().unwrap(), LibraryContentKind::World);
        assert_eq!(
            "Campaign".parse::<LibraryContentKind>().unwrap(),
            LibraryContentKind::Campaign
        );
        assert!("maps".parse::<LibraryContentKind>().is_err());
    }

    #[test]
    fn test_search_pagination() {
        let request = LibrarySearchRequest {
            take: Some(500),
            ..Default::default()
        };
        assert_eq!(request.pagination(), (0, MAX_PAGE_SIZE));
    }
}
