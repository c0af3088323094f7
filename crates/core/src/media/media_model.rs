use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ai::GeneratedContentType;
use crate::errors::{Error, ValidationError};

/// What a stored image is used for on its asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceRole {
    Portrait,
    Token,
}

impl ResourceRole {
    pub const ALL: [ResourceRole; 2] = [ResourceRole::Portrait, ResourceRole::Token];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceRole::Portrait => "Portrait",
            ResourceRole::Token => "Token",
        }
    }

    /// Content type requested from the image generator.
    pub fn content_type(&self) -> GeneratedContentType {
        match self {
            ResourceRole::Portrait => GeneratedContentType::ImagePortrait,
            ResourceRole::Token => GeneratedContentType::ImageToken,
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown resource role '{}'",
                    s
                )))
            })
    }
}

/// Metadata of a stored binary resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaResource {
    pub id: String,
    pub owner_id: String,
    pub role: ResourceRole,
    /// Relative location inside the media store, `/`-separated.
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
    pub created_at: NaiveDateTime,
}

/// Input for storing a new resource; id, size and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaResource {
    pub owner_id: String,
    pub role: ResourceRole,
    /// Folder inside the media store; the resource id is appended.
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
}
