//! Asset ingest domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{Error, ValidationError};
use crate::media::{MediaResource, ResourceRole};

/// Lifecycle of an asset created through bulk ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngestStatus {
    Pending,
    Processing,
    PendingReview,
    PartialFailure,
    Failed,
    Approved,
    Discarded,
}

impl IngestStatus {
    pub const ALL: [IngestStatus; 7] = [
        IngestStatus::Pending,
        IngestStatus::Processing,
        IngestStatus::PendingReview,
        IngestStatus::PartialFailure,
        IngestStatus::Failed,
        IngestStatus::Approved,
        IngestStatus::Discarded,
    ];

    /// Statuses listed while generation is queued, running or needs a retry.
    pub const IN_PROCESSING: [IngestStatus; 4] = [
        IngestStatus::Pending,
        IngestStatus::Processing,
        IngestStatus::PartialFailure,
        IngestStatus::Failed,
    ];

    pub const IN_REVIEW: [IngestStatus; 1] = [IngestStatus::PendingReview];

    pub const IN_HISTORY: [IngestStatus; 2] = [IngestStatus::Approved, IngestStatus::Discarded];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Pending => "Pending",
            IngestStatus::Processing => "Processing",
            IngestStatus::PendingReview => "PendingReview",
            IngestStatus::PartialFailure => "PartialFailure",
            IngestStatus::Failed => "Failed",
            IngestStatus::Approved => "Approved",
            IngestStatus::Discarded => "Discarded",
        }
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IngestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown ingest status '{}'",
                    s
                )))
            })
    }
}

/// Ingest state attached to a library asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestAsset {
    pub asset_id: String,
    pub status: IngestStatus,
    /// Replaces the generated prompt when set (given on reject).
    pub ai_prompt: Option<String>,
    pub category: Option<String>,
    pub asset_type: Option<String>,
    pub environment: Option<String>,
    pub portrait_id: Option<String>,
    pub token_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl IngestAsset {
    pub fn resource_id(&self, role: ResourceRole) -> Option<&str> {
        match role {
            ResourceRole::Portrait => self.portrait_id.as_deref(),
            ResourceRole::Token => self.token_id.as_deref(),
        }
    }

    pub fn set_resource(&mut self, role: ResourceRole, resource_id: Option<String>) {
        match role {
            ResourceRole::Portrait => self.portrait_id = resource_id,
            ResourceRole::Token => self.token_id = resource_id,
        }
    }

    /// Roles that still lack a generated image.
    pub fn missing_roles(&self) -> Vec<ResourceRole> {
        ResourceRole::ALL
            .into_iter()
            .filter(|role| self.resource_id(*role).is_none())
            .collect()
    }

    /// Status once every generation item of the asset has finished.
    pub fn settled_status(&self) -> IngestStatus {
        match (self.portrait_id.is_some(), self.token_id.is_some()) {
            (true, true) => IngestStatus::PendingReview,
            (false, false) => IngestStatus::Failed,
            _ => IngestStatus::PartialFailure,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Prompt used when an asset has no explicit `ai_prompt`.
pub fn build_prompt(
    name: &str,
    description: Option<&str>,
    category: Option<&str>,
    asset_type: Option<&str>,
    environment: Option<&str>,
) -> String {
    let mut prompt = format!(
        "A {} {} named {}",
        non_blank(category).unwrap_or("fantasy"),
        non_blank(asset_type).unwrap_or("character"),
        name.trim()
    );
    if let Some(description) = non_blank(description) {
        prompt.push_str(". ");
        prompt.push_str(description);
    }
    if let Some(environment) = non_blank(environment) {
        prompt.push_str(" in ");
        prompt.push_str(environment);
    }
    prompt
}

/// Media folder of an asset: the last four characters of its id, then the id.
pub fn asset_folder(asset_id: &str) -> String {
    let chars: Vec<char> = asset_id.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}/{}", suffix, asset_id)
}

/// One asset to create and generate images for
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngestItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default)]
    pub items: Vec<IngestItemRequest>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectItem {
    pub asset_id: String,
    #[serde(default)]
    pub ai_prompt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default)]
    pub items: Vec<RejectItem>,
}

/// Asset ids for approve, discard and retry.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetIdsRequest {
    #[serde(default)]
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestFailure {
    pub asset_id: String,
    pub reason: String,
}

impl IngestFailure {
    pub fn new(asset_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatchResponse {
    pub succeeded_ids: Vec<String>,
    pub failures: Vec<IngestFailure>,
}

/// A queued generation job and the assets it covers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestJobResponse {
    pub job_id: String,
    pub asset_ids: Vec<String>,
    pub item_count: usize,
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobItemStatus {
    Pending,
    InProgress,
    Success,
    Failed,
}

macro_rules! str_enum {
    ($ty:ident, $label:literal, [$($variant:ident),+]) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($ty::$variant),)+
                    other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "Unknown {} '{}'",
                        $label, other
                    )))),
                }
            }
        }
    };
}

str_enum!(JobStatus, "job status", [Pending, InProgress, Completed, Canceled]);
str_enum!(JobItemStatus, "job item status", [Pending, InProgress, Success, Failed]);

impl JobItemStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobItemStatus::Success | JobItemStatus::Failed)
    }
}

/// One image to generate for one asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestJobItem {
    pub index: u32,
    pub asset_id: String,
    pub role: ResourceRole,
    pub status: JobItemStatus,
    /// Failure reason, or the stored resource id on success.
    pub message: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestJob {
    pub id: String,
    pub status: JobStatus,
    pub items: Vec<IngestJobItem>,
    pub created_at: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl IngestJob {
    /// Builds pending items for each `(asset, roles)` pair in order.
    pub fn new(
        id: String,
        assets: &[(String, Vec<ResourceRole>)],
        created_at: NaiveDateTime,
    ) -> Self {
        let items = assets
            .iter()
            .flat_map(|(asset_id, roles)| roles.iter().map(move |role| (asset_id, *role)))
            .enumerate()
            .map(|(index, (asset_id, role))| IngestJobItem {
                index: index as u32,
                asset_id: asset_id.clone(),
                role,
                status: JobItemStatus::Pending,
                message: None,
                started_at: None,
                completed_at: None,
            })
            .collect();
        Self {
            id,
            status: JobStatus::Pending,
            items,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// True while any item of `asset_id` has not finished.
    pub fn has_unfinished_items(&self, asset_id: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.asset_id == asset_id && !item.status.is_finished())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Canceled)
    }
}

/// Paging for the ingest listings
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngestListRequest {
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl IngestListRequest {
    pub fn pagination(&self) -> (u32, u32) {
        let take = match self.take {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(t) => t.min(MAX_PAGE_SIZE),
        };
        (self.skip.unwrap_or(0), take)
    }
}

/// Stored ingest rows for one listing page
#[derive(Debug, Clone, PartialEq)]
pub struct IngestAssetRows {
    pub items: Vec<IngestAsset>,
    pub total_count: u64,
}

/// Ingest asset as listed to administrators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssetView {
    pub asset_id: String,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub status: IngestStatus,
    pub ai_prompt: Option<String>,
    pub category: Option<String>,
    pub asset_type: Option<String>,
    pub environment: Option<String>,
    pub portrait: Option<MediaResource>,
    pub token: Option<MediaResource>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssetPage {
    pub items: Vec<IngestAssetView>,
    pub total_count: u64,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset(portrait: bool, token: bool) -> IngestAsset {
        let now = Utc::now().naive_utc();
        IngestAsset {
            asset_id: "a1".to_string(),
            status: IngestStatus::Processing,
            ai_prompt: None,
            category: None,
            asset_type: None,
            environment: None,
            portrait_id: portrait.then(|| "p".to_string()),
            token_id: token.then(|| "t".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_prompt_defaults_and_suffixes() {
        assert_eq!(
            build_prompt("Grik", None, None, None, None),
            "A fantasy character named Grik"
        );
        assert_eq!(
            build_prompt(
                "Grik",
                Some("A one-eyed goblin"),
                Some("sci-fi"),
                Some("creature"),
                Some("a ruined temple"),
            ),
            "A sci-fi creature named Grik. A one-eyed goblin in a ruined temple"
        );
        assert_eq!(
            build_prompt("Grik", Some("  "), Some(""), None, None),
            "A fantasy character named Grik"
        );
    }

    #[test]
    fn test_settled_status_from_resources() {
        assert_eq!(asset(true, true).settled_status(), IngestStatus::PendingReview);
        assert_eq!(asset(false, false).settled_status(), IngestStatus::Failed);
        assert_eq!(asset(true, false).settled_status(), IngestStatus::PartialFailure);
        assert_eq!(asset(true, false).missing_roles(), vec![ResourceRole::Token]);
    }

    #[test]
    fn test_asset_folder_uses_id_suffix() {
        assert_eq!(asset_folder("0190abcd-1234"), "1234/0190abcd-1234");
        assert_eq!(asset_folder("ab"), "ab/ab");
    }

    #[test]
    fn test_job_items_are_indexed_in_order() {
        let job = IngestJob::new(
            "job".to_string(),
            &[
                ("a1".to_string(), ResourceRole::ALL.to_vec()),
                ("a2".to_string(), vec![ResourceRole::Token]),
            ],
            Utc::now().naive_utc(),
        );
        let items: Vec<_> = job
            .items
            .iter()
            .map(|i| (i.index, i.asset_id.as_str(), i.role))
            .collect();
        assert_eq!(
            items,
            vec![
                (0, "a1", ResourceRole::Portrait),
                (1, "a1", ResourceRole::Token),
                (2, "a2", ResourceRole::Token),
            ]
        );
        assert!(job.has_unfinished_items("a2"));
        assert!(!job.has_unfinished_items("a3"));
    }

    #[test]
    fn test_status_strings_round_trip() {
        assert_eq!(
            "PendingReview".parse::<IngestStatus>().unwrap(),
            IngestStatus::PendingReview
        );
        assert_eq!("InProgress".parse::<JobStatus>().unwrap(), JobStatus::InProgress);
        assert_eq!(JobItemStatus::Failed.to_string(), "Failed");
        assert!("Done".parse::<JobItemStatus>().is_err());
    }
}
