//! Prompt template domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::ai::GeneratedContentType;
use crate::constants::{DEFAULT_PAGE_SIZE, DRAFT_VERSION_SUFFIX, MAX_PAGE_SIZE};

/// Domain model representing a versioned prompt template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub category: GeneratedContentType,
    pub version: String,
    pub system_prompt: String,
    pub user_prompt_template: String,
    pub negative_prompt_template: Option<String>,
    pub reference_image_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PromptTemplate {
    pub fn is_draft(&self) -> bool {
        is_draft_version(&self.version)
    }
}

/// Input model for creating a new prompt template
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPromptTemplate {
    pub name: String,
    pub category: GeneratedContentType,
    /// Defaults to `1.0-draft` when omitted or blank.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub system_prompt: String,
    pub user_prompt_template: String,
    #[serde(default)]
    pub negative_prompt_template: Option<String>,
    #[serde(default)]
    pub reference_image_id: Option<String>,
}

/// Partial update; only supplied fields change.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplateUpdate {
    pub name: Option<String>,
    pub category: Option<GeneratedContentType>,
    pub version: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt_template: Option<String>,
    pub negative_prompt_template: Option<String>,
    pub reference_image_id: Option<String>,
}

impl PromptTemplateUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.version.is_none()
            && self.system_prompt.is_none()
            && self.user_prompt_template.is_none()
            && self.negative_prompt_template.is_none()
            && self.reference_image_id.is_none()
    }
}

/// Which template versions a search returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateScope {
    #[default]
    Any,
    Published,
    Drafts,
}

/// Search criteria for prompt templates
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplateSearch {
    /// Case-insensitive substring match on the template name.
    pub name: Option<String>,
    pub category: Option<GeneratedContentType>,
    #[serde(default)]
    pub scope: TemplateScope,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl PromptTemplateSearch {
    /// Returns `(skip, take)` with defaults applied and `take` clamped.
    pub fn pagination(&self) -> (u32, u32) {
        page_bounds(self.skip, self.take)
    }
}

/// One page of prompt templates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplatePage {
    pub items: Vec<PromptTemplate>,
    pub total_count: u64,
    pub has_more: bool,
}

pub(crate) fn page_bounds(skip: Option<u32>, take: Option<u32>) -> (u32, u32) {
    let take = match take {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(t) => t.min(MAX_PAGE_SIZE),
    };
    (skip.unwrap_or(0), take)
}

pub fn is_draft_version(version: &str) -> bool {
    version.ends_with(DRAFT_VERSION_SUFFIX)
}

/// Orders template versions such as `1.0`, `1.2-draft`, `1.10`.
///
/// Dotted components compare numerically when both sides are numbers, and a
/// pre-release suffix (`-draft`) sorts below the same release.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let (left_core, left_suffix) = split_suffix(left);
    let (right_core, right_suffix) = split_suffix(right);

    let mut left_parts = left_core.split('.');
    let mut right_parts = right_core.split('.');
    loop {
        match (left_parts.next(), right_parts.next()) {
            (None, None) => break,
            (l, r) => {
                let l = l.unwrap_or("0");
                let r = r.unwrap_or("0");
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }

    match (left_suffix, right_suffix) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

fn split_suffix(version: &str) -> (&str, Option<&str>) {
    match version.split_once('-') {
        Some((core, suffix)) => (core, Some(suffix)),
        None => (version, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_versions_numeric_components() {
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "10.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("1", "1.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_versions_draft_below_release() {
        assert_eq!(compare_versions("1.0-draft", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.1-draft", "1.0"), Ordering::Greater);
    }

    #[test]
    fn test_is_draft_version() {
        assert!(is_draft_version("1.0-draft"));
        assert!(!is_draft_version("1.0"));
    }

    #[test]
    fn test_pagination_defaults_and_clamp() {
        let search = PromptTemplateSearch::default();
        assert_eq!(search.pagination(), (0, DEFAULT_PAGE_SIZE));

        let search = PromptTemplateSearch {
            skip: Some(40),
            take: Some(1000),
            ..Default::default()
        };
        assert_eq!(search.pagination(), (40, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_empty_update() {
        assert!(PromptTemplateUpdate::default().is_empty());
        let update = PromptTemplateUpdate {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
