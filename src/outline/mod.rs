pub mod api;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

pub use api::OutlineApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionStyle {
    TableOfContents,
    ExecutiveSummary,
    TechnicalApproach,
    Design,
    FocusDocument,
    Capabilities,
    Narrative,
}

impl SectionStyle {
    pub const ALL: [SectionStyle; 7] = [
        SectionStyle::TableOfContents,
        SectionStyle::ExecutiveSummary,
        SectionStyle::TechnicalApproach,
        SectionStyle::Design,
        SectionStyle::FocusDocument,
        SectionStyle::Capabilities,
        SectionStyle::Narrative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStyle::TableOfContents => "TableOfContents",
            SectionStyle::ExecutiveSummary => "ExecutiveSummary",
            SectionStyle::TechnicalApproach => "TechnicalApproach",
            SectionStyle::Design => "Design",
            SectionStyle::FocusDocument => "FocusDocument",
            SectionStyle::Capabilities => "Capabilities",
            SectionStyle::Narrative => "Narrative",
        }
    }
}

impl std::str::FromStr for SectionStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidValue { field: "section", value: s.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutlineStatus {
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
}

impl OutlineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlineStatus::Pending => "Pending",
            OutlineStatus::InProgress => "In-Progress",
            OutlineStatus::Completed => "Completed",
        }
    }
}

impl std::str::FromStr for OutlineStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "pending" => Ok(OutlineStatus::Pending),
            "in-progress" | "inprogress" => Ok(OutlineStatus::InProgress),
            "completed" => Ok(OutlineStatus::Completed),
            _ => Err(ValidationError::InvalidValue { field: "status", value: s.to_string() }),
        }
    }
}

/// A tenant-scoped outline section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub header: String,
    pub section: SectionStyle,
    pub status: OutlineStatus,
    #[serde(default)]
    pub target: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    /// Display name, when the backend joins it in
    #[serde(default)]
    pub reviewer: Option<String>,
}

/// Body for create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineInput {
    pub header: String,
    pub section: SectionStyle,
    pub status: OutlineStatus,
    pub limit: i64,
    pub target: i64,
    pub member_id: String,
}

impl OutlineInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.header.trim().is_empty() {
            return Err(ValidationError::Required { field: "header" });
        }
        if self.limit < 0 {
            return Err(ValidationError::Negative { field: "limit" });
        }
        if self.target < 0 {
            return Err(ValidationError::Negative { field: "target" });
        }
        if self.member_id.trim().is_empty() {
            return Err(ValidationError::Required { field: "memberId" });
        }
        Ok(())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {}", other))),
    }
}
