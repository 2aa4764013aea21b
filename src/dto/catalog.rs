//! Outbound bodies for the configuration endpoints.
//!
//! Drafts are create payloads; patches carry only the fields to change and
//! serialize nothing for absent ones, matching the server's exclude-unset
//! update semantics.

use serde::Serialize;
use validator::Validate;

use crate::{dto::validation::validate_required_text, state::model::PromptKind};

/// Create payload for a competition.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CompetitionDraft {
    /// Display name, required.
    #[validate(custom(function = validate_required_text))]
    pub name: String,
    /// Optional blurb; `None` is omitted from the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional rules text; `None` is omitted from the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

/// Update payload for a competition. Absent fields keep their server value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompetitionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

impl CompetitionDraft {
    /// Full-form patch carrying every draft field, used by the edit flow.
    pub fn into_patch(self) -> CompetitionPatch {
        CompetitionPatch {
            name: Some(self.name),
            description: self.description,
            rules: self.rules,
        }
    }
}

/// Create payload for a criterion.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CriterionDraft {
    /// Name, required; doubles as the score key in judgement details.
    #[validate(custom(function = validate_required_text))]
    pub name: String,
    /// Evaluator instructions for this dimension.
    pub description: String,
    /// Relative weight, already coerced to a non-negative number.
    pub weight: f64,
    /// Initial enabled state.
    pub enabled: bool,
}

/// Update payload for a criterion. Absent fields keep their server value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CriterionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl CriterionDraft {
    /// Full-form patch carrying every draft field, used by the edit flow.
    pub fn into_patch(self) -> CriterionPatch {
        CriterionPatch {
            name: Some(self.name),
            description: Some(self.description),
            weight: Some(self.weight),
            enabled: Some(self.enabled),
        }
    }
}

/// Create payload for a prompt.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct PromptDraft {
    /// Pipeline stage the template serves.
    #[serde(rename = "type")]
    pub kind: PromptKind,
    /// Optional operator-facing description; `None` is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Template text, required.
    #[validate(custom(function = validate_required_text))]
    pub template: String,
    /// Initial enabled state; the server disables same-kind siblings.
    pub enabled: bool,
}

/// Update payload for a prompt. Absent fields keep their server value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PromptKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl PromptDraft {
    /// Full-form patch carrying every draft field, used by the edit flow.
    pub fn into_patch(self) -> PromptPatch {
        PromptPatch {
            kind: Some(self.kind),
            description: self.description,
            template: Some(self.template),
            enabled: Some(self.enabled),
        }
    }
}

/// Permissive weight entry: unparseable or negative input becomes `0.0`.
///
/// Matches the behavior of the weight field in the criteria form, which never
/// rejects input.
pub fn coerce_weight(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}
