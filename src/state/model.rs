//! Domain entities mirrored from the judge backend.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Server-assigned entity identifier. The client never invents one.
pub type EntityId = i64;

/// Types stored in a [`crate::state::store::Collection`], keyed by their server id.
pub trait Keyed {
    /// Identifier the collection indexes this entity under.
    fn key(&self) -> EntityId;
}

/// A competition photos are judged against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Competition {
    /// Primary key of the competition.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Optional blurb shown alongside the name.
    pub description: Option<String>,
    /// Freeform rules text passed verbatim to the judging backend.
    pub rules: Option<String>,
    /// Creation timestamp reported by the server.
    #[serde(deserialize_with = "crate::dto::server_time::deserialize")]
    pub created_at: OffsetDateTime,
}

/// A named, weighted judging dimension with enable/disable state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Criterion {
    /// Primary key of the criterion.
    pub id: EntityId,
    /// Name used as the score key in judgement details.
    pub name: String,
    /// Instructions handed to the evaluator for this dimension.
    pub description: String,
    /// Relative influence on the aggregate score, non-negative.
    pub weight: f64,
    /// Whether the criterion participates in submissions.
    pub enabled: bool,
}

/// Role a prompt template plays in the evaluation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    /// Scores a single criterion for one photo.
    #[serde(rename = "EVALUATION_PROMPT")]
    Evaluation,
    /// Synthesizes the final overall reasoning.
    #[serde(rename = "REASONING_PROMPT")]
    Reasoning,
    /// Builds competition guidelines from research material.
    #[serde(rename = "RULES_SYNTHESIS_PROMPT")]
    RulesSynthesis,
}

/// A reusable instruction template for one stage of the evaluation pipeline.
///
/// At most one prompt per [`PromptKind`] may be enabled at a time; the store
/// enforces this on every apply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prompt {
    /// Primary key of the prompt.
    pub id: EntityId,
    /// Pipeline stage this template serves.
    #[serde(rename = "type")]
    pub kind: PromptKind,
    /// Optional operator-facing description.
    pub description: Option<String>,
    /// Template text with named placeholders.
    pub template: String,
    /// Whether this template is the active one for its kind.
    pub enabled: bool,
}

/// Persisted result of evaluating one photo against the active criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    /// Primary key of the judgement.
    pub id: EntityId,
    /// Competition the photo was judged for.
    pub competition_id: EntityId,
    /// Filename the operator uploaded.
    pub original_filename: String,
    /// Server-side storage name, when the image was retained.
    pub stored_filename: Option<String>,
    /// Creation timestamp reported by the server.
    pub created_at: OffsetDateTime,
    /// Structured result data; displayed and deleted, never recomputed.
    pub details: JudgementDetails,
}

/// Normalized result payload of a judgement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JudgementDetails {
    /// Weighted aggregate score on a 0..10 scale.
    pub overall_score: f64,
    /// Aggregate reasoning confidence, when the server provides one.
    pub overall_reasoning_score: Option<f64>,
    /// Head-judge style summary text.
    pub overall_reasoning: Option<String>,
    /// Per-criterion scores keyed by criterion name.
    pub scores: IndexMap<String, f64>,
    /// Per-criterion rationale text keyed by criterion name.
    pub rationales: IndexMap<String, String>,
}

impl Keyed for Competition {
    fn key(&self) -> EntityId {
        self.id
    }
}

impl Keyed for Criterion {
    fn key(&self) -> EntityId {
        self.id
    }
}

impl Keyed for Prompt {
    fn key(&self) -> EntityId {
        self.id
    }
}

impl Keyed for Judgement {
    fn key(&self) -> EntityId {
        self.id
    }
}
