//! Inbound judgement payloads and the photo upload body.
//!
//! The backend has emitted judgement details both nested under a
//! `judgement_details` key and flattened onto the judgement object. Both
//! shapes decode here and normalize into [`Judgement`] immediately; the
//! ambiguity never reaches the store.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    dto::server_time,
    state::model::{EntityId, Judgement, JudgementDetails},
};

/// One photo staged for a batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Filename as selected by the operator.
    pub file_name: String,
    /// MIME type reported for the file.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Whether the staged file is an image; everything else is dropped at
    /// staging time.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Judgement as the server emits it, covering both historical shapes.
#[derive(Debug, Deserialize)]
pub struct JudgementWire {
    pub id: EntityId,
    #[serde(default)]
    pub competition_id: Option<EntityId>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub stored_filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Nested shape: the whole details record under one key.
    #[serde(default)]
    pub judgement_details: Option<DetailsWire>,
    /// Flattened shape: details fields directly on the judgement.
    #[serde(flatten)]
    pub flat: DetailsWire,
}

/// Details record; every field is optional so either shape decodes.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsWire {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub overall_reasoning_score: Option<f64>,
    #[serde(default)]
    pub overall_reasoning: Option<String>,
    #[serde(default)]
    pub scores: Option<IndexMap<String, f64>>,
    #[serde(default)]
    pub rationales: Option<IndexMap<String, String>>,
}

impl From<JudgementWire> for Judgement {
    fn from(wire: JudgementWire) -> Self {
        // Nested details win; the flattened fields fill whatever they miss.
        let (nested, flat) = (wire.judgement_details.unwrap_or_default(), wire.flat);
        let details = JudgementDetails {
            overall_score: nested.overall_score.or(flat.overall_score).unwrap_or(0.0),
            overall_reasoning_score: nested
                .overall_reasoning_score
                .or(flat.overall_reasoning_score),
            overall_reasoning: nested.overall_reasoning.or(flat.overall_reasoning),
            scores: nested.scores.or(flat.scores).unwrap_or_default(),
            rationales: nested.rationales.or(flat.rationales).unwrap_or_default(),
        };

        let original_filename = wire
            .original_filename
            .or(nested.filename)
            .or(flat.filename)
            .unwrap_or_default();

        Self {
            id: wire.id,
            competition_id: wire.competition_id.unwrap_or_default(),
            original_filename,
            stored_filename: wire.stored_filename,
            created_at: wire
                .created_at
                .as_deref()
                .map(server_time::parse)
                .unwrap_or(time::OffsetDateTime::UNIX_EPOCH),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_payload() -> serde_json::Value {
        serde_json::json!({
            "id": 12,
            "competition_id": 3,
            "original_filename": "eagle.jpg",
            "stored_filename": "ab12.jpg",
            "created_at": "2024-05-01T12:30:00",
            "overall_score": 7.9,
            "judgement_details": {
                "filename": "eagle.jpg",
                "overall_score": 7.9,
                "overall_reasoning": "Strong composition.",
                "scores": {"Composition": 8.0, "Creativity": 7.5},
                "rationales": {"Composition": "Balanced.", "Creativity": "Fresh angle."}
            }
        })
    }

    fn flattened_payload() -> serde_json::Value {
        serde_json::json!({
            "id": 12,
            "competition_id": 3,
            "original_filename": "eagle.jpg",
            "stored_filename": "ab12.jpg",
            "created_at": "2024-05-01T12:30:00",
            "overall_score": 7.9,
            "overall_reasoning": "Strong composition.",
            "scores": {"Composition": 8.0, "Creativity": 7.5},
            "rationales": {"Composition": "Balanced.", "Creativity": "Fresh angle."}
        })
    }

    #[test]
    fn both_wire_shapes_normalize_identically() {
        let nested: Judgement = serde_json::from_value::<JudgementWire>(nested_payload())
            .unwrap()
            .into();
        let flat: Judgement = serde_json::from_value::<JudgementWire>(flattened_payload())
            .unwrap()
            .into();

        assert_eq!(nested, flat);
        assert_eq!(nested.details.overall_score, 7.9);
        assert_eq!(nested.details.scores["Composition"], 8.0);
        assert_eq!(nested.details.rationales["Creativity"], "Fresh angle.");
        assert_eq!(nested.details.overall_reasoning_score, None);
    }

    #[test]
    fn filename_falls_back_to_details_entry() {
        let payload = serde_json::json!({
            "id": 4,
            "competition_id": 1,
            "judgement_details": {"filename": "fallback.png", "overall_score": 5.0}
        });
        let judgement: Judgement = serde_json::from_value::<JudgementWire>(payload)
            .unwrap()
            .into();
        assert_eq!(judgement.original_filename, "fallback.png");
        assert_eq!(judgement.stored_filename, None);
    }

    #[test]
    fn missing_created_at_collapses_to_epoch() {
        let payload = serde_json::json!({"id": 9, "competition_id": 2});
        let judgement: Judgement = serde_json::from_value::<JudgementWire>(payload)
            .unwrap()
            .into();
        assert_eq!(judgement.created_at, time::OffsetDateTime::UNIX_EPOCH);
        assert!(judgement.details.scores.is_empty());
    }

    #[test]
    fn non_image_uploads_are_detectable() {
        let photo = PhotoUpload {
            file_name: "notes.txt".into(),
            media_type: "text/plain".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(!photo.is_image());

        let photo = PhotoUpload {
            file_name: "eagle.jpg".into(),
            media_type: "image/jpeg".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(photo.is_image());
    }
}
