//! In-memory implementation of [`JudgeApi`].
//!
//! Mirrors the backend's visible behavior closely enough to drive tests and
//! offline demos: same not-found and precondition failures, same prompt
//! exclusivity handling, deterministic scores derived from the uploads.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use reqwest::StatusCode;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::{
        JudgeApi,
        error::{ApiError, ApiResult},
    },
    dto::{
        catalog::{
            CompetitionDraft, CompetitionPatch, CriterionDraft, CriterionPatch, PromptDraft,
            PromptPatch,
        },
        judgement::PhotoUpload,
    },
    state::model::{
        Competition, Criterion, EntityId, Judgement, JudgementDetails, Prompt, PromptKind,
    },
};

/// Failure to report on the next remote call, then cleared.
#[derive(Debug, Clone)]
pub enum InjectedFailure {
    /// Backend answers with this status and detail message.
    Status { status: u16, detail: String },
    /// Backend cannot be reached at all.
    Unreachable,
}

/// Self-contained judging backend living behind a mutex.
#[derive(Clone, Default)]
pub struct InMemoryJudgeApi {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    competitions: IndexMap<EntityId, Competition>,
    criteria: IndexMap<EntityId, Criterion>,
    prompts: IndexMap<EntityId, Prompt>,
    judgements: IndexMap<EntityId, Judgement>,
    next_id: EntityId,
    failure: Option<InjectedFailure>,
    calls: usize,
}

impl MemoryState {
    /// Count the call and surface any injected failure before touching state.
    fn begin(&mut self, path: &str) -> ApiResult<()> {
        self.calls += 1;
        match self.failure.take() {
            None => Ok(()),
            Some(InjectedFailure::Status { status, detail }) => Err(ApiError::Status {
                path: path.to_string(),
                status: StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                detail,
            }),
            Some(InjectedFailure::Unreachable) => Err(ApiError::Unreachable {
                path: path.to_string(),
                message: "injected outage".to_string(),
            }),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    fn disable_other_prompts(&mut self, kind: PromptKind, keep: EntityId) {
        for prompt in self.prompts.values_mut() {
            if prompt.kind == kind && prompt.id != keep {
                prompt.enabled = false;
            }
        }
    }

    fn has_enabled_prompt(&self, kind: PromptKind) -> bool {
        self.prompts.values().any(|p| p.kind == kind && p.enabled)
    }
}

fn rejection(path: &str, status: StatusCode, detail: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status,
        detail: detail.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl InMemoryJudgeApi {
    /// Empty backend: no entities at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded the way a fresh server install is: the four stock
    /// criteria plus one enabled default prompt of each kind.
    pub fn with_defaults() -> Self {
        let mut state = MemoryState::default();

        let seeds = [
            (
                "Composition",
                1.0,
                "Evaluate the rule of thirds, framing, balance, and leading lines.",
            ),
            (
                "Technical_Quality",
                1.2,
                "Assess focus, exposure, sharpness, and noise levels.",
            ),
            (
                "Creativity",
                0.9,
                "Judge the unique perspective, artistic vision, and originality.",
            ),
            (
                "Nature_Relevance",
                1.1,
                "Consider the connection to nature, authenticity, and storytelling.",
            ),
        ];
        for (name, weight, description) in seeds {
            let id = state.allocate_id();
            state.criteria.insert(
                id,
                Criterion {
                    id,
                    name: name.to_string(),
                    description: description.to_string(),
                    weight,
                    enabled: true,
                },
            );
        }

        let prompts = [
            (
                PromptKind::Evaluation,
                "The default prompt used for evaluating a single criterion.",
                "Score this image from 0 to 10 on {criterion_name}. \
                 {criterion_description} Reply with the score and a short rationale.",
            ),
            (
                PromptKind::Reasoning,
                "The default prompt for generating the final overall reasoning.",
                "The image scored {overall_score} overall. Rules: {rules}. \
                 Feedback: {feedback_summary}. Write a short overall assessment.",
            ),
            (
                PromptKind::RulesSynthesis,
                "The default prompt for synthesizing competition guidelines from web search results.",
                "Analyze past winners of '{competition_name}' from \
                 {aggregated_search_results} and distill concise competition rules.",
            ),
        ];
        for (kind, description, template) in prompts {
            let id = state.allocate_id();
            state.prompts.insert(
                id,
                Prompt {
                    id,
                    kind,
                    description: Some(description.to_string()),
                    template: template.to_string(),
                    enabled: true,
                },
            );
        }

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Number of remote calls observed so far.
    pub async fn remote_calls(&self) -> usize {
        self.state.lock().await.calls
    }

    /// Make the next call fail with the given failure.
    pub async fn inject_failure(&self, failure: InjectedFailure) {
        self.state.lock().await.failure = Some(failure);
    }
}

impl JudgeApi for InMemoryJudgeApi {
    fn list_competitions(&self) -> BoxFuture<'static, ApiResult<Vec<Competition>>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("competitions/")?;
            Ok(state.competitions.values().cloned().collect())
        })
    }

    fn create_competition(
        &self,
        draft: CompetitionDraft,
    ) -> BoxFuture<'static, ApiResult<Competition>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("competitions/")?;
            let id = state.allocate_id();
            let competition = Competition {
                id,
                name: draft.name,
                description: draft.description,
                rules: draft.rules,
                created_at: OffsetDateTime::now_utc(),
            };
            state.competitions.insert(id, competition.clone());
            Ok(competition)
        })
    }

    fn update_competition(
        &self,
        id: EntityId,
        patch: CompetitionPatch,
    ) -> BoxFuture<'static, ApiResult<Competition>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("competitions/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            let competition = state
                .competitions
                .get_mut(&id)
                .ok_or_else(|| rejection(&path, StatusCode::NOT_FOUND, "Competition not found"))?;
            if let Some(name) = patch.name {
                competition.name = name;
            }
            if let Some(description) = patch.description {
                competition.description = Some(description);
            }
            if let Some(rules) = patch.rules {
                competition.rules = Some(rules);
            }
            Ok(competition.clone())
        })
    }

    fn delete_competition(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("competitions/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            if state.competitions.shift_remove(&id).is_none() {
                return Err(rejection(&path, StatusCode::NOT_FOUND, "Competition not found"));
            }
            state.judgements.retain(|_, j| j.competition_id != id);
            Ok(())
        })
    }

    fn generate_guidelines(
        &self,
        competition_name: String,
    ) -> BoxFuture<'static, ApiResult<String>> {
        const PATH: &str = "competitions/generate-guidelines";

        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin(PATH)?;
            let trimmed = competition_name.trim();
            if trimmed.is_empty() {
                return Err(rejection(
                    PATH,
                    StatusCode::BAD_REQUEST,
                    "Competition name cannot be empty.",
                ));
            }
            if !state.has_enabled_prompt(PromptKind::RulesSynthesis) {
                return Err(rejection(
                    PATH,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No enabled RULES_SYNTHESIS_PROMPT found.",
                ));
            }
            Ok(format!(
                "Guidelines for \"{trimmed}\": submit original photographs on theme, \
                 one entry per photographer, judged against the enabled criteria."
            ))
        })
    }

    fn list_criteria(&self) -> BoxFuture<'static, ApiResult<Vec<Criterion>>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("criteria/")?;
            Ok(state.criteria.values().cloned().collect())
        })
    }

    fn create_criterion(&self, draft: CriterionDraft) -> BoxFuture<'static, ApiResult<Criterion>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("criteria/")?;
            let id = state.allocate_id();
            let criterion = Criterion {
                id,
                name: draft.name,
                description: draft.description,
                weight: draft.weight,
                enabled: draft.enabled,
            };
            state.criteria.insert(id, criterion.clone());
            Ok(criterion)
        })
    }

    fn update_criterion(
        &self,
        id: EntityId,
        patch: CriterionPatch,
    ) -> BoxFuture<'static, ApiResult<Criterion>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("criteria/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            let criterion = state
                .criteria
                .get_mut(&id)
                .ok_or_else(|| rejection(&path, StatusCode::NOT_FOUND, "Criterion not found"))?;
            if let Some(name) = patch.name {
                criterion.name = name;
            }
            if let Some(description) = patch.description {
                criterion.description = description;
            }
            if let Some(weight) = patch.weight {
                criterion.weight = weight;
            }
            if let Some(enabled) = patch.enabled {
                criterion.enabled = enabled;
            }
            Ok(criterion.clone())
        })
    }

    fn delete_criterion(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("criteria/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            if state.criteria.shift_remove(&id).is_none() {
                return Err(rejection(&path, StatusCode::NOT_FOUND, "Criterion not found"));
            }
            Ok(())
        })
    }

    fn list_prompts(&self) -> BoxFuture<'static, ApiResult<Vec<Prompt>>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("prompts/")?;
            Ok(state.prompts.values().cloned().collect())
        })
    }

    fn create_prompt(&self, draft: PromptDraft) -> BoxFuture<'static, ApiResult<Prompt>> {
        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin("prompts/")?;
            let id = state.allocate_id();
            if draft.enabled {
                state.disable_other_prompts(draft.kind, id);
            }
            let prompt = Prompt {
                id,
                kind: draft.kind,
                description: draft.description,
                template: draft.template,
                enabled: draft.enabled,
            };
            state.prompts.insert(id, prompt.clone());
            Ok(prompt)
        })
    }

    fn update_prompt(
        &self,
        id: EntityId,
        patch: PromptPatch,
    ) -> BoxFuture<'static, ApiResult<Prompt>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("prompts/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            let current_kind = state
                .prompts
                .get(&id)
                .map(|p| p.kind)
                .ok_or_else(|| rejection(&path, StatusCode::NOT_FOUND, "Prompt not found"))?;
            // Exclusivity follows the kind the prompt holds after the patch.
            if patch.enabled == Some(true) {
                state.disable_other_prompts(patch.kind.unwrap_or(current_kind), id);
            }
            let prompt = state
                .prompts
                .get_mut(&id)
                .ok_or_else(|| rejection(&path, StatusCode::NOT_FOUND, "Prompt not found"))?;
            if let Some(kind) = patch.kind {
                prompt.kind = kind;
            }
            if let Some(description) = patch.description {
                prompt.description = Some(description);
            }
            if let Some(template) = patch.template {
                prompt.template = template;
            }
            if let Some(enabled) = patch.enabled {
                prompt.enabled = enabled;
            }
            Ok(prompt.clone())
        })
    }

    fn delete_prompt(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("prompts/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            if state.prompts.shift_remove(&id).is_none() {
                return Err(rejection(&path, StatusCode::NOT_FOUND, "Prompt not found"));
            }
            Ok(())
        })
    }

    fn submit_batch(
        &self,
        competition_id: EntityId,
        photos: Vec<PhotoUpload>,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>> {
        const PATH: &str = "judge-batch/";

        let api = self.clone();
        Box::pin(async move {
            let mut state = api.state.lock().await;
            state.begin(PATH)?;
            if !state.competitions.contains_key(&competition_id) {
                return Err(rejection(PATH, StatusCode::NOT_FOUND, "Competition not found"));
            }
            let enabled: Vec<Criterion> = state
                .criteria
                .values()
                .filter(|c| c.enabled)
                .cloned()
                .collect();
            if enabled.is_empty() {
                return Err(rejection(
                    PATH,
                    StatusCode::BAD_REQUEST,
                    "No enabled judging criteria found",
                ));
            }
            if !state.has_enabled_prompt(PromptKind::Evaluation) {
                return Err(rejection(
                    PATH,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No enabled EVALUATION_PROMPT found. Please enable one in the settings.",
                ));
            }
            if !state.has_enabled_prompt(PromptKind::Reasoning) {
                return Err(rejection(
                    PATH,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No enabled REASONING_PROMPT found. Please enable one in the settings.",
                ));
            }

            let mut results = Vec::with_capacity(photos.len());
            for photo in photos {
                let mut details = JudgementDetails::default();
                let mut weighted = 0.0;
                let mut total_weight = 0.0;
                for criterion in &enabled {
                    // Deterministic stand-in for the model's verdict.
                    let score =
                        ((photo.bytes.len() + criterion.name.len()) % 101) as f64 / 10.0;
                    weighted += score * criterion.weight;
                    total_weight += criterion.weight;
                    details.scores.insert(criterion.name.clone(), score);
                    details.rationales.insert(
                        criterion.name.clone(),
                        format!("{} rated at {score:.1} for this image.", criterion.name),
                    );
                }
                details.overall_score = if total_weight > 0.0 {
                    round2(weighted / total_weight)
                } else {
                    0.0
                };
                details.overall_reasoning = Some(format!(
                    "Weighted view across {} criteria for {}.",
                    enabled.len(),
                    photo.file_name
                ));

                let suffix = std::path::Path::new(&photo.file_name)
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                let id = state.allocate_id();
                let judgement = Judgement {
                    id,
                    competition_id,
                    original_filename: photo.file_name,
                    stored_filename: Some(format!("{}{suffix}", Uuid::new_v4().simple())),
                    created_at: OffsetDateTime::now_utc(),
                    details,
                };
                state.judgements.insert(id, judgement.clone());
                results.push(judgement);
            }
            Ok(results)
        })
    }

    fn list_judgements(
        &self,
        competition_id: EntityId,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("competitions/{competition_id}/judgements");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            Ok(state
                .judgements
                .values()
                .filter(|j| j.competition_id == competition_id)
                .cloned()
                .collect())
        })
    }

    fn delete_judgement(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("judgements/{id}");
            let mut state = api.state.lock().await;
            state.begin(&path)?;
            if state.judgements.shift_remove(&id).is_none() {
                return Err(rejection(&path, StatusCode::NOT_FOUND, "Judgement not found"));
            }
            Ok(())
        })
    }

    fn image_url(&self, _stored_filename: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::JudgeApi;

    fn photo(name: &str, size: usize) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: vec![0u8; size],
        }
    }

    fn prompt_draft(kind: PromptKind, enabled: bool) -> PromptDraft {
        PromptDraft {
            kind,
            description: None,
            template: "Template body".to_string(),
            enabled,
        }
    }

    #[tokio::test]
    async fn creating_enabled_prompt_disables_siblings() {
        let api = InMemoryJudgeApi::with_defaults();
        let created = api
            .create_prompt(prompt_draft(PromptKind::Evaluation, true))
            .await
            .unwrap();

        let prompts = api.list_prompts().await.unwrap();
        let enabled: Vec<_> = prompts
            .iter()
            .filter(|p| p.kind == PromptKind::Evaluation && p.enabled)
            .collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, created.id);
    }

    #[tokio::test]
    async fn enabling_via_update_disables_siblings() {
        let api = InMemoryJudgeApi::with_defaults();
        let spare = api
            .create_prompt(prompt_draft(PromptKind::Reasoning, false))
            .await
            .unwrap();

        api.update_prompt(
            spare.id,
            PromptPatch {
                enabled: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let prompts = api.list_prompts().await.unwrap();
        let enabled: Vec<_> = prompts
            .iter()
            .filter(|p| p.kind == PromptKind::Reasoning && p.enabled)
            .collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, spare.id);
    }

    #[tokio::test]
    async fn enabling_with_a_kind_change_follows_the_new_kind() {
        let api = InMemoryJudgeApi::with_defaults();
        let prompts = api.list_prompts().await.unwrap();
        let moved = prompts
            .iter()
            .find(|p| p.kind == PromptKind::Reasoning)
            .unwrap();

        api.update_prompt(
            moved.id,
            PromptPatch {
                kind: Some(PromptKind::Evaluation),
                enabled: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let prompts = api.list_prompts().await.unwrap();
        let enabled: Vec<_> = prompts
            .iter()
            .filter(|p| p.kind == PromptKind::Evaluation && p.enabled)
            .collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, moved.id);
    }

    #[tokio::test]
    async fn submit_requires_competition_and_enabled_criteria() {
        let api = InMemoryJudgeApi::with_defaults();
        let err = api
            .submit_batch(99, vec![photo("a.jpg", 10)])
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, detail, .. } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(detail, "Competition not found");
            }
            other => panic!("unexpected error: {other}"),
        }

        let bare = InMemoryJudgeApi::new();
        let competition = bare
            .create_competition(CompetitionDraft {
                name: "Birds".to_string(),
                description: None,
                rules: None,
            })
            .await
            .unwrap();
        let err = bare
            .submit_batch(competition.id, vec![photo("a.jpg", 10)])
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, detail, .. } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail, "No enabled judging criteria found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn submit_scores_every_enabled_criterion() {
        let api = InMemoryJudgeApi::with_defaults();
        let competition = api
            .create_competition(CompetitionDraft {
                name: "Wildlife".to_string(),
                description: None,
                rules: None,
            })
            .await
            .unwrap();

        let results = api
            .submit_batch(competition.id, vec![photo("owl.jpg", 512), photo("fox.png", 300)])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        for judgement in &results {
            assert_eq!(judgement.details.scores.len(), 4);
            assert_eq!(judgement.details.rationales.len(), 4);
            assert!(judgement.details.overall_reasoning.is_some());
            assert!(judgement.stored_filename.is_some());
            assert!((0.0..=10.0).contains(&judgement.details.overall_score));
        }
        assert!(results[0].stored_filename.as_deref().unwrap().ends_with(".jpg"));
        assert!(results[1].stored_filename.as_deref().unwrap().ends_with(".png"));

        let listed = api.list_judgements(competition.id).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let api = InMemoryJudgeApi::with_defaults();
        api.inject_failure(InjectedFailure::Unreachable).await;

        assert!(api.list_criteria().await.is_err());
        assert!(api.list_criteria().await.is_ok());
        assert_eq!(api.remote_calls().await, 2);
    }

    #[tokio::test]
    async fn guideline_generation_needs_an_enabled_synthesis_prompt() {
        let api = InMemoryJudgeApi::with_defaults();
        let guidelines = api.generate_guidelines("Macro".to_string()).await.unwrap();
        assert!(guidelines.contains("Macro"));

        let prompts = api.list_prompts().await.unwrap();
        let synthesis = prompts
            .iter()
            .find(|p| p.kind == PromptKind::RulesSynthesis)
            .unwrap();
        api.update_prompt(
            synthesis.id,
            PromptPatch {
                enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = api.generate_guidelines("Macro".to_string()).await.unwrap_err();
        match err {
            ApiError::Status { status, detail, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(detail, "No enabled RULES_SYNTHESIS_PROMPT found.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn deleting_competition_drops_its_judgements() {
        let api = InMemoryJudgeApi::with_defaults();
        let competition = api
            .create_competition(CompetitionDraft {
                name: "Street".to_string(),
                description: None,
                rules: None,
            })
            .await
            .unwrap();
        api.submit_batch(competition.id, vec![photo("c.jpg", 64)])
            .await
            .unwrap();

        api.delete_competition(competition.id).await.unwrap();
        let remaining = api.list_judgements(competition.id).await.unwrap();
        assert!(remaining.is_empty());
    }
}
