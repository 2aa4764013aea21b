//! Remote judging backend adapters.
//!
//! [`JudgeApi`] is the only seam the rest of the crate talks through; the
//! HTTP implementation covers the real backend and the in-memory one backs
//! tests and offline demos.

pub mod error;
pub mod http;
pub mod memory;

pub use error::{ApiError, ApiResult};

use futures::future::BoxFuture;

use crate::{
    dto::{
        catalog::{
            CompetitionDraft, CompetitionPatch, CriterionDraft, CriterionPatch, PromptDraft,
            PromptPatch,
        },
        judgement::PhotoUpload,
    },
    state::model::{Competition, Criterion, EntityId, Judgement, Prompt},
};

/// Abstraction over the judging backend.
pub trait JudgeApi: Send + Sync {
    fn list_competitions(&self) -> BoxFuture<'static, ApiResult<Vec<Competition>>>;
    fn create_competition(
        &self,
        draft: CompetitionDraft,
    ) -> BoxFuture<'static, ApiResult<Competition>>;
    fn update_competition(
        &self,
        id: EntityId,
        patch: CompetitionPatch,
    ) -> BoxFuture<'static, ApiResult<Competition>>;
    fn delete_competition(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>>;
    fn generate_guidelines(
        &self,
        competition_name: String,
    ) -> BoxFuture<'static, ApiResult<String>>;

    fn list_criteria(&self) -> BoxFuture<'static, ApiResult<Vec<Criterion>>>;
    fn create_criterion(&self, draft: CriterionDraft) -> BoxFuture<'static, ApiResult<Criterion>>;
    fn update_criterion(
        &self,
        id: EntityId,
        patch: CriterionPatch,
    ) -> BoxFuture<'static, ApiResult<Criterion>>;
    fn delete_criterion(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>>;

    fn list_prompts(&self) -> BoxFuture<'static, ApiResult<Vec<Prompt>>>;
    fn create_prompt(&self, draft: PromptDraft) -> BoxFuture<'static, ApiResult<Prompt>>;
    fn update_prompt(
        &self,
        id: EntityId,
        patch: PromptPatch,
    ) -> BoxFuture<'static, ApiResult<Prompt>>;
    fn delete_prompt(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>>;

    fn submit_batch(
        &self,
        competition_id: EntityId,
        photos: Vec<PhotoUpload>,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>>;
    fn list_judgements(
        &self,
        competition_id: EntityId,
    ) -> BoxFuture<'static, ApiResult<Vec<Judgement>>>;
    fn delete_judgement(&self, id: EntityId) -> BoxFuture<'static, ApiResult<()>>;

    /// Absolute URL serving the stored image, when the backend exposes one.
    fn image_url(&self, stored_filename: &str) -> Option<String>;
}
