//! Photo staging and batch submission.

use tracing::{debug, warn};

use crate::{
    dto::judgement::PhotoUpload,
    error::CoreError,
    state::{SharedState, model::Judgement},
};

/// Stage files for submission; non-images are dropped.
///
/// Returns how many files were kept.
pub async fn stage_photos(
    state: &SharedState,
    photos: Vec<PhotoUpload>,
) -> Result<usize, CoreError> {
    let mut session = state.session().write().await;
    session
        .stage(photos)
        .map_err(|err| CoreError::Validation(err.to_string()))
}

/// Submit the staged batch for judging.
///
/// Preconditions are checked before anything goes on the wire: a competition
/// must be selected and at least one criterion enabled. The response is
/// applied only when the submission it answers is still the one in flight;
/// a response for an abandoned submission is discarded.
pub async fn submit(state: &SharedState) -> Result<Vec<Judgement>, CoreError> {
    let Some(competition_id) = state.selected_competition().await else {
        return Err(CoreError::Validation("no competition selected".to_string()));
    };
    {
        let catalog = state.catalog().read().await;
        if !catalog.has_enabled_criterion() {
            return Err(CoreError::Validation(
                "at least one enabled judging criterion is required".to_string(),
            ));
        }
    }

    let (token, photos) = {
        let mut session = state.session().write().await;
        session
            .begin_submit()
            .map_err(|err| CoreError::Validation(err.to_string()))?
    };
    debug!(competition = competition_id, photos = photos.len(), "submitting batch");

    match state.api().submit_batch(competition_id, photos).await {
        Ok(results) => {
            let mut session = state.session().write().await;
            if !session.complete(token, results.clone()) {
                debug!("discarding results of an abandoned submission");
            }
            Ok(results)
        }
        Err(err) => {
            let core: CoreError = err.into();
            warn!(error = %core, "batch submission failed");
            let mut session = state.session().write().await;
            if !session.fail(token, core.to_string()) {
                debug!("discarding failure of an abandoned submission");
            }
            Err(core)
        }
    }
}

/// Throw away the current results and start a fresh batch.
pub async fn new_judgement(state: &SharedState) {
    state.session().write().await.reset();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        api::memory::{InMemoryJudgeApi, InjectedFailure},
        dto::catalog::{CompetitionDraft, CriterionDraft, PromptDraft},
        services::{catalog_service, navigation_service},
        state::{AppState, model::PromptKind, session::SessionPhase},
    };

    fn image(name: &str, size: usize) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: vec![0u8; size],
        }
    }

    async fn ready_state() -> (Arc<InMemoryJudgeApi>, SharedState) {
        let api = Arc::new(InMemoryJudgeApi::with_defaults());
        let state = AppState::new(api.clone());
        catalog_service::bootstrap(&state).await.unwrap();

        let competition = catalog_service::save_competition(
            &state,
            None,
            CompetitionDraft {
                name: "Sharpness Cup".to_string(),
                description: None,
                rules: None,
            },
        )
        .await
        .unwrap();
        navigation_service::select_competition(&state, competition.id)
            .await
            .unwrap();
        (api, state)
    }

    #[tokio::test]
    async fn staged_batch_is_judged_and_completed() {
        let (_, state) = ready_state().await;

        let kept = stage_photos(&state, vec![image("owl.jpg", 512), image("fox.jpg", 300)])
            .await
            .unwrap();
        assert_eq!(kept, 2);

        let results = submit(&state).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_filename, "owl.jpg");
        assert_eq!(results[0].details.scores.len(), 4);

        let session = state.session().read().await;
        match session.phase() {
            SessionPhase::Completed(applied) => assert_eq!(applied, &results),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submitting_without_a_selection_stays_local() {
        let api = Arc::new(InMemoryJudgeApi::with_defaults());
        let state = AppState::new(api.clone());

        stage_photos(&state, vec![image("a.jpg", 10)]).await.unwrap();
        let err = submit(&state).await.unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation("no competition selected".to_string())
        );
        assert_eq!(api.remote_calls().await, 0);
    }

    #[tokio::test]
    async fn submitting_without_enabled_criteria_stays_local() {
        let (api, state) = ready_state().await;
        {
            let mut catalog = state.catalog().write().await;
            let ids: Vec<i64> = catalog.criteria().iter().map(|c| c.id).collect();
            for id in ids {
                catalog.criteria_mut().remove(id);
            }
        }
        stage_photos(&state, vec![image("a.jpg", 10)]).await.unwrap();

        let calls_before = api.remote_calls().await;
        let err = submit(&state).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(api.remote_calls().await, calls_before);
    }

    #[tokio::test]
    async fn failed_submission_keeps_the_batch_and_can_retry() {
        let (api, state) = ready_state().await;
        stage_photos(&state, vec![image("a.jpg", 64)]).await.unwrap();

        api.inject_failure(InjectedFailure::Unreachable).await;
        let err = submit(&state).await.unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        {
            let session = state.session().read().await;
            match session.phase() {
                SessionPhase::Failed { photos, .. } => assert_eq!(photos.len(), 1),
                other => panic!("unexpected phase: {other:?}"),
            }
        }

        // The failed batch resubmits as-is.
        let results = submit(&state).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn single_criterion_batch_scores_each_image_on_it() {
        let api = Arc::new(InMemoryJudgeApi::new());
        let state = AppState::new(api);
        catalog_service::bootstrap(&state).await.unwrap();

        catalog_service::save_criterion(
            &state,
            None,
            CriterionDraft {
                name: "Sharpness".to_string(),
                description: "Edge-to-edge focus.".to_string(),
                weight: 1.0,
                enabled: true,
            },
        )
        .await
        .unwrap();
        for kind in [PromptKind::Evaluation, PromptKind::Reasoning] {
            catalog_service::save_prompt(
                &state,
                None,
                PromptDraft {
                    kind,
                    description: None,
                    template: "Template body".to_string(),
                    enabled: true,
                },
            )
            .await
            .unwrap();
        }
        let competition = catalog_service::save_competition(
            &state,
            None,
            CompetitionDraft {
                name: "Macro".to_string(),
                description: None,
                rules: None,
            },
        )
        .await
        .unwrap();
        navigation_service::select_competition(&state, competition.id)
            .await
            .unwrap();

        stage_photos(&state, vec![image("ant.jpg", 100), image("bee.jpg", 200)])
            .await
            .unwrap();
        let results = submit(&state).await.unwrap();

        assert_eq!(results.len(), 2);
        for judgement in &results {
            assert_eq!(judgement.details.scores.len(), 1);
            assert!(judgement.details.scores.contains_key("Sharpness"));
            assert!(judgement.details.rationales.contains_key("Sharpness"));
        }
    }

    #[tokio::test]
    async fn new_judgement_returns_to_idle() {
        let (_, state) = ready_state().await;
        stage_photos(&state, vec![image("a.jpg", 64)]).await.unwrap();
        submit(&state).await.unwrap();

        new_judgement(&state).await;
        let session = state.session().read().await;
        assert_eq!(session.phase(), &SessionPhase::Idle);
    }

    #[tokio::test]
    async fn submission_errors_name_the_backend_detail() {
        let (api, state) = ready_state().await;
        stage_photos(&state, vec![image("a.jpg", 64)]).await.unwrap();

        api.inject_failure(InjectedFailure::Status {
            status: 500,
            detail: "No enabled EVALUATION_PROMPT found. Please enable one in the settings."
                .to_string(),
        })
        .await;

        let err = submit(&state).await.unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: 500,
                message: "No enabled EVALUATION_PROMPT found. Please enable one in the settings."
                    .to_string(),
            }
        );
    }
}
