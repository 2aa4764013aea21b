//! Competition guideline generation.

use tracing::warn;

use crate::{error::CoreError, state::SharedState};

/// Ask the backend to draft judging guidelines for `competition_name`.
///
/// Pure request/response: no client state is touched, the caller decides
/// where the text goes.
pub async fn generate(state: &SharedState, competition_name: &str) -> Result<String, CoreError> {
    let trimmed = competition_name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "competition name must not be empty".to_string(),
        ));
    }

    state
        .api()
        .generate_guidelines(trimmed.to_string())
        .await
        .map_err(|err| {
            let core: CoreError = err.into();
            warn!(error = %core, "guideline generation failed");
            core
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        api::{JudgeApi, memory::InMemoryJudgeApi},
        dto::catalog::PromptPatch,
        state::{AppState, model::PromptKind},
    };

    #[tokio::test]
    async fn blank_name_never_reaches_the_backend() {
        let api = Arc::new(InMemoryJudgeApi::with_defaults());
        let state = AppState::new(api.clone());

        let err = generate(&state, "   ").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(api.remote_calls().await, 0);
    }

    #[tokio::test]
    async fn generated_text_passes_through() {
        let api = Arc::new(InMemoryJudgeApi::with_defaults());
        let state = AppState::new(api);

        let guidelines = generate(&state, "  Winter Light  ").await.unwrap();
        assert!(guidelines.contains("Winter Light"));
    }

    #[tokio::test]
    async fn backend_rejection_propagates() {
        let api = Arc::new(InMemoryJudgeApi::with_defaults());
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
        let state = AppState::new(api);

        let err = generate(&state, "Winter Light").await.unwrap_err();
        assert_eq!(
            err,
            CoreError::Remote {
                status: 500,
                message: "No enabled RULES_SYNTHESIS_PROMPT found.".to_string(),
            }
        );
    }
}
