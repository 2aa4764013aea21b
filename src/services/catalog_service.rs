//! Catalog bootstrap and entity saves.
//!
//! Every mutation follows the same discipline: validate locally, call the
//! backend, then fold the entity the backend returned into the catalog under
//! one short write lock. Nothing is applied optimistically; when two clients
//! race, the catalog ends up holding whichever write the backend accepted
//! last.

use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dto::catalog::{CompetitionDraft, CriterionDraft, CriterionPatch, PromptDraft, PromptPatch},
    error::CoreError,
    state::{
        Availability, SharedState,
        model::{Competition, Criterion, EntityId, Prompt},
    },
};

/// Fetch the whole catalog and mark the client ready.
///
/// On failure the client is flagged unavailable and the error propagated.
pub async fn bootstrap(state: &SharedState) -> Result<(), CoreError> {
    let api = state.api();
    let outcome = async {
        let competitions = api.list_competitions().await?;
        let criteria = api.list_criteria().await?;
        let prompts = api.list_prompts().await?;
        Ok::<_, CoreError>((competitions, criteria, prompts))
    }
    .await;

    match outcome {
        Ok((competitions, criteria, prompts)) => {
            {
                let mut catalog = state.catalog().write().await;
                catalog.competitions_mut().set_all(competitions);
                catalog.criteria_mut().set_all(criteria);
                catalog.set_prompts(prompts);
            }
            {
                let catalog = state.catalog().read().await;
                let mut nav = state.nav().write().await;
                nav.adopt_first(catalog.competitions());
            }
            *state.availability().write().await = Availability::Ready;
            debug!("catalog bootstrapped");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "catalog bootstrap failed");
            *state.availability().write().await = Availability::Unavailable {
                message: err.to_string(),
            };
            Err(err)
        }
    }
}

/// Create (`id` is `None`) or update a competition and fold the backend's
/// row into the catalog.
pub async fn save_competition(
    state: &SharedState,
    id: Option<EntityId>,
    draft: CompetitionDraft,
) -> Result<Competition, CoreError> {
    draft.validate()?;
    let api = state.api();
    let saved = match id {
        None => api.create_competition(draft).await?,
        Some(id) => api.update_competition(id, draft.into_patch()).await?,
    };
    {
        let mut catalog = state.catalog().write().await;
        catalog.competitions_mut().upsert(saved.clone());
    }
    debug!(competition = saved.id, "competition saved");
    Ok(saved)
}

/// Delete a competition. If the selection has to move, the judging session
/// and history pane are dropped with it.
pub async fn delete_competition(state: &SharedState, id: EntityId) -> Result<(), CoreError> {
    state.api().delete_competition(id).await?;

    let fell_back = {
        let mut catalog = state.catalog().write().await;
        catalog.competitions_mut().remove(id);
        let mut nav = state.nav().write().await;
        nav.reconcile(catalog.competitions())
    };
    if fell_back {
        state.clear_competition_scope().await;
    }
    debug!(competition = id, fell_back, "competition deleted");
    Ok(())
}

/// Create (`id` is `None`) or update a criterion.
pub async fn save_criterion(
    state: &SharedState,
    id: Option<EntityId>,
    draft: CriterionDraft,
) -> Result<Criterion, CoreError> {
    draft.validate()?;
    let api = state.api();
    let saved = match id {
        None => api.create_criterion(draft).await?,
        Some(id) => api.update_criterion(id, draft.into_patch()).await?,
    };
    {
        let mut catalog = state.catalog().write().await;
        catalog.criteria_mut().upsert(saved.clone());
    }
    Ok(saved)
}

/// Flip one criterion's enabled flag through a partial update.
pub async fn toggle_criterion(state: &SharedState, id: EntityId) -> Result<Criterion, CoreError> {
    let enabled = {
        let catalog = state.catalog().read().await;
        let Some(criterion) = catalog.criteria().get(id) else {
            return Err(CoreError::Validation(format!(
                "criterion `{id}` is not in the catalog"
            )));
        };
        criterion.enabled
    };

    let patch = CriterionPatch {
        enabled: Some(!enabled),
        ..Default::default()
    };
    let saved = state.api().update_criterion(id, patch).await?;
    {
        let mut catalog = state.catalog().write().await;
        catalog.criteria_mut().upsert(saved.clone());
    }
    Ok(saved)
}

/// Delete a criterion.
pub async fn delete_criterion(state: &SharedState, id: EntityId) -> Result<(), CoreError> {
    state.api().delete_criterion(id).await?;
    let mut catalog = state.catalog().write().await;
    catalog.criteria_mut().remove(id);
    Ok(())
}

/// Create (`id` is `None`) or update a prompt.
///
/// Folding goes through the catalog's prompt rule, so enabling one prompt
/// locally disables its siblings of the same kind, matching what the backend
/// did on its side.
pub async fn save_prompt(
    state: &SharedState,
    id: Option<EntityId>,
    draft: PromptDraft,
) -> Result<Prompt, CoreError> {
    draft.validate()?;
    let api = state.api();
    let saved = match id {
        None => api.create_prompt(draft).await?,
        Some(id) => api.update_prompt(id, draft.into_patch()).await?,
    };
    {
        let mut catalog = state.catalog().write().await;
        catalog.apply_prompt(saved.clone());
    }
    Ok(saved)
}

/// Make `id` the enabled prompt of its kind.
pub async fn enable_prompt(state: &SharedState, id: EntityId) -> Result<Prompt, CoreError> {
    let patch = PromptPatch {
        enabled: Some(true),
        ..Default::default()
    };
    let saved = state.api().update_prompt(id, patch).await?;
    {
        let mut catalog = state.catalog().write().await;
        catalog.apply_prompt(saved.clone());
    }
    Ok(saved)
}

/// Delete a prompt.
pub async fn delete_prompt(state: &SharedState, id: EntityId) -> Result<(), CoreError> {
    state.api().delete_prompt(id).await?;
    let mut catalog = state.catalog().write().await;
    catalog.remove_prompt(id);
    Ok(())
}
