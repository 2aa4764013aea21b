//! Judgement history loading and deletion.

use tracing::debug;

use crate::{
    error::CoreError,
    state::{SharedState, model::EntityId},
};

/// Load the judgement history for `competition_id` into the pane.
///
/// The pane is rescoped and emptied up front; the fetched entries land only
/// if no newer load started in the meantime.
pub async fn load(state: &SharedState, competition_id: EntityId) -> Result<(), CoreError> {
    let token = state.history().write().await.begin_load(competition_id);

    match state.api().list_judgements(competition_id).await {
        Ok(entries) => {
            let mut pane = state.history().write().await;
            if !pane.finish(token, entries) {
                debug!(competition = competition_id, "discarding entries of a stale fetch");
            }
            Ok(())
        }
        Err(err) => {
            let core: CoreError = err.into();
            let mut pane = state.history().write().await;
            if !pane.fail(token, core.to_string()) {
                debug!(competition = competition_id, "discarding failure of a stale fetch");
            }
            Err(core)
        }
    }
}

/// Delete one judgement remotely, then drop it from the pane.
///
/// When the backend refuses, the entry stays put.
pub async fn delete_judgement(state: &SharedState, id: EntityId) -> Result<(), CoreError> {
    state.api().delete_judgement(id).await?;
    let mut pane = state.history().write().await;
    if !pane.remove(id) {
        debug!(judgement = id, "deleted judgement was not in the pane");
    }
    Ok(())
}
