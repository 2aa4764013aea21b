//! Competition selection, panes, and URL restore.

use tracing::debug;

use crate::{
    error::CoreError,
    state::{
        SharedState,
        model::EntityId,
        navigation::{NavState, View},
    },
};

/// Switch to another competition.
///
/// Moving to a different competition drops the judging session and history
/// pane; reselecting the current one keeps them.
pub async fn select_competition(state: &SharedState, id: EntityId) -> Result<(), CoreError> {
    let changed = {
        let catalog = state.catalog().read().await;
        let mut nav = state.nav().write().await;
        let previous = nav.selected_competition();
        nav.select(id, catalog.competitions())
            .map_err(|err| CoreError::Validation(err.to_string()))?;
        previous != Some(id)
    };
    if changed {
        state.clear_competition_scope().await;
        debug!(competition = id, "competition selected");
    }
    Ok(())
}

/// Show another pane for the selected competition.
pub async fn set_view(state: &SharedState, view: View) {
    state.nav().write().await.set_view(view);
}

/// Query string for the current location.
pub async fn current_url(state: &SharedState) -> String {
    state.nav().read().await.encode()
}

/// Restore navigation from a query string.
///
/// A URL naming a competition that is no longer in the catalog falls back to
/// the first catalog entry; with an empty catalog the client ends up
/// unselected. Moving to a different competition rescopes the session and
/// history, same as an explicit selection.
pub async fn restore_from_url(state: &SharedState, url: &str) -> NavState {
    let mut restored = NavState::decode(url);
    let changed = {
        let catalog = state.catalog().read().await;
        restored.reconcile(catalog.competitions());
        if restored == NavState::Unselected {
            restored.adopt_first(catalog.competitions());
        }
        let mut nav = state.nav().write().await;
        let previous = nav.selected_competition();
        *nav = restored;
        previous != restored.selected_competition()
    };
    if changed {
        state.clear_competition_scope().await;
    }
    restored
}
