//! Competition selection and the URL query codec.
//!
//! Navigation is either unselected or pinned to one competition plus a pane.
//! [`NavState::encode`] and [`NavState::decode`] round-trip the state through
//! a query string so a session can be restored from a shared link.

use thiserror::Error;

use crate::state::{
    model::{Competition, EntityId},
    store::Collection,
};

/// Pane shown for the selected competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Staging and submitting photos.
    #[default]
    Upload,
    /// Past judgements for the competition.
    History,
}

impl View {
    /// Query-string value for the pane.
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Upload => "upload",
            View::History => "history",
        }
    }

    /// Parse a query-string value, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("upload") {
            Some(View::Upload)
        } else if raw.eq_ignore_ascii_case("history") {
            Some(View::History)
        } else {
            None
        }
    }
}

/// Selection target that is not part of the current catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("competition `{id}` is not in the catalog")]
pub struct UnknownCompetition {
    /// The rejected competition id.
    pub id: EntityId,
}

/// Where the operator currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// No competition picked yet (empty catalog or fresh start).
    #[default]
    Unselected,
    /// Working inside one competition.
    Selected {
        /// Catalog id of the active competition.
        competition_id: EntityId,
        /// Pane shown for it.
        view: View,
    },
}

impl NavState {
    /// Id of the active competition, if any.
    pub fn selected_competition(&self) -> Option<EntityId> {
        match self {
            NavState::Unselected => None,
            NavState::Selected { competition_id, .. } => Some(*competition_id),
        }
    }

    /// Active pane, if a competition is selected.
    pub fn view(&self) -> Option<View> {
        match self {
            NavState::Unselected => None,
            NavState::Selected { view, .. } => Some(*view),
        }
    }

    /// Pick the first catalog entry when nothing is selected yet.
    ///
    /// Returns whether a selection was made.
    pub fn adopt_first(&mut self, competitions: &Collection<Competition>) -> bool {
        if matches!(self, NavState::Selected { .. }) {
            return false;
        }
        match competitions.first() {
            Some(first) => {
                *self = NavState::Selected {
                    competition_id: first.id,
                    view: View::Upload,
                };
                true
            }
            None => false,
        }
    }

    /// Switch to the given competition, keeping the current pane.
    pub fn select(
        &mut self,
        id: EntityId,
        competitions: &Collection<Competition>,
    ) -> Result<(), UnknownCompetition> {
        if !competitions.contains(id) {
            return Err(UnknownCompetition { id });
        }
        let view = self.view().unwrap_or_default();
        *self = NavState::Selected {
            competition_id: id,
            view,
        };
        Ok(())
    }

    /// Change the pane; no-op while nothing is selected.
    pub fn set_view(&mut self, view: View) {
        if let NavState::Selected { view: current, .. } = self {
            *current = view;
        }
    }

    /// Drop a selection that no longer exists in the catalog.
    ///
    /// Falls back to unselected rather than ever pointing at a dangling id.
    /// Returns whether the selection was dropped.
    pub fn reconcile(&mut self, competitions: &Collection<Competition>) -> bool {
        let NavState::Selected { competition_id, .. } = *self else {
            return false;
        };
        if competitions.contains(competition_id) {
            return false;
        }
        *self = NavState::Unselected;
        true
    }

    /// Render the state as a query string; empty when unselected.
    pub fn encode(&self) -> String {
        match self {
            NavState::Unselected => String::new(),
            NavState::Selected {
                competition_id,
                view,
            } => format!("competition={competition_id}&view={}", view.as_str()),
        }
    }

    /// Parse a query string back into a state.
    ///
    /// Unknown keys and malformed values are ignored; a missing or invalid
    /// competition id yields [`NavState::Unselected`], a missing pane falls
    /// back to [`View::Upload`].
    pub fn decode(raw: &str) -> Self {
        let raw = raw.trim_start_matches('?');
        let mut competition = None;
        let mut view = None;
        for pair in raw.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "competition" => competition = value.parse::<EntityId>().ok(),
                "view" => view = View::parse(value),
                _ => {}
            }
        }
        match competition {
            Some(competition_id) => NavState::Selected {
                competition_id,
                view: view.unwrap_or_default(),
            },
            None => NavState::Unselected,
        }
    }
}
