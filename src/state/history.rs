//! Past-judgement pane for the selected competition.
//!
//! Each load gets a [`LoadToken`]; only the fetch holding the current token
//! may fill the pane. Switching competitions mid-fetch issues a new token,
//! so the late response for the old competition can never leak into the new
//! one's view.

use uuid::Uuid;

use crate::state::model::{EntityId, Judgement};

/// Load state of the pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryStatus {
    /// No load attempted for the current scope.
    #[default]
    Idle,
    /// Fetch in flight.
    Loading,
    /// Entries are current.
    Ready,
    /// Fetch failed.
    Failed {
        /// Operator-facing failure message.
        message: String,
    },
}

/// Proof of the fetch currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken {
    id: Uuid,
    scope: EntityId,
}

/// Judgement history for one competition.
#[derive(Debug, Default)]
pub struct HistoryPane {
    scope: Option<EntityId>,
    entries: Vec<Judgement>,
    status: HistoryStatus,
    pending: Option<LoadToken>,
}

impl HistoryPane {
    /// Competition the pane is scoped to.
    pub fn scope(&self) -> Option<EntityId> {
        self.scope
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[Judgement] {
        &self.entries
    }

    /// Current load state.
    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    /// Scope the pane to `competition_id` and start a load.
    ///
    /// Replaces any token still in flight, so an earlier fetch that has not
    /// landed yet becomes stale.
    pub fn begin_load(&mut self, competition_id: EntityId) -> LoadToken {
        self.scope = Some(competition_id);
        self.entries.clear();
        self.status = HistoryStatus::Loading;
        let token = LoadToken {
            id: Uuid::new_v4(),
            scope: competition_id,
        };
        self.pending = Some(token);
        token
    }

    /// Fill the pane from the fetch holding `token`, newest entry first.
    ///
    /// Returns `false` when the token is stale; the entries are discarded.
    pub fn finish(&mut self, token: LoadToken, mut entries: Vec<Judgement>) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.entries = entries;
        self.status = HistoryStatus::Ready;
        self.pending = None;
        true
    }

    /// Record a failed fetch for the load holding `token`.
    pub fn fail(&mut self, token: LoadToken, message: String) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.status = HistoryStatus::Failed { message };
        self.pending = None;
        true
    }

    /// Drop the scope, entries, and any in-flight token.
    pub fn clear(&mut self) {
        self.scope = None;
        self.entries.clear();
        self.status = HistoryStatus::Idle;
        self.pending = None;
    }

    /// Remove one entry by judgement id.
    pub fn remove(&mut self, judgement_id: EntityId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|j| j.id != judgement_id);
        before != self.entries.len()
    }
}
