//! Client-side state shared by every view.

pub mod history;
pub mod model;
pub mod navigation;
pub mod session;
pub mod store;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    api::JudgeApi,
    state::{
        history::HistoryPane, model::EntityId, navigation::NavState, session::JudgingSession,
        store::Catalog,
    },
};

/// Shared handle to the whole client state.
pub type SharedState = Arc<AppState>;

/// Whether the catalog made it down from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Availability {
    /// Bootstrap has not finished yet.
    #[default]
    Pending,
    /// Catalog loaded; the client is usable.
    Ready,
    /// Bootstrap failed; nothing remote should be attempted.
    Unavailable {
        /// Operator-facing failure message.
        message: String,
    },
}

/// Central client state: the backend handle plus every piece of view state.
pub struct AppState {
    api: Arc<dyn JudgeApi>,
    availability: RwLock<Availability>,
    catalog: RwLock<Catalog>,
    nav: RwLock<NavState>,
    session: RwLock<JudgingSession>,
    history: RwLock<HistoryPane>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    pub fn new(api: Arc<dyn JudgeApi>) -> SharedState {
        Arc::new(Self {
            api,
            availability: RwLock::new(Availability::Pending),
            catalog: RwLock::new(Catalog::new()),
            nav: RwLock::new(NavState::default()),
            session: RwLock::new(JudgingSession::default()),
            history: RwLock::new(HistoryPane::default()),
        })
    }

    /// Handle to the backend adapter.
    pub fn api(&self) -> Arc<dyn JudgeApi> {
        Arc::clone(&self.api)
    }

    /// Bootstrap outcome.
    pub fn availability(&self) -> &RwLock<Availability> {
        &self.availability
    }

    /// Entity catalog.
    pub fn catalog(&self) -> &RwLock<Catalog> {
        &self.catalog
    }

    /// Competition selection and pane.
    pub fn nav(&self) -> &RwLock<NavState> {
        &self.nav
    }

    /// Judging session for the selected competition.
    pub fn session(&self) -> &RwLock<JudgingSession> {
        &self.session
    }

    /// History pane for the selected competition.
    pub fn history(&self) -> &RwLock<HistoryPane> {
        &self.history
    }

    /// Whether bootstrap succeeded.
    pub async fn is_ready(&self) -> bool {
        *self.availability.read().await == Availability::Ready
    }

    /// Competition the operator is working in, if any.
    pub async fn selected_competition(&self) -> Option<EntityId> {
        self.nav.read().await.selected_competition()
    }

    /// Drop all per-competition state. Called whenever the selection moves to
    /// a different competition, so nothing from the old scope leaks into the
    /// new one.
    pub async fn clear_competition_scope(&self) {
        self.session.write().await.reset();
        self.history.write().await.clear();
    }
}
