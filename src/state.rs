use std::sync::Arc;

use axum::extract::FromRef;

use crate::{client::AssessmentApi, config::Config, storage::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub api: Arc<dyn AssessmentApi>,
    pub config: Config,
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
