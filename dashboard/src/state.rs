use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use volume::visibility::VisibilityNotifier;

use crate::charts::ChartState;

pub struct AppState {
    pub chart: Arc<RwLock<ChartState>>,
    pub visibility: VisibilityNotifier,
    /// Set once the session stops with an error; shown in place of the chart.
    pub failure: RwLock<Option<String>>,
    pub max_width: u32,
}

impl AppState {
    pub fn new(visibility: VisibilityNotifier, max_width: u32) -> Self {
        AppState {
            chart: Arc::new(RwLock::new(ChartState::default())),
            visibility,
            failure: RwLock::new(None),
            max_width,
        }
    }

    pub fn chart(&self) -> RwLockReadGuard<'_, ChartState> {
        self.chart.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn failure(&self) -> Option<String> {
        self.failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fail(&self, message: String) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }
}
