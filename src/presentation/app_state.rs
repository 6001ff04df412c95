// Application state for HTTP handlers
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::presentation::dashboard_store::DashboardStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DashboardStore>,
    pub scheduler: Arc<RefreshScheduler>,
}
