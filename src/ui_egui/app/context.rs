use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::models::settings::AppConfig;
use crate::services::api::ApiClient;
use crate::services::dashboard::DashboardPoller;
use crate::services::session::{SessionEvent, SessionMonitor, SessionService};

/// Shared access point for the services the app modules need
pub struct AppContext {
    config: AppConfig,
    session: SessionService,
    session_events: Receiver<SessionEvent>,
    monitor: Option<SessionMonitor>,
    dashboard: DashboardPoller,
}

impl AppContext {
    pub fn new(config: AppConfig, mut session: SessionService) -> Self {
        let session_events = session.subscribe();
        let dashboard = DashboardPoller::for_client(session.client().clone());
        Self {
            config,
            session,
            session_events,
            monitor: None,
            dashboard,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionService {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionService {
        &mut self.session
    }

    /// Handle for a background job; shares the session token
    pub fn client(&self) -> ApiClient {
        self.session.client().clone()
    }

    pub fn drain_session_events(&self) -> Vec<SessionEvent> {
        self.session_events.try_iter().collect()
    }

    pub fn dashboard(&self) -> &DashboardPoller {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut DashboardPoller {
        &mut self.dashboard
    }

    pub fn dashboard_period(&self) -> Duration {
        Duration::from_secs(self.config.dashboard_refresh_secs)
    }

    /// (Re)start token checks for the current session
    pub fn start_monitor(&mut self) {
        self.stop_monitor();
        let Some(token) = self.session.token().map(str::to_string) else {
            return;
        };
        let period = Duration::from_secs(self.config.session_check_secs);
        self.monitor = Some(SessionMonitor::for_client(self.client(), token, period));
    }

    pub fn stop_monitor(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.stop();
        }
    }

    pub fn poll_monitor(&self) -> Option<String> {
        self.monitor.as_ref().and_then(SessionMonitor::poll)
    }
}
