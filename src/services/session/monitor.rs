use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use super::token::{validate_token, TokenValidation};
use crate::services::api::ApiClient;
use crate::services::auth::AuthService;
use crate::services::polling::PeriodicTask;

/// Re-validates the session token on a fixed period.
///
/// Rejections are reported through [`Self::poll`]; the owner decides what to do
/// with them. Dropping the monitor stops it.
pub struct SessionMonitor {
    task: PeriodicTask,
    rejections: Receiver<String>,
}

impl SessionMonitor {
    pub fn start<F>(period: Duration, mut check: F) -> Self
    where
        F: FnMut() -> TokenValidation + Send + 'static,
    {
        let (sender, rejections) = mpsc::channel();
        let task = PeriodicTask::spawn("session-monitor", period, move || {
            if let TokenValidation::Invalid(reason) = check() {
                log::warn!("Session token rejected: {}", reason);
                let _ = sender.send(reason);
            }
        });
        Self { task, rejections }
    }

    /// Monitor `token` against the live backend
    pub fn for_client(client: ApiClient, token: String, period: Duration) -> Self {
        Self::start(period, move || {
            validate_token(&token, &AuthService::new(&client))
        })
    }

    /// First rejection reason received since the last call
    pub fn poll(&self) -> Option<String> {
        self.rejections.try_iter().next()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    pub fn stop(mut self) {
        self.task.cancel();
    }
}
