//! Dashboard aggregates (`/api/dashboard/*`) and their auto-refresh.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::models::dashboard::{
    AnalyticsPeriod, DashboardAlerts, DashboardSnapshot, DashboardStats, DoctorPerformance,
    PatientAnalytics, RealtimeDashboard, RevenueAnalytics, RoomUtilization, SurgeryAnalytics,
};
use crate::services::api::{ApiClient, ApiError};
use crate::services::polling::{InFlightGate, PeriodicTask};
use crate::utils::date::day_key;

const BASE_PATH: &str = "/api/dashboard";

pub struct DashboardService<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn fetch<T: DeserializeOwned>(&self, endpoint: &str, pairs: &[(&str, String)]) -> Result<T, ApiError> {
        self.client
            .get_with_query(&format!("{}/{}", BASE_PATH, endpoint), pairs)
    }

    pub fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.fetch("stats", &[])
    }

    pub fn surgery_analytics(&self, period: AnalyticsPeriod) -> Result<SurgeryAnalytics, ApiError> {
        self.fetch("surgery-analytics", &[("period", period.as_str().to_string())])
    }

    pub fn patient_analytics(&self) -> Result<PatientAnalytics, ApiError> {
        self.fetch("patient-analytics", &[])
    }

    pub fn doctor_performance(&self) -> Result<DoctorPerformance, ApiError> {
        self.fetch("doctor-performance", &[])
    }

    /// Room usage for one day
    pub fn room_utilization(&self, date: NaiveDate) -> Result<RoomUtilization, ApiError> {
        self.fetch(
            "room-utilization",
            &[("date", day_key(date)), ("period", "day".to_string())],
        )
    }

    pub fn revenue_analytics(&self) -> Result<RevenueAnalytics, ApiError> {
        self.fetch("revenue-analytics", &[])
    }

    pub fn realtime(&self) -> Result<RealtimeDashboard, ApiError> {
        self.fetch("realtime", &[])
    }

    pub fn alerts(&self) -> Result<DashboardAlerts, ApiError> {
        self.fetch("alerts", &[])
    }

    /// Fetch every panel; any failure fails the whole refresh
    pub fn snapshot(&self) -> Result<DashboardSnapshot, ApiError> {
        let snapshot = DashboardSnapshot {
            stats: Some(self.stats()?),
            surgery_analytics: Some(self.surgery_analytics(AnalyticsPeriod::Month)?),
            patient_analytics: Some(self.patient_analytics()?),
            doctor_performance: Some(self.doctor_performance()?),
            room_utilization: Some(self.room_utilization(Utc::now().date_naive())?),
            revenue_analytics: Some(self.revenue_analytics()?),
            realtime: Some(self.realtime()?),
            alerts: Some(self.alerts()?),
        };
        log::debug!("Dashboard snapshot refreshed");
        Ok(snapshot)
    }
}

type SnapshotFetcher = dyn Fn() -> Result<DashboardSnapshot, ApiError> + Send + Sync;

/// Periodic dashboard refresh.
///
/// Ticks and manual refreshes share one gate: while a fetch is running, a new
/// tick is skipped rather than queued. Results are picked up with [`Self::poll`].
pub struct DashboardPoller {
    fetcher: Arc<SnapshotFetcher>,
    gate: InFlightGate,
    sender: Sender<Result<DashboardSnapshot, ApiError>>,
    results: Receiver<Result<DashboardSnapshot, ApiError>>,
    task: Option<PeriodicTask>,
}

impl DashboardPoller {
    pub fn new<F>(fetcher: F) -> Self
    where
        F: Fn() -> Result<DashboardSnapshot, ApiError> + Send + Sync + 'static,
    {
        let (sender, results) = mpsc::channel();
        Self {
            fetcher: Arc::new(fetcher),
            gate: InFlightGate::new(),
            sender,
            results,
            task: None,
        }
    }

    /// Poller backed by the live backend
    pub fn for_client(client: ApiClient) -> Self {
        Self::new(move || DashboardService::new(&client).snapshot())
    }

    /// Start periodic refresh; an initial refresh is issued right away
    pub fn start(&mut self, period: Duration) {
        self.stop();
        self.refresh_now();

        let fetcher = Arc::clone(&self.fetcher);
        let gate = self.gate.clone();
        let sender = self.sender.clone();
        self.task = Some(PeriodicTask::spawn(
            "dashboard-refresh",
            period,
            move || run_gated(&gate, fetcher.as_ref(), &sender),
        ));
        log::info!("Dashboard auto-refresh every {:?}", period);
    }

    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(PeriodicTask::is_running)
    }

    /// Refresh now on a worker thread; `false` if a fetch is already running
    pub fn refresh_now(&self) -> bool {
        let Some(guard) = self.gate.try_begin() else {
            log::debug!("Dashboard refresh already in flight");
            return false;
        };

        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = (*fetcher)();
            drop(guard);
            let _ = sender.send(result);
        });
        true
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_busy()
    }

    /// Latest finished result, if any arrived since the last call
    pub fn poll(&self) -> Option<Result<DashboardSnapshot, ApiError>> {
        self.results.try_iter().last()
    }
}

impl Drop for DashboardPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_gated(
    gate: &InFlightGate,
    fetcher: &SnapshotFetcher,
    sender: &Sender<Result<DashboardSnapshot, ApiError>>,
) {
    let Some(guard) = gate.try_begin() else {
        log::debug!("Skipping dashboard tick: previous refresh still running");
        return;
    };
    let result = fetcher();
    drop(guard);
    if let Err(err) = &result {
        log::warn!("Dashboard refresh failed: {}", err);
    }
    let _ = sender.send(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn wait_for_result(poller: &DashboardPoller) -> Option<Result<DashboardSnapshot, ApiError>> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(result) = poller.poll() {
                return Some(result);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_manual_refresh_delivers_snapshot() {
        let poller = DashboardPoller::new(|| Ok(DashboardSnapshot::default()));
        assert!(poller.refresh_now());
        assert_eq!(wait_for_result(&poller), Some(Ok(DashboardSnapshot::default())));
    }

    #[test]
    fn test_refresh_skipped_while_in_flight() {
        let poller = DashboardPoller::new(|| {
            thread::sleep(Duration::from_millis(100));
            Ok(DashboardSnapshot::default())
        });
        assert!(poller.refresh_now());
        assert!(poller.is_loading());
        assert!(!poller.refresh_now());
        assert!(wait_for_result(&poller).is_some());
        assert!(!poller.is_loading());
    }

    #[test]
    fn test_ticks_never_overlap() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (active_in, peak_in) = (Arc::clone(&active), Arc::clone(&peak));

        let mut poller = DashboardPoller::new(move || {
            let now = active_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            active_in.fetch_sub(1, Ordering::SeqCst);
            Err(ApiError::Network("sin conexión".to_string()))
        });
        poller.start(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(150));
        poller.stop();

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(matches!(poller.poll(), Some(Err(ApiError::Network(_)))));
    }
}
