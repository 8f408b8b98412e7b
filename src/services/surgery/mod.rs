//! Surgery scheduling endpoints (`/api/scheduled-surgeries`).
//!
//! [`SurgeryApi`] is the seam the scheduling core talks to; [`SurgeryService`]
//! is the HTTP implementation.

use crate::models::surgery::{
    CreatePendingSurgeryRequest, SurgeryEnvelope, SurgeryListResponse, SurgeryQuery,
    SurgeryRecord, SurgeryStatus, UpdateStatusRequest, UpdateSurgeryRequest,
};
use crate::services::api::{path_segment, ApiClient, ApiError, MessageResponse};

const BASE_PATH: &str = "/api/scheduled-surgeries";

/// Page size used when loading the scheduling page
pub const SCHEDULE_PAGE_LIMIT: u32 = 100;

/// Upper bound on pages followed per status
pub const SCHEDULE_MAX_PAGES: u32 = 50;

#[cfg_attr(test, mockall::automock)]
pub trait SurgeryApi {
    fn list_surgeries(&self, query: &SurgeryQuery) -> Result<SurgeryListResponse, ApiError>;

    fn create_pending(
        &self,
        request: &CreatePendingSurgeryRequest,
    ) -> Result<SurgeryEnvelope, ApiError>;

    /// Partial update; only the fields set on the request are sent
    fn update_surgery(
        &self,
        id: &str,
        request: &UpdateSurgeryRequest,
    ) -> Result<SurgeryEnvelope, ApiError>;

    fn update_status(&self, id: &str, status: SurgeryStatus) -> Result<SurgeryEnvelope, ApiError>;

    /// Cancel the booking and return the request to the pending pool
    fn cancel_surgery(&self, id: &str) -> Result<MessageResponse, ApiError>;
}

/// Fetch both columns of the scheduling page
pub fn fetch_schedule(
    api: &dyn SurgeryApi,
) -> Result<(Vec<SurgeryRecord>, Vec<SurgeryRecord>), ApiError> {
    let pending = fetch_all_pages(api, SurgeryStatus::Pending)?;
    let scheduled = fetch_all_pages(api, SurgeryStatus::Scheduled)?;

    log::info!(
        "Loaded {} pending and {} scheduled surgeries",
        pending.len(),
        scheduled.len()
    );
    Ok((pending, scheduled))
}

/// Every record with `status`, following `pagination.hasNext`
fn fetch_all_pages(
    api: &dyn SurgeryApi,
    status: SurgeryStatus,
) -> Result<Vec<SurgeryRecord>, ApiError> {
    let mut query = SurgeryQuery::with_status(status);
    query.limit = Some(SCHEDULE_PAGE_LIMIT);

    let mut records = Vec::new();
    for page in 1..=SCHEDULE_MAX_PAGES {
        query.page = Some(page);
        let response = api.list_surgeries(&query)?;
        let received = response.surgeries.len();
        records.extend(response.surgeries);

        let has_next = response.pagination.map_or(false, |p| p.has_next);
        if !has_next || received == 0 {
            return Ok(records);
        }
    }

    log::warn!(
        "Stopped loading {} surgeries after {} pages",
        status.as_str(),
        SCHEDULE_MAX_PAGES
    );
    Ok(records)
}

pub struct SurgeryService<'a> {
    client: &'a ApiClient,
}

impl<'a> SurgeryService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", BASE_PATH, path_segment(id))
    }
}

impl SurgeryApi for SurgeryService<'_> {
    fn list_surgeries(&self, query: &SurgeryQuery) -> Result<SurgeryListResponse, ApiError> {
        self.client.get_with_query(BASE_PATH, &query.to_pairs())
    }

    fn create_pending(
        &self,
        request: &CreatePendingSurgeryRequest,
    ) -> Result<SurgeryEnvelope, ApiError> {
        self.client.post(&format!("{}/pending", BASE_PATH), request)
    }

    fn update_surgery(
        &self,
        id: &str,
        request: &UpdateSurgeryRequest,
    ) -> Result<SurgeryEnvelope, ApiError> {
        self.client.put(&Self::item_path(id), request)
    }

    fn update_status(&self, id: &str, status: SurgeryStatus) -> Result<SurgeryEnvelope, ApiError> {
        self.client.patch(
            &format!("{}/status", Self::item_path(id)),
            &UpdateStatusRequest { status },
        )
    }

    fn cancel_surgery(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.client.delete(&Self::item_path(id))
    }
}
