//! Patient registry endpoints (`/api/patients`).

use crate::models::patient::{
    CreatePatientRequest, Patient, PatientEnvelope, PatientForm, PatientFormErrors,
    PatientListResponse, PatientQuery, PatientStats, UpdatePatientRequest,
};
use crate::services::api::{path_segment, ApiClient, ApiError, MessageResponse};

const BASE_PATH: &str = "/api/patients";

/// Outcome of submitting the patient modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientSubmitError {
    /// Rejected before sending
    Invalid(PatientFormErrors),
    Api(ApiError),
}

impl From<ApiError> for PatientSubmitError {
    fn from(err: ApiError) -> Self {
        PatientSubmitError::Api(err)
    }
}

pub struct PatientService<'a> {
    client: &'a ApiClient,
}

impl<'a> PatientService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", BASE_PATH, path_segment(id))
    }

    pub fn list(&self, query: &PatientQuery) -> Result<PatientListResponse, ApiError> {
        self.client.get_with_query(BASE_PATH, &query.to_pairs())
    }

    pub fn get(&self, id: &str) -> Result<Patient, ApiError> {
        self.client
            .get::<PatientEnvelope>(&Self::item_path(id))
            .map(|envelope| envelope.patient)
    }

    pub fn stats(&self) -> Result<PatientStats, ApiError> {
        self.client.get(&format!("{}/stats", BASE_PATH))
    }

    pub fn create(&self, request: &CreatePatientRequest) -> Result<Patient, ApiError> {
        let envelope: PatientEnvelope = self.client.post(BASE_PATH, request)?;
        log::info!("Registered patient {}", envelope.patient.id);
        Ok(envelope.patient)
    }

    pub fn update(&self, id: &str, request: &UpdatePatientRequest) -> Result<Patient, ApiError> {
        self.client
            .put::<_, PatientEnvelope>(&Self::item_path(id), request)
            .map(|envelope| envelope.patient)
    }

    pub fn delete(&self, id: &str) -> Result<MessageResponse, ApiError> {
        log::info!("Deleting patient {}", id);
        self.client.delete(&Self::item_path(id))
    }

    /// Validate the modal and create or update accordingly
    pub fn submit(&self, form: &PatientForm, existing_id: Option<&str>) -> Result<Patient, PatientSubmitError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(PatientSubmitError::Invalid(errors));
        }

        let patient = match existing_id {
            Some(id) => self.update(id, &form.to_update_request())?,
            None => self.create(&form.to_create_request())?,
        };
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_invalid_form_is_rejected_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let service = PatientService::new(&client);
        let form = PatientForm {
            full_name: String::new(),
            rut: "123".to_string(),
            email: "x".to_string(),
            phone: String::new(),
        };

        match service.submit(&form, None) {
            Err(PatientSubmitError::Invalid(errors)) => {
                assert!(errors.full_name.is_some());
                assert!(errors.rut.is_some());
                assert!(errors.email.is_some());
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_item_path() {
        assert_eq!(PatientService::item_path("8"), "/api/patients/8");
    }
}
