// Patient module
// Patient registry model, requests and client-side form validation

use serde::{Deserialize, Serialize};

use super::pagination::Pagination;
use super::serde_ids;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(deserialize_with = "serde_ids::id")]
    pub id: String,
    pub full_name: String,
    pub rut: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Patient {
    /// Case-insensitive match against name, RUT, email and phone
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.full_name.to_lowercase().contains(&term)
            || self.rut.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.phone.contains(&term)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub rut: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePatientRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PatientListResponse {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatientEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(alias = "data")]
    pub patient: Patient,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PatientStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Filters for `GET /api/patients`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl PatientQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        pairs
    }
}

/// Editable patient form; mirrors the modal fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientForm {
    pub full_name: String,
    pub rut: String,
    pub email: String,
    pub phone: String,
}

/// Per-field validation messages; empty when the form is valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFormErrors {
    pub full_name: Option<String>,
    pub rut: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PatientFormErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.rut.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

impl PatientForm {
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            full_name: patient.full_name.clone(),
            rut: patient.rut.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
        }
    }

    pub fn validate(&self) -> PatientFormErrors {
        let mut errors = PatientFormErrors::default();

        if self.full_name.trim().is_empty() {
            errors.full_name = Some("El nombre es requerido".to_string());
        }

        if self.rut.trim().is_empty() {
            errors.rut = Some("El RUT es requerido".to_string());
        } else if !is_valid_rut(self.rut.trim()) {
            errors.rut = Some("El formato del RUT no es válido (ej: 12345678-9)".to_string());
        }

        if self.email.trim().is_empty() {
            errors.email = Some("El email es requerido".to_string());
        } else if !is_valid_email(self.email.trim()) {
            errors.email = Some("El formato del email no es válido".to_string());
        }

        if self.phone.trim().is_empty() {
            errors.phone = Some("El teléfono es requerido".to_string());
        }

        errors
    }

    pub fn to_create_request(&self) -> CreatePatientRequest {
        let phone = self.phone.trim();
        CreatePatientRequest {
            full_name: self.full_name.trim().to_string(),
            rut: self.rut.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }

    /// Only name and phone are editable once a patient exists
    pub fn to_update_request(&self) -> UpdatePatientRequest {
        UpdatePatientRequest {
            full_name: Some(self.full_name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
        }
    }
}

/// Basic Chilean RUT shape: digits, a dash, then a digit or `k`
pub fn is_valid_rut(rut: &str) -> bool {
    let Some((body, verifier)) = rut.rsplit_once(['-', '‐']) else {
        return false;
    };
    let mut verifier_chars = verifier.chars();
    let check = match (verifier_chars.next(), verifier_chars.next()) {
        (Some(c), None) => c,
        _ => return false,
    };
    !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit())
        && (check.is_ascii_digit() || check == 'k' || check == 'K')
}

/// `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}
