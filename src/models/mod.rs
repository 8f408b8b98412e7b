// Module exports for models

pub mod dashboard;
pub mod pagination;
pub mod patient;
pub mod settings;
pub mod surgery;
pub mod user;

mod serde_ids;
