// Service module exports
// Backend access, session handling and background work

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod patient;
pub mod polling;
pub mod session;
pub mod settings;
pub mod surgery;
pub mod user;
