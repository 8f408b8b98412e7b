//! Screen bodies. Each `show` draws one screen and returns the actions the
//! user asked for; the app turns those into background jobs.

pub mod auth;
pub mod dashboard;
pub(crate) mod palette;
pub mod patients;
pub mod profile;
mod room_grid;
pub mod schedule;
pub mod users;
mod widgets;
