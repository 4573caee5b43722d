use time::{Date, macros::format_description};

/// Group payloads.
pub mod group;
/// Health check payload.
pub mod health;
/// Session payloads and projections.
pub mod session;
/// User payloads and projections.
pub mod user;
/// Custom field validators.
pub mod validation;

fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "invalid-date".into())
}
