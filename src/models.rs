use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const NO_ETA_LABEL: &str = "No ETA";

/// A single task as the client sees it. `id` is opaque: depending on when
/// the task was created it may be a server-assigned string or a numeric
/// timestamp minted by an earlier client release. It is never recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub eta: Option<String>,
    pub completed: bool,
}

/// Outcome of the most recent full-collection sync. Not persisted, and it
/// never gates per-task operations.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncStatus {
    Idle,
    Success(String),
    Error(String),
}

impl SyncStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            SyncStatus::Idle => None,
            SyncStatus::Success(msg) | SyncStatus::Error(msg) => Some(msg),
        }
    }
}

/// Scratch fields for the one task that may be in edit mode.
#[derive(Clone, Debug, PartialEq)]
pub struct EditDraft {
    pub id: String,
    pub title: String,
    pub eta: String,
}

#[derive(Clone, Copy, PartialEq)]
pub enum Screen {
    Login,
    Tasks,
}

#[derive(Clone, Copy, PartialEq)]
pub enum InputMode {
    Navigate,
    Compose,
    Edit,
}

#[derive(Clone, Copy, PartialEq)]
pub enum Field {
    Title,
    Eta,
}

#[derive(Clone, Copy, PartialEq)]
pub enum LoginField {
    Username,
    Password,
}

/// Renders an optional ETA for display. Accepts the timestamp shapes a
/// browser datetime input or the server may have produced; anything
/// unparseable is shown as-is rather than dropped.
pub fn format_eta(eta: Option<&str>) -> String {
    let Some(raw) = eta else {
        return NO_ETA_LABEL.to_string();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }

    raw.to_string()
}
