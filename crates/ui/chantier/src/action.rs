use api::{ApiError, Session};
use strum::Display;

use crate::form::{SelectOption, Submission};
use crate::resource::{DashboardStats, ResourceKind, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupResult {
    Confirmed,
    Cancelled,
}

/// Completion of a spawned backend call for one resource page.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    Loaded(Result<Vec<Row>, ApiError>),
    Saved(Result<(), ApiError>),
    Deleted(Result<(), ApiError>),
    LookupLoaded {
        field: String,
        result: Result<Vec<SelectOption>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    /// Ask before quitting.
    RequestQuit,
    Refresh,
    Error(String),
    Update,
    Submit,
    Navigate(usize),
    NextTab,
    PrevTab,
    PopupResult(PopupResult),
    FormSubmitted(Submission),
    FormCancelled,
    Resource(ResourceKind, ResourceEvent),
    DashboardLoaded(Result<DashboardStats, ApiError>),
    LoggedIn(Session),
    LoginFailed(String),
    Logout,
    SessionExpired,
}
