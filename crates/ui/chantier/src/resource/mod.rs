//! Resources managed by the back office and the request lifecycle around
//! their collections.

pub mod catalog;
pub mod format;
mod lifecycle;
mod lookup;
mod messages;
mod stats;

pub use crate::table::Row;
pub use catalog::{ResourceDef, ResourceKind};
pub use lifecycle::{
    CollectionState, Confirmation, DeleteOutcome, DeleteRequest, Endpoint, ResourceLifecycle,
    SaveOutcome, WriteTarget, fetch, remove, write,
};
pub use lookup::{Lookup, LookupOptions, load_lookup, reference_field};
pub use messages::ResourceMessages;
pub use stats::{DASHBOARD_LOAD_FAILED, DashboardStats, load_dashboard};
