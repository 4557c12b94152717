//! REST collaborator for the chantier back office.
//!
//! The crate exposes a constructed [`ApiClient`] (no global state) that holds the
//! bearer credential through an injected [`CredentialStore`], the [`ResourceApi`]
//! seam the UI is generic over, and the login and registration calls that
//! produce a [`Session`].

mod auth;
mod client;
mod credentials;
mod error;
mod resource;

pub use auth::{LoginRequest, RegisterRequest, login_endpoint, register_endpoint};
pub use client::{ApiClient, ClientOptions, DEFAULT_BASE_URL, SessionEvent};
pub use credentials::{CredentialError, CredentialStore, Session};
pub use error::ApiError;
pub use resource::{ResourceApi, rows_from_body};
