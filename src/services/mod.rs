//! Service layer for the backend API.
//!
//! `ApiClient` carries the HTTP plumbing; the endpoint methods live in one
//! module per backend area.

pub mod api_client;
mod doctors;
mod symptoms;

pub use api_client::{ApiClient, HealthReport};
