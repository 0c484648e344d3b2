//! Client for the Health Beacon symptom checker.
//!
//! Talks to the symptom-analysis backend, looks up doctors near the user,
//! and walks through the three-page flow (symptoms → results → doctors).

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod geolocation;
pub mod logging;
pub mod render;
pub mod services;

#[cfg(test)]
mod test_support;

pub use error::{ApiError, PageError, ValidationError};
pub use services::ApiClient;
