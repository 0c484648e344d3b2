//! Envelope types for reporting API results

pub mod response;

pub use response::ApiResponse;
