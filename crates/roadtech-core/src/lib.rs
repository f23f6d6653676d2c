//! # RoadTech Core
//!
//! The domain layer of the RoadTech client SDK.
//! This crate contains the marketplace's domain types and the ports the SDK
//! runs on, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::ApiError;
