//! # API Shared
//!
//! Shared definitions for the echo APIs.
//!
//! Contains:
//! - JSON wire types (`wire` module) used by the REST API, the CLI and the core services
//! - Shared services like `HealthService`
//!
//! The wire types keep the field names of the browser client (`lvotDiameter`,
//! `formattedOutput`, ...) so existing `db.json` files and front-ends keep working.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
