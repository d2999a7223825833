//! Type-ahead search aggregator for incident reports, individuals and organizations.
//!
//! One input box, three independent collections, one ranked mixed-type result list
//! that stays consistent under rapid typing, partial backend outages and
//! out-of-order completion.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod sources;
pub mod telemetry;

pub use error::{AppError, Result};
