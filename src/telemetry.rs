//! Auxiliary event capture
//!
//! The engine reports notable events to an injected [`SearchTelemetry`]
//! capability. Capture is strictly best effort: errors and panics raised by the
//! capability are swallowed by [`capture_quietly`] and never reach search logic.

use crate::models::SourceKind;
use crate::search::{RoundOutcome, SurfaceKind};
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info};

/// Events the engine reports
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A round was admitted into visible state
    RoundAdmitted {
        surface: SurfaceKind,
        outcome: RoundOutcome,
        result_count: usize,
        failed_sources: Vec<SourceKind>,
        duration_ms: u64,
    },
    /// The user picked a result
    ResultSelected {
        surface: SurfaceKind,
        source: SourceKind,
        result_id: String,
    },
    /// The user dismissed the dropdown with Escape
    Dismissed { surface: SurfaceKind },
}

/// Telemetry capability failures
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry sink unavailable: {0}")]
    Unavailable(String),

    #[error("telemetry event rejected: {0}")]
    Rejected(String),
}

/// Capability receiving engine events
pub trait SearchTelemetry: Send + Sync + 'static {
    fn capture(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl SearchTelemetry for NoopTelemetry {
    fn capture(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Writes every event to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl SearchTelemetry for TracingTelemetry {
    fn capture(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let payload =
            serde_json::to_string(event).map_err(|e| TelemetryError::Rejected(e.to_string()))?;
        info!(target: "incident_typeahead::telemetry", event = %payload, "Search event");
        Ok(())
    }
}

/// Shared handle to a telemetry capability
pub type SharedTelemetry = Arc<dyn SearchTelemetry>;

/// Forward an event, ignoring any failure of the capability
pub fn capture_quietly(telemetry: &dyn SearchTelemetry, event: TelemetryEvent) {
    match catch_unwind(AssertUnwindSafe(|| telemetry.capture(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "Telemetry capture failed"),
        Err(_) => debug!("Telemetry capture panicked"),
    }
}
