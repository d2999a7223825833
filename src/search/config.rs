//! Search configuration

use crate::models::{DisplayLocale, SourceKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::Display;
use validator::Validate;

/// Which search box hosts the engine
///
/// Only affects logging and telemetry tags; behavior is identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurfaceKind {
    #[default]
    FullPanel,
    Compact,
}

/// Search engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a round starts (milliseconds)
    #[validate(range(max = 5000))]
    pub debounce_ms: u64,

    /// Active display locale
    pub locale: DisplayLocale,

    /// Maximum reports per round
    #[validate(range(min = 1, max = 100))]
    pub report_limit: usize,

    /// Maximum individuals per round
    #[validate(range(min = 1, max = 100))]
    pub individual_limit: usize,

    /// Maximum organizations per round
    #[validate(range(min = 1, max = 100))]
    pub organization_limit: usize,

    /// Abort a superseded round's task instead of letting it finish and be discarded
    pub cancel_in_flight: bool,

    /// Hosting surface
    pub surface: SurfaceKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            locale: DisplayLocale::En,
            report_limit: 5,
            individual_limit: 5,
            organization_limit: 5,
            cancel_in_flight: false,
            surface: SurfaceKind::FullPanel,
        }
    }
}

impl SearchConfig {
    /// Debounce interval
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Per-round item limit for a collection
    pub fn limit_for(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::Report => self.report_limit,
            SourceKind::Individual => self.individual_limit,
            SourceKind::Organization => self.organization_limit,
        }
    }
}

/// User-facing strings for round outcomes
///
/// Translation lookup happens outside the engine; callers pass already-localized
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchMessages {
    /// Inline notice when some collections were unavailable
    pub partial_notice: String,

    /// Error shown when every collection failed
    pub total_failure: String,

    /// Shown when every collection answered with nothing
    pub no_results: String,
}

impl Default for SearchMessages {
    fn default() -> Self {
        Self {
            partial_notice: "Some sources are unavailable; results may be incomplete.".to_string(),
            total_failure: "Search is unavailable right now. Please try again.".to_string(),
            no_results: "No results found.".to_string(),
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn locale(mut self, locale: DisplayLocale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn limit(mut self, kind: SourceKind, limit: usize) -> Self {
        match kind {
            SourceKind::Report => self.config.report_limit = limit,
            SourceKind::Individual => self.config.individual_limit = limit,
            SourceKind::Organization => self.config.organization_limit = limit,
        }
        self
    }

    pub fn cancel_in_flight(mut self, enabled: bool) -> Self {
        self.config.cancel_in_flight = enabled;
        self
    }

    pub fn surface(mut self, surface: SurfaceKind) -> Self {
        self.config.surface = surface;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
