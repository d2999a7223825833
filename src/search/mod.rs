//! Type-ahead search across incident reports, individuals and organizations
//!
//! This module turns keystrokes into a single ranked, mixed-type result list:
//!
//! - **Debounce**: a round starts only once input has been quiet for a while
//! - **Fan-out**: every collection is queried concurrently with settle-all semantics
//! - **Fencing**: results of superseded rounds are discarded, never shown
//! - **Classification**: rounds are Success, PartialFailure or TotalFailure
//! - **Normalization**: collection-native records become [`AggregatedResult`](crate::models::AggregatedResult)s
//! - **Selection**: keyboard navigation over the visible list
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           TypeaheadEngine                        │
//! ├─────────────────────────────────────────────────┤
//! │  - on_term_changed()  - on_key()                │
//! │  - clear()            - subscribe() / state()   │
//! └─────────────────────────────────────────────────┘
//!          │ debounce             ▲ admit if current
//!          ▼                      │
//! ┌─────────────────────────────────────────────────┐
//! │           FanOutAggregator                       │
//! ├─────────────────────────────────────────────────┤
//! │  - one SourceQuery per collection               │
//! │  - classify + normalize settled branches        │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use incident_typeahead::search::{FanOutAggregator, SearchConfig, TypeaheadEngine};
//! use incident_typeahead::sources::HttpSource;
//! use incident_typeahead::config::SourcesConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = SearchConfig::default();
//!     let sources = HttpSource::from_config(&SourcesConfig::default(), &search)?;
//!     let aggregator = FanOutAggregator::builder().sources(sources).build()?;
//!
//!     let engine = TypeaheadEngine::builder(Arc::new(aggregator))
//!         .config(search)
//!         .on_select(|result: &incident_typeahead::models::AggregatedResult| {
//!             println!("navigate to {}", result.url)
//!         })
//!         .build()?;
//!
//!     let mut updates = engine.subscribe();
//!     engine.on_term_changed("Tehran");
//!     updates.changed().await?;
//!     println!("{:?}", engine.state());
//!
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod debounce;
mod engine;
mod error;
mod fence;
mod normalizer;
mod outcome;
mod selection;
mod state;

pub use aggregator::{FanOutAggregator, FanOutAggregatorBuilder};
pub use config::{SearchConfig, SearchConfigBuilder, SearchMessages, SurfaceKind};
pub use debounce::DebounceScheduler;
pub use engine::{SelectionHandler, TypeaheadEngine, TypeaheadEngineBuilder};
pub use error::{SearchError, SearchResult};
pub use fence::{RoundFence, RoundId};
pub use normalizer::{format_incident_date, normalize, NormalizationDefect, SUBTITLE_SEPARATOR};
pub use outcome::{BranchFailure, RoundOutcome, RoundResult, SourceOutcome};
pub use selection::{KeyEffect, NavKey, SelectionPhase};
pub use state::SearchUiState;
