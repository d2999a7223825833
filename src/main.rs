use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use incident_typeahead::{
    config::Config,
    metrics::{gather_metrics, init_metrics},
    models::{AggregatedResult, DisplayLocale},
    search::{FanOutAggregator, NavKey, RoundFence, TypeaheadEngine},
    sources::{FixtureSource, HttpSource, SourceQuery},
    telemetry::TracingTelemetry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "incident-typeahead", version)]
#[command(about = "Type-ahead search over incident reports, individuals and organizations", long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    ///
    /// Falls back to the `TYPEAHEAD_CONFIG` environment variable.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve collections from a JSON fixture file instead of HTTP
    #[arg(short, long, global = true)]
    fixtures: Option<PathBuf>,

    /// Display locale (en or fa)
    #[arg(short, long, global = true)]
    locale: Option<DisplayLocale>,

    /// Print Prometheus metrics before exiting
    #[arg(short, long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search round immediately and print it as JSON
    Query {
        #[arg(value_name = "TERM")]
        term: String,
    },

    /// Read search box contents from stdin, one line per change
    ///
    /// An empty line clears the box. `:down`, `:up`, `:enter` and `:esc` are
    /// navigation keys, `:quit` exits. State snapshots are printed as JSON lines.
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(Some(path)),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(locale) = cli.locale {
        config.search.locale = locale;
    }

    init_tracing(&config);
    tracing::debug!("Starting incident-typeahead v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
        }
    }

    let sources: Vec<Arc<dyn SourceQuery>> = match &cli.fixtures {
        Some(path) => FixtureSource::load_all(path, &config.search)
            .with_context(|| format!("Failed to load fixtures from {}", path.display()))?,
        None => HttpSource::from_config(&config.sources, &config.search)?,
    };

    let aggregator = Arc::new(
        FanOutAggregator::builder()
            .sources(sources)
            .locale(config.search.locale)
            .build()?,
    );

    match cli.command {
        Commands::Query { term } => {
            let term = term.trim();
            if term.is_empty() {
                bail!("search term is empty");
            }

            let fence = RoundFence::new();
            let result = aggregator.run_round(term, fence.begin_round()).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Interactive => run_interactive(&config, aggregator).await?,
    }

    if cli.metrics {
        print!("{}", gather_metrics());
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.observability.log_filter.clone().into());

    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Key(NavKey),
    Term(String),
    Quit,
}

fn parse_input_line(line: &str) -> InputLine {
    match line.trim() {
        ":down" => InputLine::Key(NavKey::ArrowDown),
        ":up" => InputLine::Key(NavKey::ArrowUp),
        ":enter" => InputLine::Key(NavKey::Enter),
        ":esc" => InputLine::Key(NavKey::Escape),
        ":quit" => InputLine::Quit,
        _ => InputLine::Term(line.to_string()),
    }
}

/// Feed one input line to the engine. Returns false once input should stop.
fn apply_input(engine: &TypeaheadEngine, line: &str) -> bool {
    match parse_input_line(line) {
        InputLine::Key(key) => {
            engine.on_key(key);
            true
        }
        InputLine::Term(term) => {
            engine.on_term_changed(&term);
            true
        }
        InputLine::Quit => false,
    }
}

async fn run_interactive(config: &Config, aggregator: Arc<FanOutAggregator>) -> anyhow::Result<()> {
    let engine = TypeaheadEngine::builder(aggregator)
        .config(config.search.clone())
        .messages(config.messages.clone())
        .telemetry(Arc::new(TracingTelemetry))
        .on_select(|result: &AggregatedResult| println!("{}", result.url))
        .build()?;

    tracing::info!(
        surface_id = %engine.surface_id(),
        surface = %engine.surface(),
        "Interactive search ready"
    );

    let mut updates = engine.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to encode state: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !apply_input(&engine, &line) {
            break;
        }
    }

    // Let the last round land before tearing down
    let settle = config.search.debounce() + Duration::from_secs(config.sources.timeout_secs);
    let mut idle = engine.subscribe();
    if tokio::time::timeout(settle, idle.wait_for(|state| !state.loading()))
        .await
        .is_err()
    {
        tracing::warn!("Gave up waiting for the last search round");
    }

    engine.shutdown();
    drop(idle);
    drop(engine);
    printer.await?;

    Ok(())
}
