pub mod config;
pub mod logging;
pub mod model;
pub mod search;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};

use config::Config;
use logging::LogTarget;
use model::types::{ResultSet, SearchFilters, SortBy, entity_label};
use search::http::HttpGateway;
use search::pipeline::{QueryPipeline, Surface, next_settled};
use search::routes::{item_route, resolve_route};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "hwsearch",
    version,
    about = "Incremental search over simulator hardware configuration"
)]
pub struct Cli {
    /// Console API base URL (overrides config and HWSEARCH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (defaults to <config dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Give up on a search after this many milliseconds (0 disables)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch interactive TUI
    Tui {
        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Run one filtered search
    Search {
        query: String,
        /// Restrict to an entity type, e.g. HardwarePanel
        #[arg(long = "type")]
        entity_type: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        min_score: Option<f32>,
        #[arg(long)]
        include_inactive: bool,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        manufacturer: Option<String>,
        /// relevance, title, createdDate, updatedDate or entityType
        #[arg(long, default_value = "relevance")]
        sort_by: SortBy,
        #[arg(long)]
        json: bool,
    },
    /// Run one autocomplete lookup
    Quick {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the console route for a resource locator
    Resolve { locator: String },
    /// List searchable entity types
    EntityTypes {
        #[arg(long)]
        json: bool,
    },
    /// Print query suggestions
    Suggest {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Print search service statistics
    Stats,
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout_ms = (ms > 0).then_some(ms);
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_target = match cli.command {
        Commands::Tui { .. } => LogTarget::File(config::default_data_dir()),
        _ => LogTarget::Stderr,
    };
    logging::init_logging(log_target);

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Commands::Tui { once } => ui::tui::run_tui(&config, once).await,
        Commands::Search {
            query,
            entity_type,
            limit,
            offset,
            min_score,
            include_inactive,
            from,
            to,
            manufacturer,
            sort_by,
            json,
        } => {
            let filters = SearchFilters {
                entity_type,
                limit: limit.unwrap_or(config.full.limit),
                offset,
                min_score: min_score
                    .or(config.full.min_score)
                    .unwrap_or(SearchFilters::default().min_score),
                include_inactive,
                from_date: from,
                to_date: to,
                manufacturer,
                sort_by,
                ..SearchFilters::default()
            };
            let set = search_once(&config, Surface::Full, &query, Some(filters)).await?;
            print_result_set(&set, config.full.min_query_len, json)
        }
        Commands::Quick { query, json } => {
            let set = search_once(&config, Surface::Instant, &query, None).await?;
            print_result_set(&set, config.instant.min_query_len, json)
        }
        Commands::Resolve { locator } => {
            println!("{}", resolve_route(&locator));
            Ok(())
        }
        Commands::EntityTypes { json } => {
            let gateway = gateway(&config)?;
            let types = gateway.entity_types_or_default().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else {
                for ty in types {
                    println!("{:<20} {}", ty.id, ty.name);
                }
            }
            Ok(())
        }
        Commands::Suggest { query, limit } => {
            let suggestions = gateway(&config)?
                .suggestions(&query, limit)
                .await
                .context("fetching suggestions")?;
            for suggestion in suggestions {
                println!("{}\t{}", suggestion.text, suggestion.kind);
            }
            Ok(())
        }
        Commands::Stats => {
            let stats = gateway(&config)?
                .statistics()
                .await
                .context("fetching search statistics")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "hwsearch", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

fn gateway(config: &Config) -> Result<HttpGateway> {
    HttpGateway::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("invalid api url '{}'", config.api_url))
}

/// Push one query through a pipeline and wait for its result set.
/// One-shot commands skip the debounce window.
pub async fn search_once(
    config: &Config,
    surface: Surface,
    text: &str,
    filters: Option<SearchFilters>,
) -> Result<ResultSet> {
    let mut settings = config.pipeline_settings(surface);
    settings.debounce = Duration::ZERO;
    let (pipeline, mut events) = QueryPipeline::spawn(Arc::new(gateway(config)?), settings);
    if let Some(filters) = filters {
        pipeline.set_filters(filters);
    }
    pipeline.set_text(text);
    next_settled(&mut events)
        .await
        .context("search pipeline stopped before settling")
}

fn print_result_set(set: &ResultSet, min_query_len: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(set)?);
        return Ok(());
    }
    if let Some(advisory) = set.advisory() {
        eprintln!("{advisory}");
    }
    if set.is_empty() {
        if !set.is_degraded() {
            eprintln!("{}", ui::data::status_summary(Some(set), min_query_len));
        }
        return Ok(());
    }
    for item in &set.items {
        let route = item_route(item).unwrap_or_else(|| "-".to_string());
        println!(
            "{:.2}  {:<22} {}  {}",
            item.relevance_score,
            entity_label(&item.entity_type),
            item.title,
            route
        );
    }
    if let Some(page) = set.page {
        eprintln!(
            "page {}/{} ({} total, {} ms)",
            page.page, page.total_pages, page.total_results, page.execution_time_ms
        );
    }
    Ok(())
}
