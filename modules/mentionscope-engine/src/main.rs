use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mentionscope_engine::{
    Aggregator, AggregatorConfig, Config, Permissions, PgGateway, SearchRequest, Severity,
    SortOrder, SourceName, SourceRegistry, TimeWindow,
};

#[derive(Parser)]
#[command(name = "mentionscope", about = "Run one social-listening search and print the result")]
struct Cli {
    /// Keyword or phrase to search for
    term: String,

    /// Comma-separated sources
    #[arg(
        long = "source",
        value_delimiter = ',',
        default_value = "tiktok,instagram,twitter,facebook,youtube,web"
    )]
    sources: Vec<SourceName>,

    #[arg(long)]
    region: Option<String>,

    #[arg(long)]
    language: Option<String>,

    /// day, week, month or quarter
    #[arg(long, default_value = "week")]
    window: TimeWindow,

    /// Keep only mentions at or above this severity
    #[arg(long)]
    severity: Option<Severity>,

    /// newest or engagement
    #[arg(long)]
    sort: Option<SortOrder>,

    /// Seed for fallback data (overrides FALLBACK_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Save the batch to Postgres (needs DATABASE_URL)
    #[arg(long)]
    persist: bool,

    /// Strip authors and links from the output
    #[arg(long)]
    no_export: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mentionscope=info".parse()?)
                .add_directive("mentionscope_engine=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.log_redacted();

    let mut agg_config = AggregatorConfig::from(&config);
    if let Some(seed) = cli.seed {
        agg_config.fallback_seed = Some(seed);
    }
    let aggregator = Aggregator::new(SourceRegistry::from_config(&config), agg_config);

    let mut request = SearchRequest::new(cli.term, cli.sources).window(cli.window);
    request.region = cli.region;
    request.language = cli.language;
    request.severity_filter = cli.severity;
    request.sort = cli.sort;

    let result = match (cli.persist, config.database_url.as_deref()) {
        (true, Some(url)) => {
            let gateway = PgGateway::connect(url).await?;
            let run = aggregator.run_and_persist(&request, &gateway).await?;
            match (&run.batch_id, &run.persistence_error) {
                (Some(id), _) => info!(batch_id = %id, "Batch saved"),
                (None, Some(e)) => warn!(error = %e, "Batch not saved"),
                (None, None) => {}
            }
            run.result
        }
        (persist, _) => {
            if persist {
                warn!("--persist ignored: DATABASE_URL is not set");
            }
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, cancelling in-flight sources");
                    on_signal.cancel();
                }
            });
            aggregator.run_with_cancel(&request, &cancel).await?
        }
    };

    let permissions = Permissions {
        can_search: true,
        can_export_data: !cli.no_export,
    };
    println!("{}", serde_json::to_string_pretty(&result.redacted(&permissions))?);

    if result.is_degraded() {
        warn!(
            fallback = result.metrics.fallback_mentions,
            failed = ?result.source_errors.keys().collect::<Vec<_>>(),
            "Result includes fallback data"
        );
    }

    Ok(())
}
