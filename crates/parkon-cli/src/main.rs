use std::sync::Arc;

use clap::{Parser, Subcommand};
use parkon_core::{AppConfig, CallerPrivilege, SearchResult};
use parkon_search::{
    MemorySink, PostcodeClient, RawSearchParams, SearchService, SearchSink, TracingSink,
};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parkon", about = "London parking search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-shot parking search around a coordinate
    Search {
        #[arg(long, allow_negative_numbers = true)]
        latitude: String,
        #[arg(long, allow_negative_numbers = true)]
        longitude: String,
        #[arg(long, conflicts_with = "radius_km")]
        radius_miles: Option<String>,
        #[arg(long)]
        radius_km: Option<String>,
        /// One of standard, disabled, electric, motorcycle
        #[arg(long)]
        spot_type: Option<String>,
        /// Maximum hourly rate in GBP
        #[arg(long)]
        max_price: Option<String>,
        /// Include live free-space counts from TfL occupancy data
        #[arg(long)]
        realtime: bool,
        /// Persist the search to the Postgres cache
        #[arg(long)]
        record: bool,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a UK postcode to a coordinate
    Geocode { postcode: String },
    /// Apply pending database migrations
    Migrate,
    /// Delete cached searches older than the retention window
    PruneCache {
        /// Overrides PARKON_CACHE_RETENTION_DAYS
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show the most recent cached searches
    History {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("parkon-cli: no command given. Run with --help for usage.");
        return Ok(());
    };

    let config = parkon_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search {
            latitude,
            longitude,
            radius_miles,
            radius_km,
            spot_type,
            max_price,
            realtime,
            record,
            json,
        } => {
            let params = RawSearchParams {
                latitude: Some(latitude),
                longitude: Some(longitude),
                radius_miles,
                radius_km,
                spot_type,
                max_price,
            };
            let privilege = if realtime {
                CallerPrivilege::Realtime
            } else {
                CallerPrivilege::Anonymous
            };
            run_search(&config, &params, privilege, record, json).await?;
        }
        Commands::Geocode { postcode } => {
            let client = PostcodeClient::from_app_config(&config)?;
            match client.lookup(&postcode).await? {
                Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
                None => anyhow::bail!("postcode {postcode} not found"),
            }
        }
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = parkon_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::PruneCache { days } => {
            let pool = connect(&config).await?;
            let days = days.unwrap_or(config.cache_retention_days);
            let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(days));
            let removed = parkon_db::prune_search_cache(&pool, cutoff).await?;
            println!("pruned {removed} cached searches older than {cutoff}");
        }
        Commands::History { limit } => {
            let pool = connect(&config).await?;
            let total = parkon_db::count_search_cache(&pool).await?;
            let rows = parkon_db::list_recent_search_cache(&pool, limit).await?;
            println!("{total} cached searches, showing {}", rows.len());
            for row in rows {
                println!(
                    "{}  {}  ({:.4}, {:.4}) r={:.2}km  matched={}  [{}]",
                    row.cached_at.format("%Y-%m-%d %H:%M:%S"),
                    row.public_id,
                    row.latitude,
                    row.longitude,
                    row.radius_km,
                    row.total_matched,
                    row.privilege,
                );
            }
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool_config = parkon_db::PoolConfig::from_app_config(config);
    Ok(parkon_db::connect_pool(config.database_url()?, pool_config).await?)
}

async fn run_search(
    config: &AppConfig,
    params: &RawSearchParams,
    privilege: CallerPrivilege,
    record: bool,
    json: bool,
) -> anyhow::Result<()> {
    let recorded = MemorySink::new();
    let sink: Arc<dyn SearchSink> = if record {
        Arc::new(recorded.clone())
    } else {
        Arc::new(TracingSink)
    };
    let service = SearchService::from_app_config(config, sink)?;
    let result = service.search(params, privilege).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result);
    }

    if record {
        record_searches(config, &recorded).await;
    }
    Ok(())
}

/// Writes captured searches to `search_cache` and returns how many landed.
///
/// Failures are logged and never fail the command.
async fn record_searches(config: &AppConfig, recorded: &MemorySink) -> usize {
    let records = recorded.records();
    if records.is_empty() {
        return 0;
    }

    let pool = match connect(config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "failed to record search");
            return 0;
        }
    };

    let mut saved = 0;
    for record in records {
        let entry = match record.to_cache_entry() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "failed to record search");
                continue;
            }
        };
        match parkon_db::insert_search_cache(&pool, &entry).await {
            Ok(id) => {
                tracing::info!(id, "search recorded");
                saved += 1;
            }
            Err(e) => tracing::warn!(error = %e, "failed to record search"),
        }
    }
    saved
}

fn print_table(result: &SearchResult) {
    println!("{}", result.message);
    for (position, item) in result.items.iter().enumerate() {
        let spot = &item.candidate;
        let live = spot
            .live_free_spaces
            .map(|free| format!("  {free} free"))
            .unwrap_or_default();
        println!(
            "{:>2}. {:<40} {:>5.2} km  {:>3} min  {}{}/h  {}{}",
            position + 1,
            spot.name,
            item.distance_km,
            item.walk_time_mins,
            currency_symbol(&spot.pricing.currency),
            spot.pricing.hourly_rate,
            spot.category,
            live,
        );
    }
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "GBP" => "£",
        other => other,
    }
}

#[cfg(test)]
mod tests;
