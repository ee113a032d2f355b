mod lookup;

use clap::{Parser, Subcommand};
use kainan_core::{Category, PriceTier, SortKey, DEFAULT_PAGE_LIMIT};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kainan-cli")]
#[command(about = "Kainan business directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List active businesses from the first reachable source
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Search with free text and filters
    Search {
        /// Free-text query matched against name, description and category
        query: Option<String>,
        /// Comma-separated categories (e.g. seafood,filipino)
        #[arg(long, value_delimiter = ',')]
        category: Vec<Category>,
        /// Comma-separated price tiers (budget, moderate, expensive, luxury)
        #[arg(long, value_delimiter = ',')]
        price: Vec<PriceTier>,
        #[arg(long)]
        min_rating: Option<f64>,
        /// Only businesses open right now
        #[arg(long)]
        open_now: bool,
        #[arg(long, default_value = "relevance")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Businesses within a radius of a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value_t = 5.0)]
        radius_km: f64,
        #[arg(long, default_value = "distance")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Show a single business by id
    Show { id: String },
    /// List every listing an owner has created, including deactivated ones
    Owner { owner_id: String },
    /// Apply pending database migrations
    Migrate,
    /// Show which sources are configured
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("kainan-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = kainan_core::load_app_config()?;
    // stdout carries JSON output; logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Migrate => lookup::run_migrate(&config).await,
        other => {
            let bundle = kainan_resolver::build_resolver(&config)?;
            lookup::run(&bundle.resolver, other).await
        }
    }
}
