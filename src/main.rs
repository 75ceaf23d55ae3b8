use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wp_theme_info::{
    ApiClient, Config, DEFAULT_TABLE_ROWS, FileStore, MemoryStore, ThemeInfoCache, TtlStore,
};

#[derive(Parser, Debug)]
#[command(name = "theme-info")]
#[command(about = "Print theme information from the wordpress.org themes API as HTML")]
struct Args {
    /// Theme slug, e.g. `twentyseventeen`
    slug: String,

    /// Field to render
    #[arg(short, long, default_value = "name")]
    field: String,

    /// Render the theme details table instead of a single field
    #[arg(long, conflicts_with = "field")]
    table: bool,

    /// Heading above the table
    #[arg(long, requires = "table")]
    title: Option<String>,

    /// Fetch fresh data even if the cached copy is still valid
    #[arg(long)]
    refresh: bool,

    /// Keep the cache in memory only for this run
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wp_theme_info=info,theme_info=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    debug!("Loaded configuration: {:?}", config);

    let client = ApiClient::new(&config.api_url, config.timeout)?;
    let store: Arc<dyn TtlStore> = match config.cache_file() {
        Some(path) if !args.no_cache => {
            info!("Using cache file {}", path.display());
            Arc::new(FileStore::open(path).await?)
        }
        _ => Arc::new(MemoryStore::new()),
    };

    let cache = ThemeInfoCache::new(store, Arc::new(client))
        .ttl(config.ttl)
        .key_prefix(config.key_prefix);

    if args.refresh {
        cache.refresh(&args.slug).await?;
    }

    let html = if args.table {
        cache
            .render_table(&args.slug, args.title.as_deref(), DEFAULT_TABLE_ROWS)
            .await?
    } else {
        cache.render(&args.slug, Some(&args.field)).await?
    };
    println!("{html}");

    Ok(())
}
