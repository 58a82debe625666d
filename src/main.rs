//! Metaseek CLI - multi-provider web search with failover.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use metaseek::{ProviderKind, ProviderSettings, Search, SearchOptions};

/// Metaseek - multi-provider web search CLI
#[derive(Parser)]
#[command(name = "metaseek")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search with automatic provider selection and failover
    Search(SearchArgs),

    /// List providers and their configuration state
    Providers,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Force a specific provider
    /// Available: google, serper, searchapi, serpapi, brave, duckduckgo
    #[arg(short = 'e', long)]
    provider: Option<String>,

    /// Maximum number of results
    #[arg(short, long, default_value = "5")]
    num_results: usize,

    /// Interface language
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Country/market code
    #[arg(short, long, default_value = "us")]
    country: String,

    /// Time-based search filter (Google tbs syntax, e.g. qdr:d)
    #[arg(long)]
    tbs: Option<String>,

    /// Location bias for keyed providers
    #[arg(long)]
    location: Option<String>,

    /// Request fully populated results from the scraping engine
    #[arg(short, long)]
    advanced: bool,

    /// Request timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout: u64,

    /// Proxy URL for the scraping engine (e.g. socks5://127.0.0.1:1080)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Providers => list_providers(),
    }
}

fn list_providers() -> Result<()> {
    let search = Search::from_env();

    println!("Search providers (in fallback priority order):\n");
    print_provider(search.primary().kind(), search.primary().is_configured());
    for provider in search.alternatives() {
        print_provider(provider.kind(), provider.is_configured());
    }
    println!();
    println!("The primary engine is keyless; alternatives are preferred whenever");
    println!("their environment variable is set.");
    Ok(())
}

fn print_provider(kind: ProviderKind, configured: bool) {
    let role = if kind.is_primary() {
        "primary"
    } else {
        "alternative"
    };
    let state = if configured {
        "configured".to_string()
    } else {
        match kind.env_var() {
            Some(var) => format!("not configured (set {})", var),
            None => "not configured".to_string(),
        }
    };
    println!("  {:<12} {:<12} {}", kind.to_string(), role, state);
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let settings = ProviderSettings::from_env();
    let search = Search::from_settings(&settings);

    let mut options = SearchOptions::new(&args.query)
        .with_num_results(args.num_results)
        .with_lang(&args.lang)
        .with_country(&args.country)
        .with_advanced(args.advanced)
        .with_timeout_ms(args.timeout);

    if let Some(tbs) = &args.tbs {
        options = options.with_tbs(tbs);
    }
    if let Some(location) = &args.location {
        options = options.with_location(location);
    }
    if let Some(proxy) = &args.proxy {
        validate_proxy_url(proxy)?;
        options = options.with_proxy(proxy);
        if matches!(args.format, OutputFormat::Text) {
            eprintln!("Using proxy: {}", proxy);
        }
    }
    if let Some(provider) = &args.provider {
        let kind: ProviderKind = provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        options = options.with_provider(kind);
    }

    let results = search.search(&options).await;

    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results):\n",
                args.query,
                results.len()
            );

            for (i, result) in results.iter().enumerate() {
                if result.title.is_empty() {
                    println!("{}. {}", i + 1, result.url);
                    continue;
                }
                println!("{}. {}", i + 1, result.title);
                println!("   URL: {}", result.url);
                if !result.description.is_empty() {
                    let description = if result.description.len() > 150 {
                        format!("{}...", &result.description[..150])
                    } else {
                        result.description.clone()
                    };
                    println!("   {}", description);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Compact => {
            for result in &results {
                println!("{}\t{}", result.title, result.url);
            }
        }
    }

    Ok(())
}

fn validate_proxy_url(proxy: &str) -> Result<()> {
    let url = url::Url::parse(proxy)?;
    match url.scheme() {
        "http" | "https" | "socks5" => Ok(()),
        scheme => anyhow::bail!("Unsupported proxy protocol: {}", scheme),
    }
}
