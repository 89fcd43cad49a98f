mod cli;

use discfinder::{
    config,
    http::{HttpFetch, ReqwestFetcher},
    resolver::Resolver,
    server,
};
use discfinder_common::{MovieInfo, Outcome};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn start_server(host: String, port: u16, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting discfinder server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

async fn lookup(barcode: &str, json: bool, show_trace: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let fetcher: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new(&config.http));
    let resolver = Resolver::new(&config, fetcher)?;

    let info = resolver.lookup_movie(barcode).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialize result")?
        );
    } else {
        print_movie(&info);
        if show_trace {
            print_trace(&info);
        }
    }
    Ok(())
}

fn print_movie(info: &MovieInfo) {
    println!("{}", info.title);
    println!("  Barcode:  {}", info.barcode);
    println!("  Source:   {}", info.source);

    let fields = [
        ("Year", &info.year),
        ("Director", &info.director),
        ("Rating", &info.rating),
        ("IMDb", &info.imdb_rating),
        ("Tomatoes", &info.rotten_tomatoes_rating),
        ("Runtime", &info.runtime),
        ("Genres", &info.genres),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("  {:<9} {}", format!("{name}:"), value);
        }
    }
    if let Some(ref overview) = info.overview {
        println!();
        println!("{}", overview);
    }
}

fn print_trace(info: &MovieInfo) {
    println!();
    println!("Trace:");
    for entry in info.debug.entries() {
        let mark = match entry.outcome {
            Outcome::Success => "✓",
            Outcome::Failure => "✗",
            Outcome::Skipped => "-",
        };
        match entry.detail {
            Some(ref detail) => println!("  {} {}/{}: {}", mark, entry.stage, entry.label, detail),
            None => println!("  {} {}/{}", mark, entry.stage, entry.label),
        }
    }
    if info.debug.dropped() > 0 {
        println!("  ... {} more entries dropped", info.debug.dropped());
    }
}

fn show_candidates(title: &str) -> Result<()> {
    let result = discfinder_title::candidates(title);

    println!("Cleaned: {}", result.cleaned);
    match result.year {
        Some(year) => println!("Year:    {}", year),
        None => println!("Year:    (none)"),
    }
    if result.is_empty() {
        println!("No usable queries");
    } else {
        println!("Queries:");
        for (i, query) in result.queries.iter().enumerate() {
            println!("  {}. {}", i + 1, query);
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  TMDB key: {}",
                if config.providers.tmdb_api_key.is_some() { "set" } else { "not set" }
            );
            println!(
                "  OMDb key: {}",
                if config.providers.omdb_api_key.is_some() { "set" } else { "not set" }
            );
            println!("  Open data sites: {}", config.upc.open_data.len());
            println!("  Scrape sites: {}", config.upc.scrape.len());
            println!("  Barcode overrides: {}", config.upc.overrides.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "discfinder=trace,discfinder_common=debug,tower_http=debug".to_string()
        } else {
            "discfinder=info,tower_http=info".to_string()
        }
    });

    // Logs go to stderr so `lookup --json` output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Lookup {
            barcode,
            json,
            trace,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(lookup(&barcode, json, trace, cli.config.as_deref()))
        }
        Commands::Candidates { title } => show_candidates(&title),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("discfinder {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
