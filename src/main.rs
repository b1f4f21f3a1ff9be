mod cli;

use cinelog::{config, metadata::OmdbProvider, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_server_config(config_path)?;

    // CLI flags win over the config file
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Cinelog server");
    server::start_server(config).await
}

async fn lookup(title: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let provider = OmdbProvider::new(&config.omdb);

    let Some(record) = provider.get_new_movie_data(title).await else {
        anyhow::bail!("No movie data found for {:?}", title);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Title:    {}", record.title);
        println!("Year:     {}", record.year);
        println!("Director: {}", record.director);
        println!("Genre:    {}", record.genre);
        println!("Rating:   {:.1}", record.rating);
        println!("Poster:   {}", record.poster_url);
        println!("\n{}", record.plot);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinelog=trace,cinelog_db=debug,cinelog_common=debug,tower_http=debug".to_string()
        } else {
            "cinelog=info,cinelog_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Lookup { title, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(lookup(&title, json, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cinelog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.database.display());
    println!("  OMDb: {}", config.omdb.base_url);
    println!(
        "  API key: {}",
        if config.omdb.api_key.is_some() {
            "configured"
        } else {
            "from OMDB_API_KEY"
        }
    );
    println!(
        "  Retries: {} attempts, {}s initial delay",
        config.omdb.max_retries, config.omdb.initial_delay_secs
    );

    Ok(())
}
