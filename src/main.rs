use careline::cli::commands::Cli;
use careline::cli::commands::Commands;
use careline::cli::handlers;
use careline::config::AppConfig;
use careline::logging;
use careline::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    let level = if cli.verbose {
        "debug"
    } else {
        &config.logging.level
    };
    logging::init_logging_with_level(level)?;

    if config.logging.backtrace {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    match cli.command {
        Commands::Serve { host, port, cors } => {
            handlers::handle_serve(&config, host, port, cors).await
        }
        Commands::Chat => handlers::handle_chat(&config).await,
        Commands::Extract {
            file,
            output,
            english,
        } => handlers::handle_extract(&config, &file, output.as_deref(), english).await,
        Commands::Search { query, limit } => handlers::handle_search(&config, &query, limit).await,
        Commands::Config => handlers::handle_config(&config),
    }
}
