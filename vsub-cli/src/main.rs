mod cli;
mod commands;
mod config;
mod error;
mod output;
mod progress;
mod range;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
};
use clap::Parser;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { show, reset } => {
            if reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults");
            } else if show {
                let config = AppConfig::load(args.config.as_deref())?
                    .with_overrides(args.domain, args.timeout);
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let config = AppConfig::load(args.config.as_deref())?.with_overrides(args.domain, args.timeout);
    debug!("Loaded configuration: {:?}", config);

    let executor = CommandExecutor::new(config, args.quiet)?;

    match args.command {
        Commands::Search { query, limit } => executor.search(&query, limit).await?,
        Commands::Details { id, format } => executor.details(id, format).await?,
        Commands::Episodes { id, format } => executor.episodes(id, format).await?,
        Commands::Download {
            id,
            episode,
            output,
        } => executor.download(id, &episode, &output).await?,
        Commands::Playlist {
            id,
            episode,
            output,
        } => executor.playlist(id, &episode, &output).await?,
        Commands::Serve { bind } => executor.serve(bind).await?,
        Commands::Completions { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_level(verbose).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
