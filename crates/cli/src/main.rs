use crate::{
    env::EnvManager,
    error::CliError,
    output::RowWriter,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use client::Session;
use commands::Commands;
use connectors::config::ConnectionConfig;
use std::io::{self, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "sqlhttp",
    version = "0.1.0",
    about = "Run SQL against a paginated HTTP query server"
)]
struct Cli {
    #[arg(long, global = true, help = "Load KEY=VALUE variables from this file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so query output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli, &shutdown).await {
        Ok(()) => ExitCode::Success,
        Err(err) if err.is_cancellation() || shutdown.is_shutdown_requested() => {
            info!("Query interrupted");
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn run(cli: Cli, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Query {
            sql,
            url,
            stream,
            column_types,
            json,
        } => {
            let config = ConnectionConfig::from_url(&env.resolve_url(url)?)?;
            let mut session = Session::from_config(config).with_cancellation(shutdown.cancel_token());
            let mut out = RowWriter::new(BufWriter::new(io::stdout()), json);

            if stream {
                let mut rows = session.execute_streaming(&sql).await?;
                if column_types {
                    out.write_column_types(rows.column_types())?;
                }
                while let Some(row) = rows.next_row().await? {
                    out.write_row(&row)?;
                }
            } else {
                let (rows, columns) = session.execute_with_column_types(&sql).await?;
                if column_types {
                    out.write_column_types(&columns)?;
                }
                for row in &rows {
                    out.write_row(row)?;
                }
            }

            let written = out.finish()?;
            info!(rows = written, "Done");
            session.disconnect();
        }
        Commands::Inspect { url } => {
            let config = ConnectionConfig::from_url(&env.resolve_url(url)?)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
    }

    Ok(())
}
