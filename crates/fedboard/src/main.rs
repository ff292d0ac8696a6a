use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands::*, TraceLevel};
use fedboard_data::clock::now_eastern;
use fedboard_data::{Config, Dashboard};
use tracing::{info, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod print;

fn preprocess(trace_level: Level) {
    // try_init also routes `log` records (actix's request logger) through tracing
    let _ = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .try_init();
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::Debug => Level::DEBUG,
        TraceLevel::Info => Level::INFO,
        TraceLevel::Warn => Level::WARN,
        TraceLevel::Error => Level::ERROR,
    };

    preprocess(log_level);
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env()?;

    // "> fedboard <COMMAND>"
    match &cli.command {
        // "> fedboard serve [--bind ADDR]"
        Serve { bind } => {
            let bind = bind.clone().unwrap_or_else(|| config.bind.clone());
            let dashboard = Dashboard::new(config)?;
            fedboard_web::serve(dashboard, &bind).await?;
        }

        // "> fedboard cards"
        Cards => {
            let dashboard = Dashboard::new(config)?;
            info!("Fetching latest prints from FRED");
            let cards = dashboard.cards().await;
            print::cards(&cards);
        }

        // "> fedboard calendar"
        Calendar => {
            let dashboard = Dashboard::new(config)?;
            let today = now_eastern().date_naive();
            info!("Fetching the U.S. calendar from Trading Economics");
            let state = dashboard.calendar(today, Utc::now()).await;
            print::calendar(&state);
        }

        // "> fedboard check"
        Check => {
            print::keys(&config);
            let dashboard = Dashboard::new(config)?;
            info!("Testing FRED connectivity");
            match dashboard.probe().await {
                Ok(probe) => print::probe(&probe)?,
                Err(e) => print::failure(&format!("FRED request could not be sent: {e}")),
            }
        }
    }

    Ok(())
}
