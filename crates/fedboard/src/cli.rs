use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, default_value = "INFO", ignore_case = true)]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dashboard web server.
    Serve {
        /// Address to listen on; overrides FEDBOARD_BIND.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the latest print of every indicator.
    Cards,

    /// Print the upcoming U.S. releases from Trading Economics.
    Calendar,

    /// Report which keys are configured and test FRED connectivity.
    Check,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Info,
    Warn,
    Error,
}
