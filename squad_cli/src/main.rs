mod commands;
mod logging;
mod server;
mod shutdown;
mod ui;

use clap::{Args, Parser, Subcommand, ValueEnum};
use squad_collector::CollectorConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "squad-exporter")]
#[command(about = "Prometheus exporter for Squad game server status", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Options for the default `serve` command
    #[command(flatten)]
    serve: ServeArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect periodically and serve /metrics (default)
    Serve(ServeArgs),

    /// Run a single collection cycle and print the result
    Once {
        #[command(flatten)]
        collector: CollectorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Prometheus)]
        format: OutputFormat,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a server list file
    Validate {
        /// Path to the server list (JSON, YAML, or TOML)
        servers_file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    collector: CollectorArgs,

    /// Port for the metrics and health endpoints
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct CollectorArgs {
    /// Server list file (JSON, YAML, or TOML)
    #[arg(short, long, env = "SERVERS_FILE", default_value = "servers.json")]
    servers: PathBuf,

    /// Time between collection cycles
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Sustained spacing between upstream requests
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    rate_interval: Duration,

    /// Requests allowed back to back after idling
    #[arg(long, default_value_t = 10)]
    burst: u32,

    /// Timeout for each upstream request
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    timeout: Duration,
}

impl CollectorArgs {
    pub fn config(&self) -> CollectorConfig {
        CollectorConfig::builder()
            .interval(self.interval)
            .rate_interval(self.rate_interval)
            .burst(self.burst)
            .request_timeout(self.timeout)
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Prometheus,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.quiet, cli.log_json);

    match cli.command.unwrap_or(Commands::Serve(cli.serve)) {
        Commands::Serve(args) => {
            commands::serve::execute(args).await?;
        }

        Commands::Once {
            collector,
            format,
            output,
        } => {
            commands::once::execute(collector, format, output).await?;
        }

        Commands::Validate { servers_file } => {
            commands::validate::execute(servers_file).await?;
        }
    }

    Ok(())
}
