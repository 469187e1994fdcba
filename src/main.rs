use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use tb_metrics::addons::AtnClient;
use tb_metrics::config::ReportConfig;
use tb_metrics::crash::CrashStatsClient;
use tb_metrics::{logging, report};

#[derive(Parser)]
#[command(name = "tb-metrics")]
#[command(version, about = "Monthly Thunderbird add-on and crash statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory that receives the `<YYYY-MM>` data and report folders
    #[arg(long, global = true, default_value = ".")]
    output_root: PathBuf,

    /// JSON report configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Add-on statistics from addons.thunderbird.net
    Addons,
    /// Crash statistics from crash-stats.mozilla.org
    CrashStats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ReportConfig::load(cli.config.as_deref())?;
    let _guard = logging::init(config.log_file.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let now = Utc::now();

    let markdown = match cli.command {
        Command::Addons => {
            let client = AtnClient::public(&config.app, &config.lang)?;
            runtime.block_on(report::addons_report(&client, &config, &cli.output_root, now))?
        }
        Command::CrashStats => {
            let client = CrashStatsClient::public()?;
            runtime.block_on(report::crash_report(&client, &config, &cli.output_root, now))?
        }
    };

    print!("{}", markdown);
    info!("Report complete");
    Ok(())
}
