//! munkibatch - sync permissions and build munkipkg projects in bulk.
//!
//! Must be run as root: `munkipkg --sync` and the ownership reset both
//! change file owners.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use munkibatch::batch::Batch;
use munkibatch::config::{Config, TOOL_ENV};
use munkibatch::munkipkg::DEFAULT_TOOL;
use munkibatch::output::Reporter;
use munkibatch::preflight;

#[derive(Parser)]
#[command(name = "munkibatch")]
#[command(
    about = "Syncs permissions and builds multiple packages using the munkipkg tool."
)]
struct Cli {
    /// Suppress normal output messages. Errors will still be printed to stderr.
    #[arg(short, long)]
    quiet: bool,

    /// Keep the ownership of package files/directories specified in Bom.txt.
    /// Without this option, files/directories are reset to the package directory's owner.
    #[arg(short, long)]
    owner: bool,

    /// Directory to build, or to scan for packages. Defaults to current directory.
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Location of directory with built packages. Defaults to current directory.
    #[arg(short = 'b', long = "buildLocation", default_value = ".")]
    build_location: PathBuf,

    /// munkipkg executable name or path.
    #[arg(long, env = TOOL_ENV, default_value = DEFAULT_TOOL)]
    tool: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            directory: cli.directory,
            build_location: cli.build_location,
            tool: cli.tool,
            quiet: cli.quiet,
            keep_bom_owner: cli.owner,
        }
    }
}

fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(Cli::parse());
    let reporter = Reporter::new(config.quiet);
    tracing::debug!(?config, "starting");

    let tool_path = preflight::run_preflight_or_fail(&config, &reporter)?;

    let summary = Batch::new(config, tool_path).run()?;
    summary.print(&reporter);

    Ok(())
}
