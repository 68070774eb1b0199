mod platform;

use std::path::PathBuf;

use clap::Parser;

/// Review AI-generated product listing copy from the terminal.
#[derive(Debug, Parser)]
#[command(name = "listing_app", version, about)]
struct Args {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = "listing.ron")]
    config: PathBuf,
    /// JSON snapshot of the product cards to review.
    #[arg(long)]
    page: PathBuf,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    platform::run_app(platform::AppOptions {
        config: args.config,
        page: args.page,
        verbose: args.verbose,
    })
}
