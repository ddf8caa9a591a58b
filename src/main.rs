use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use artwork_match::{
    compare::ErrorReport,
    request::{self, Response},
    Comparator, CompareConfig, HttpFetcher, ImageLocator,
};

#[derive(Parser, Debug)]
#[command(
    name = "artmatch",
    about = "Perceptual similarity between two remotely hosted artwork images"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// No log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read {"url1": .., "url2": ..} from stdin and print the comparison (default).
    Compare,

    /// Fetch one image and print its fingerprints.
    Fingerprint {
        /// Image URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        None | Some(Commands::Compare) => cmd_compare(cli.config.as_deref(), cli.pretty).await,
        Some(Commands::Fingerprint { url }) => {
            cmd_fingerprint(cli.config.as_deref(), url, cli.pretty).await
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("artmatch failed: {err:#}");
            let report = ErrorReport::unexpected(format!("{err:#}"));
            // stdout is the only channel left
            let _ = request::emit(io::stdout().lock(), &report, cli.pretty);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompareConfig> {
    // from_json_file validates; the defaults are always valid
    match path {
        Some(path) => CompareConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CompareConfig::default()),
    }
}

async fn cmd_compare(config_path: Option<&Path>, pretty: bool) -> anyhow::Result<u8> {
    let config = load_config(config_path)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;

    let comparator = Comparator::new(HttpFetcher::new(&config)?, &config)?;
    let Response { body, exit_code } = request::handle(&input, &comparator).await;

    request::emit(io::stdout().lock(), &body, pretty)?;
    Ok(exit_code)
}

async fn cmd_fingerprint(config_path: Option<&Path>, url: &str, pretty: bool) -> anyhow::Result<u8> {
    let config = load_config(config_path)?;
    let locator = ImageLocator::new(url)?;

    let comparator = Comparator::new(HttpFetcher::new(&config)?, &config)?;
    let hashes = comparator.fingerprint_one(&locator).await?;

    request::emit(io::stdout().lock(), &hashes, pretty)?;
    Ok(0)
}
