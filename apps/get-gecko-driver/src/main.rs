#![warn(clippy::pedantic)]

//! # get-gecko-driver
//!
//! Resolves, downloads, and extracts GeckoDriver for Windows, Linux and macOS.
//!
//! Exactly one action runs per invocation:
//!
//! ```bash
//! get-gecko-driver --latest-version
//! get-gecko-driver --version-url 0.33.0 linux64
//! get-gecko-driver --download-latest --extract
//! get-gecko-driver --download-version 0.34.0 win64 --output drivers
//! ```
//!
//! Results go to stdout, diagnostics and errors to stderr. Any failure exits
//! with status 1, Ctrl+C with 130.

mod commands;
mod errors;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, CommandFactory, Parser};
use commands::{Action, DownloadOptions, download, install, latest, version_url};
use errors::CliError;
use tracing_subscriber::EnvFilter;

/// Download GeckoDriver for Windows, Linux and macOS.
#[derive(Parser, Debug)]
#[command(
    name = "get-gecko-driver",
    about = "Download GeckoDriver for Windows, Linux and macOS",
    disable_version_flag = true,
    group(
        ArgGroup::new("action")
            .multiple(false)
            .args([
                "latest_version",
                "latest_urls",
                "version_url",
                "latest_url",
                "download_latest",
                "download_version",
                "download_release",
                "install",
                "print_version",
            ])
    ),
    group(
        ArgGroup::new("download")
            .multiple(false)
            .args(["download_latest", "download_version", "download_release"])
    ),
    after_help = "\
PLATFORMS:
    win, win32, win64, linux, linux32, linux64, macos
    win, linux and macos pick 64-bit or 32-bit assets from the host.
    When a platform is omitted the host platform is used.

OUTPUT:
    The downloaded driver can be found at:
    <current directory>/geckodriver/<version>/bin/<geckodriver>
    unless --output is given.

ENVIRONMENT VARIABLES:
    GECKODRIVER_RELEASES_URL     Releases base URL (default: https://github.com/mozilla/geckodriver/releases)
    GECKODRIVER_LATEST_SELECTOR  CSS selector of the latest version on the release page
    RUST_LOG                     Log filter, overrides --verbose"
)]
pub struct Cli {
    /// Print the latest version.
    #[arg(long)]
    pub latest_version: bool,

    /// Print the latest version urls for all platforms.
    #[arg(long)]
    pub latest_urls: bool,

    /// Print the url of a version.
    #[arg(long, num_args = 1..=2, value_names = ["VERSION", "PLATFORM"])]
    pub version_url: Option<Vec<String>>,

    /// Print the latest version url for a platform.
    #[arg(long, num_args = 0..=1, value_name = "PLATFORM")]
    pub latest_url: Option<Option<String>>,

    /// Download the latest version for a platform.
    #[arg(long, num_args = 0..=1, value_name = "PLATFORM")]
    pub download_latest: Option<Option<String>>,

    /// Download a specific version.
    #[arg(long, num_args = 1..=2, value_names = ["VERSION", "PLATFORM"])]
    pub download_version: Option<Vec<String>>,

    /// Download a specific version, platform first.
    #[arg(long, num_args = 2, value_names = ["PLATFORM", "RELEASE"])]
    pub download_release: Option<Vec<String>>,

    /// Download and extract the latest version and add it to PATH.
    ///
    /// PATH is only changed for this process and programs it starts.
    #[arg(long)]
    pub install: bool,

    /// Extract the compressed driver file.
    #[arg(long, requires = "download")]
    pub extract: bool,

    /// Directory to save the driver in, instead of geckodriver/<version>/bin.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Log each resolution step to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the program version.
    #[arg(long = "version")]
    pub print_version: bool,
}

impl Cli {
    /// Returns the requested action, or `None` when no action flag was given.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        if self.latest_version {
            return Some(Action::LatestVersion);
        }
        if self.latest_urls {
            return Some(Action::LatestUrls);
        }
        if let Some(values) = &self.version_url {
            let (version, platform) = split_pair(values);
            return Some(Action::VersionUrl { version, platform });
        }
        if let Some(platform) = &self.latest_url {
            return Some(Action::LatestUrl {
                platform: platform.clone(),
            });
        }
        if let Some(platform) = &self.download_latest {
            return Some(Action::DownloadLatest {
                platform: platform.clone(),
            });
        }
        if let Some(values) = &self.download_version {
            let (version, platform) = split_pair(values);
            return Some(Action::DownloadVersion { version, platform });
        }
        if let Some(values) = &self.download_release {
            let (platform, version) = split_pair(values);
            return Some(Action::DownloadVersion {
                version: version.unwrap_or_default(),
                platform: Some(platform),
            });
        }
        if self.install {
            return Some(Action::Install);
        }
        if self.print_version {
            return Some(Action::PrintVersion);
        }
        None
    }

    fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            extract: self.extract,
            output: self.output.clone(),
        }
    }
}

/// Splits `[first, second?]` as parsed by clap for two-value flags.
fn split_pair(values: &[String]) -> (String, Option<String>) {
    let mut iter = values.iter().cloned();
    let first = iter.next().unwrap_or_default();
    (first, iter.next())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = tokio::select! {
        result = run(&cli) => result,
        Ok(()) = tokio::signal::ctrl_c() => Err(CliError::Interrupted.into()),
    };

    if let Err(e) = result {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Reports an error and returns the exit code.
///
/// Ctrl+C only ends the current line; every other failure prints one message.
fn handle_error(e: &anyhow::Error) -> i32 {
    let code = errors::exit_code(e);
    if code == errors::EXIT_INTERRUPTED {
        eprintln!();
    } else {
        errors::report(e);
    }
    code
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins over `--verbose`; without either only warnings are shown.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let options = cli.download_options();

    match cli.action() {
        Some(Action::LatestVersion) => latest::execute_version().await,
        Some(Action::LatestUrls) => latest::execute_urls().await,
        Some(Action::LatestUrl { platform }) => latest::execute_url(platform.as_deref()).await,
        Some(Action::VersionUrl { version, platform }) => {
            version_url::execute(&version, platform.as_deref()).await
        }
        Some(Action::DownloadLatest { platform }) => {
            download::execute_latest(platform.as_deref(), &options).await
        }
        Some(Action::DownloadVersion { version, platform }) => {
            download::execute_version(&version, platform.as_deref(), &options).await
        }
        Some(Action::Install) => install::execute(options.output.as_deref()).await,
        Some(Action::PrintVersion) => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
