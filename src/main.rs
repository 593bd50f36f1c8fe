use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use bomfix_config::Config;
use bomfix_fs::{ChardetGuesser, SaveWatcher, TracingSink};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod host;

use host::{Host, Summary, collect_documents};

#[derive(Parser)]
#[command(name = "bomfix")]
#[command(about = "Re-encode saved text files as UTF-8 with a byte-order mark", long_about = None)]
struct Cli {
    /// Configuration file (default: first of ~/.bomfix/config.toml, ~/.config/bomfix/config.toml,
    /// /etc/bomfix/config.toml, ./.bomfix.toml, ./bomfix.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Encoding used when the detector's guess is not trusted
    #[arg(long, value_name = "LABEL")]
    fallback: Option<String>,

    /// Keep running and normalize files each time they are saved
    #[arg(short, long)]
    watch: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Files or directories to normalize
    #[arg(required_unless_present = "print_config")]
    paths: Vec<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };
    if let Some(fallback) = cli.fallback {
        config.normalize.fallback_encoding = fallback;
        config.validate().context("invalid --fallback")?;
    }

    if cli.print_config {
        print!("{}", config.to_toml_string());
        return Ok(ExitCode::SUCCESS);
    }

    let files = collect_documents(&cli.paths, &config.documents);
    let mut host = Host::new(&config, ChardetGuesser::new(), TracingSink);

    if cli.watch {
        let mut watcher = SaveWatcher::new(config.watch.to_watcher_config());
        let summary = host.run_watch(&mut watcher, &files)?;
        log_summary(&summary);
        return Ok(ExitCode::SUCCESS);
    }

    let summary = host.run_once(&files);
    log_summary(&summary);

    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn log_summary(summary: &Summary) {
    tracing::info!(
        converted = summary.converted,
        skipped = summary.skipped,
        ignored = summary.ignored,
        failed = summary.failed,
        "done"
    );
}
