mod config;
mod generate;

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::prelude::*;

use crate::config::{Overrides, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Spy generator for Go interfaces.
#[derive(Parser)]
#[command(
    name = "fm",
    version = concat!("version ", env!("CARGO_PKG_VERSION")),
    about = "Spy generator for Go interfaces"
)]
struct Cli {
    /// Directory to scan for Go source files
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// File name of the generated artifact [default: fm_test.go]
    #[arg(long)]
    out: Option<String>,

    /// Spy type name prefix [default: Fake]
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix appended to the package name of the artifact [default: _test]
    #[arg(long, allow_hyphen_values = true)]
    package_suffix: Option<String>,

    /// Guard every spy method with a mutex
    #[arg(long)]
    thread_safe: bool,

    /// Run goimports on every written artifact
    #[arg(long)]
    goimports: bool,

    /// Config file [default: <dir>/fm.toml when present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long)]
    quiet: bool,

    /// Log per-file and per-spy detail to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (file, source) = match config::load_config(cli.config.as_deref(), &cli.dir) {
        Ok(loaded) => loaded,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Some(path) = &source {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let settings = Settings::resolve(
        Overrides {
            out: cli.out,
            prefix: cli.prefix,
            package_suffix: cli.package_suffix,
            thread_safe: cli.thread_safe,
            goimports: cli.goimports,
        },
        file.generate,
    );
    generate::cmd_generate(&cli.dir, &settings, cli.output, cli.quiet);
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", msg);
            }
        }
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
