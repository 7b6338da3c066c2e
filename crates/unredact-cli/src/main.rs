use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing_subscriber::EnvFilter;

use unredact_core::config_file::{self, ConfigFile};
use unredact_ingest::MatchMode;

mod output;

use output::ColorMode;

/// Default output directory, relative to the current working directory.
const DEFAULT_OUTPUT_DIR: &str = "UNREDACTED_OUTPUT";

/// Recover text from improperly redacted PDFs
///
/// Extracts the text layer of every page, including text hidden under black
/// boxes that were drawn over it, and writes one `<name>_RECOVERED.txt` per PDF.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// PDF file or directory to scan recursively
    path: PathBuf,

    /// Output directory [default: UNREDACTED_OUTPUT]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of worker threads [default: CPU count - 1]
    #[arg(short, long)]
    threads: Option<usize>,

    /// Only match a lower-case `.pdf` extension when scanning directories
    #[arg(long)]
    case_sensitive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// List the PDFs that would be processed without opening them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Hidden until processing starts; log lines suspend it while writing.
    let bar = ProgressBar::hidden();
    init_tracing(&bar);
    std::panic::set_hook(bar_aware_panic_hook(bar.clone(), std::panic::take_hook()));

    let file_config = config_file::load_config();
    run(cli, file_config, bar).await
}

/// `RUST_LOG` if it parses, otherwise errors only. Per-file failures are
/// reported in the summary, not again as log lines.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("error"))
}

fn init_tracing(bar: &ProgressBar) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_target(false)
        .with_writer(output::BarWriter::new(bar.clone()))
        .init();
}

type PanicHook = Box<dyn Fn(&std::panic::PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Run `inner` with the progress bar suspended. Worker panics are caught by
/// the pool, but the hook still prints while the bar is drawing.
fn bar_aware_panic_hook(bar: ProgressBar, inner: PanicHook) -> PanicHook {
    Box::new(move |info| bar.suspend(|| inner(info)))
}

/// Settings after applying CLI flags > env vars > config file > defaults.
#[derive(Debug, PartialEq, Eq)]
struct Options {
    output_dir: PathBuf,
    threads: usize,
    case_sensitive: bool,
    /// Color was not disabled; still subject to stdout being a terminal.
    color: bool,
}

fn resolve_options(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
    file_config: &ConfigFile,
) -> Options {
    let output_dir = cli
        .output
        .clone()
        .or_else(|| env("UNREDACT_OUTPUT").map(PathBuf::from))
        .or_else(|| file_config.output_dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let threads = cli
        .threads
        .or_else(|| env("UNREDACT_THREADS").and_then(|v| v.parse().ok()))
        .or_else(|| file_config.threads())
        .unwrap_or_else(unredact_core::default_threads)
        .max(1);

    Options {
        output_dir,
        threads,
        case_sensitive: cli.case_sensitive || file_config.case_sensitive().unwrap_or(false),
        color: !cli.no_color && file_config.color().unwrap_or(true),
    }
}

async fn run(cli: Cli, file_config: ConfigFile, bar: ProgressBar) -> anyhow::Result<()> {
    let Options {
        output_dir,
        threads,
        case_sensitive,
        color,
    } = resolve_options(&cli, |key| std::env::var(key).ok(), &file_config);
    let color = ColorMode(color && std::io::stdout().is_terminal());

    let input_root = unredact_ingest::resolve_path(&cli.path)?;
    let mode = MatchMode::from_case_sensitive(case_sensitive);
    tracing::debug!(
        input = %input_root.display(),
        output = %output_dir.display(),
        threads,
        case_sensitive,
        "resolved configuration"
    );
    let mut stdout = std::io::stdout();

    if cli.dry_run {
        let pdfs = unredact_ingest::find_pdfs(&input_root, mode);
        if pdfs.is_empty() {
            println!("No PDFs found.");
            return Ok(());
        }
        output::print_dry_run(&mut stdout, &pdfs, color)?;
        return Ok(());
    }

    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    let output_root = std::fs::canonicalize(&output_dir)
        .with_context(|| format!("failed to resolve output directory {}", output_dir.display()))?;

    let pdfs = unredact_ingest::find_pdfs(&input_root, mode);
    if pdfs.is_empty() {
        println!("No PDFs found.");
        return Ok(());
    }

    output::print_run_header(&mut stdout, pdfs.len(), threads, &output_root, color)?;

    let backend = unredact_ingest::default_backend()?;
    let config = unredact_core::Config {
        input_root,
        output_root,
        num_workers: threads,
    };

    bar.set_length(pdfs.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/dim}] {pos}/{len} ({per_sec}, eta {eta})",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    bar.set_message("Processing");
    bar.set_draw_target(ProgressDrawTarget::stderr());
    bar.enable_steady_tick(Duration::from_millis(120));

    let summary = unredact_core::run_batch(pdfs, backend, config, |_| bar.inc(1)).await;
    bar.finish();

    output::print_summary(&mut stdout, &summary, color)?;

    Ok(())
}
