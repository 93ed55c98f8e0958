mod error;
mod export;
mod fetch;
mod parser;
mod scrape;
mod server;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use export::OutputFormat;
use fetch::Fetcher;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "lyrics_scraper",
    about = "Extract lyrics containers (div[data-lyrics-container=\"true\"]) from web pages"
)]
struct Cli {
    /// Config file (toml/json/yaml); LYRICS_* env vars override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture raw container HTML and text from one or more pages
    Batch {
        /// URLs to scrape
        urls: Vec<String>,
        /// File with additional URLs, one per line
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (default: json for files, a plain listing for stdout)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Split one page's containers into classified fragments
    Extract {
        /// URL of the page to scrape
        url: String,
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
        format: OutputFormat,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Serve the web form
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Custom User-Agent string
    #[arg(long)]
    user_agent: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Delay between requests in seconds
    #[arg(long)]
    delay: Option<f64>,
    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,
}

impl RequestArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            user_agent: self.user_agent,
            timeout_secs: self.timeout,
            delay_secs: self.delay,
            insecure: self.insecure,
            bind: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Batch {
            urls,
            input,
            output,
            format,
            request,
        } => {
            let settings = settings.apply(request.overrides());
            let urls = collect_urls(urls, input.as_deref())?;
            if urls.is_empty() {
                bail!("No URLs given. Pass them as arguments or with --input.");
            }
            run_batch(&settings, &urls, output.as_deref(), format).await
        }
        Commands::Extract {
            url,
            output,
            format,
            request,
        } => {
            let settings = settings.apply(request.overrides());
            run_extract(&settings, &url, output.as_deref(), format).await
        }
        Commands::Serve { bind } => {
            let settings = settings.apply(Overrides {
                bind,
                ..Overrides::default()
            });
            server::serve(&settings).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

async fn run_batch(
    settings: &Settings,
    urls: &[String],
    output: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let fetcher = Fetcher::new(settings)?;
    let outcome = scrape::scrape_batch(&fetcher, urls).await?;
    if outcome.records.is_empty() {
        bail!("No results found.");
    }
    if outcome.errors > 0 {
        info!("{} of {} pages yielded containers", outcome.ok, urls.len());
    }

    let records = &outcome.records;
    match batch_output(output, format) {
        BatchOutput::Listing => export::emit(None, OutputFormat::Txt, |w| {
            export::text::write_listing(w, records)
        }),
        BatchOutput::Format(format) => {
            export::emit(output, format, |w| export::write_records(w, records, format))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BatchOutput {
    /// Plain console listing on stdout.
    Listing,
    Format(OutputFormat),
}

/// An explicit format always wins; files default to JSON, bare stdout gets the listing.
fn batch_output(output: Option<&Path>, format: Option<OutputFormat>) -> BatchOutput {
    match (output, format) {
        (_, Some(format)) => BatchOutput::Format(format),
        (Some(_), None) => BatchOutput::Format(OutputFormat::Json),
        (None, None) => BatchOutput::Listing,
    }
}

async fn run_extract(
    settings: &Settings,
    url: &str,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let fetcher = Fetcher::new(settings)?;
    let containers = scrape::scrape_structured(&fetcher, url)
        .await
        .with_context(|| format!("Failed to scrape {}", url))?;
    if containers.is_empty() {
        bail!("No results found.");
    }
    export::emit(output, format, |w| export::write_structured(w, &containers, format))
}

/// Positional URLs first, then the input file's non-blank, non-comment lines.
fn collect_urls(mut urls: Vec<String>, input: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        urls.extend(parse_url_list(&text));
    }
    Ok(urls)
}

fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
