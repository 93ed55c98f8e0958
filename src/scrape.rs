use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::parser::containers::ContainerRecord;
use crate::parser::fragments::StructuredContainer;
use crate::parser::{parse_raw, parse_structured};

/// Results and counters returned after a batch run.
pub struct BatchOutcome {
    pub records: Vec<ContainerRecord>,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch one page and capture every lyrics container on it.
pub async fn scrape_containers(
    fetcher: &Fetcher,
    url: &str,
) -> Result<Vec<ContainerRecord>, ScrapeError> {
    let html = fetcher.fetch_html(url).await?;
    let records = parse_raw(url, &html);
    if records.is_empty() {
        warn!("No divs with data-lyrics-container='true' found on {}", url);
        return Err(ScrapeError::NoContainers(url.to_string()));
    }
    info!("Found {} lyrics containers on {}", records.len(), url);
    Ok(records)
}

/// Fetch one page and classify the content of its containers.
pub async fn scrape_structured(
    fetcher: &Fetcher,
    url: &str,
) -> Result<Vec<StructuredContainer>, ScrapeError> {
    let html = fetcher.fetch_html(url).await?;
    let (containers, total) = parse_structured(&html);
    if total == 0 {
        warn!("No divs with data-lyrics-container='true' found on {}", url);
        return Err(ScrapeError::NoContainers(url.to_string()));
    }
    info!(
        "Found {} lyrics containers on {} ({} with content)",
        total,
        url,
        containers.len()
    );
    Ok(containers)
}

/// Scrape each URL in order. Failures are logged and counted, never fatal.
pub async fn scrape_batch(fetcher: &Fetcher, urls: &[String]) -> Result<BatchOutcome> {
    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut records = Vec::new();
    let mut ok = 0usize;
    let mut errors = 0usize;

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !fetcher.delay().is_zero() {
            tokio::time::sleep(fetcher.delay()).await;
        }
        pb.set_message(url.clone());

        match scrape_containers(fetcher, url).await {
            Ok(found) => {
                ok += 1;
                records.extend(found);
            }
            Err(e) => {
                errors += 1;
                if e.is_network() {
                    warn!("Error during request to {}: {}", url, e);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} pages ({} ok, {} errors), {} containers",
        urls.len(),
        ok,
        errors,
        records.len()
    );

    Ok(BatchOutcome {
        records,
        ok,
        errors,
    })
}
