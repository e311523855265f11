//! The `jobscout` run: build the client, open the output, crawl.

use std::path::Path;

use jobscout_core::{AppConfig, InputParts};
use jobscout_scraper::{CrawlSettings, Crawler, RunSummary, SiteClient};

use crate::sink::JsonLinesSink;

/// Runs one crawl and writes its records to `output` as JSON lines.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the output file cannot
/// be created, or the crawl fails fatally. Per-item failures are logged by
/// the crawler and only show up in the summary's `skipped` count.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    input: &InputParts,
    output: &Path,
) -> anyhow::Result<RunSummary> {
    let client = SiteClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build site client: {e}"))?;
    let sink = JsonLinesSink::create(output)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", output.display()))?;

    tracing::info!(
        query = %input.query,
        location = %input.location,
        region = input.region.as_deref().unwrap_or(""),
        category = %input.category,
        output = %output.display(),
        "starting crawl"
    );

    let crawler = Crawler::new(client, CrawlSettings::from_config(config));
    let summary = crawler.run(input, &sink).await?;
    sink.finish()?;
    Ok(summary)
}
