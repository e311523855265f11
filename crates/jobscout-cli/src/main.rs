mod crawl;
mod sink;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscout_core::{CrawlInput, InputError, MaxResults};

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Crawl job postings or employer listings into JSON lines")]
struct Cli {
    /// Input JSON file (`query`, `location`, `locationState`, `category`,
    /// `maxResults`). Flags below override its fields.
    #[arg(long, short)]
    input: Option<PathBuf>,

    #[arg(long, short)]
    query: Option<String>,

    #[arg(long, short)]
    location: Option<String>,

    /// Region code used to pick among location candidates, e.g. `TX`.
    #[arg(long)]
    region: Option<String>,

    /// `Jobs` or `Companies`.
    #[arg(long)]
    category: Option<String>,

    /// Maximum listing items; read from the first page when unset.
    #[arg(long)]
    max_results: Option<String>,

    /// Output file; defaults to `JOBSCOUT_OUTPUT_PATH`.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Cli {
    fn crawl_input(&self) -> Result<CrawlInput, InputError> {
        let from_file = match &self.input {
            Some(path) => CrawlInput::from_file(path)?,
            None => CrawlInput::default(),
        };
        Ok(from_file.merged_with(CrawlInput {
            query: self.query.clone(),
            location: self.location.clone(),
            location_state: self.region.clone(),
            category: self.category.clone(),
            max_results: self.max_results.clone().map(MaxResults::Text),
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = jobscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let input = cli.crawl_input()?.into_parts()?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output_path.clone());

    let summary = crawl::run_crawl(&config, &input, &output).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
