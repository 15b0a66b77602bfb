//! pdfmerge - Combine PDF files into a single document.

use anyhow::Context;
use clap::Parser;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pdfmerge::MergeError;
use pdfmerge::MergeSession;
use pdfmerge::cli::Cli;
use pdfmerge::io::PdfWriter;
use pdfmerge::output::{OutputFormatter, display_file_list, display_merge_summary};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);

    if let Err(err) = run(cli, &formatter).await {
        let merge_error = err.downcast_ref::<MergeError>();
        match merge_error {
            Some(merge_error) => formatter.error(&merge_error.user_message()),
            None => formatter.error(&format!("{err:#}")),
        }
        tracing::debug!(error = ?err, "exiting with error");
        process::exit(merge_error.map(MergeError::exit_code).unwrap_or(1));
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pdfmerge=info"
    } else {
        "pdfmerge=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let config = cli
        .resolve_config()
        .await
        .context("Failed to load configuration")?;
    let paths = cli.input_paths()?;

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmerge::NAME, pdfmerge::VERSION));
    }

    let session = MergeSession::new(config)?;
    session.add_paths(&paths).await?;
    display_file_list(formatter, &session.files());

    formatter.blank_line();
    formatter.info("Merging documents...");
    let result = session.merge().await?;
    formatter.debug(&format!("Result published at {}", result.url));

    let writer = if cli.force {
        PdfWriter::overwriting()
    } else {
        PdfWriter::new()
    };
    let write_stats = result.save_to_dir(&cli.output_dir, &writer).await?;

    formatter.blank_line();
    display_merge_summary(formatter, &result.statistics, &write_stats);

    Ok(())
}
