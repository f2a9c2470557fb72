use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod error;
mod load;
mod metrics;
mod models;
mod output;
mod report;

use models::RateTable;

#[derive(Parser)]
#[command(name = "client-utilization-report")]
#[command(about = "Client utilization and revenue segmentation report", long_about = None)]
struct Cli {
    /// Spreadsheet export (CSV) holding the client service table
    #[arg(long, default_value = "clean_data.csv")]
    input: PathBuf,

    /// Directory the tables and charts are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let rates = RateTable::default();

    let rows = load::load_clients(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let records = metrics::enrich(rows, &rates)?;
    let summary = report::portfolio_summary(&records, &rates);
    let rollups = report::segment_rollup(&records);

    print!("{}", report::render_summary(&summary, &rollups));

    // Outputs are written only once the whole pipeline has succeeded, so a
    // failed run never leaves a fresh-looking partial table behind.
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let metrics_path = cli.out_dir.join("client_metrics.csv");
    let summary_path = cli.out_dir.join("segment_summary.csv");
    let revenue_chart_path = cli.out_dir.join("revenue_by_segment.png");
    let gap_chart_path = cli.out_dir.join("unrealized_hours_by_client.png");

    output::write_metrics_csv(&metrics_path, &records)?;
    output::write_segment_summary(&summary_path, &rollups)?;
    output::revenue_by_segment_chart(&revenue_chart_path, &rollups)?;
    output::gap_by_client_chart(&gap_chart_path, &records)?;

    println!();
    println!("Saved files:");
    for path in [
        &metrics_path,
        &summary_path,
        &revenue_chart_path,
        &gap_chart_path,
    ] {
        println!("- {}", path.display());
    }

    Ok(())
}
