//! Percepta CLI: runs the perceptual network analysis over a survey export
//!
//! With a campaign id, analyzes that campaign. Without one, analyzes every
//! closed or archived campaign, oldest first, continuing past failures.

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{ContentArrangement, Table};
use percepta::{
    AnalysisConfig, Analyzer, BatchSummary, CampaignOutcome, DatasetSource, MemoryReportSink, Report, ReportSink,
    ReportStore,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "percepta", version, about = "Perceptual network analysis for climate survey campaigns")]
struct Cli {
    /// Campaign to analyze; all closed/archived campaigns when omitted
    campaign_id: Option<String>,

    /// JSON export of the survey database
    #[arg(long, env = "PERCEPTA_DATASET")]
    dataset: PathBuf,

    /// Report store directory
    #[arg(long, default_value = "./percepta-data", env = "PERCEPTA_STORE")]
    store: PathBuf,

    /// Analyze without persisting reports
    #[arg(long)]
    dry_run: bool,

    /// YAML analysis configuration
    #[arg(long, env = "PERCEPTA_CONFIG")]
    config: Option<PathBuf>,

    /// Number of community detection runs
    #[arg(long, env = "PERCEPTA_STABILITY_ITERATIONS")]
    iterations: Option<usize>,

    /// Minimum completed respondents per campaign
    #[arg(long, env = "PERCEPTA_MIN_RESPONDENTS")]
    min_respondents: Option<usize>,

    /// Skip the graph image
    #[arg(long)]
    no_image: bool,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            AnalysisConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(k) = cli.iterations {
        config.stability.iterations = k;
    }
    if let Some(min) = cli.min_respondents {
        config.min_respondents = min;
    }
    if cli.no_image {
        config.render_image = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = load_config(&cli)?;
    let source = DatasetSource::from_file(&cli.dataset)
        .with_context(|| format!("reading dataset {}", cli.dataset.display()))?;
    let sink: Box<dyn ReportSink> = if cli.dry_run {
        Box::new(MemoryReportSink::new())
    } else {
        Box::new(ReportStore::open(&cli.store).with_context(|| format!("opening store {}", cli.store.display()))?)
    };
    let analyzer = Analyzer::new(config)?;

    match &cli.campaign_id {
        Some(id) => match analyzer.process_campaign(&source, sink.as_ref(), id) {
            Ok(report) => print_report(&report, &cli.format)?,
            Err(e) if e.is_skip() => println!("Campaign {} skipped: {}", id, e),
            Err(e) => return Err(e).with_context(|| format!("campaign {}", id)),
        },
        None => {
            let summary = analyzer.process_all(&source, sink.as_ref())?;
            print_batch(&summary, &cli.format)?;
        }
    }

    Ok(())
}

fn print_report(report: &Report, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", report.to_json_pretty()?);
        }
        OutputFormat::Table => {
            let s = &report.summary;
            println!("Nodes:       {}", s.nodes);
            println!("Edges:       {}", s.edges);
            println!("Density:     {}", s.density);
            println!("Threshold:   {}", s.threshold);
            println!("Modularity:  {}", s.modularity);
            println!("Clustering:  {}", s.avg_clustering);
            println!(
                "Stability:   {} ({}, {} runs)",
                report.stability.nmi, report.stability.label, report.stability.iterations
            );

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Group", "Size", "%", "Avg", "Dominant department"]);
            for c in &report.communities {
                table.add_row(vec![
                    (c.id + 1).to_string(),
                    c.size.to_string(),
                    c.pct.to_string(),
                    format!("{:.2}", c.avg_score),
                    c.dominant_department.clone(),
                ]);
            }
            println!("{}", table);

            if !report.discriminants.is_empty() {
                let mut table = Table::new();
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(vec!["Dimension", "Spread", "Highest group", "Lowest group"]);
                for d in &report.discriminants {
                    table.add_row(vec![
                        d.code.to_string(),
                        d.spread.to_string(),
                        format!("{} ({})", d.max_cluster + 1, d.max_value),
                        format!("{} ({})", d.min_cluster + 1, d.min_value),
                    ]);
                }
                println!("{}", table);
            }

            println!("{} bridge(s), {} critical edge(s)", report.bridges.len(), report.critical_edges.len());
            println!();
            println!("{}", report.narrative);
        }
    }
    Ok(())
}

fn print_batch(summary: &BatchSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = summary
                .outcomes
                .iter()
                .map(|(id, outcome)| {
                    let (status, detail) = outcome_columns(outcome);
                    serde_json::json!({ "campaign_id": id, "status": status, "detail": detail })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            if summary.outcomes.is_empty() {
                println!("(no campaigns)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Campaign", "Status", "Detail"]);
            for (id, outcome) in &summary.outcomes {
                let (status, detail) = outcome_columns(outcome);
                table.add_row(vec![id.clone(), status.to_string(), detail]);
            }
            println!("{}", table);
            println!(
                "{} completed, {} skipped, {} failed",
                summary.completed(),
                summary.skipped(),
                summary.failed()
            );
        }
    }
    Ok(())
}

fn outcome_columns(outcome: &CampaignOutcome) -> (&'static str, String) {
    match outcome {
        CampaignOutcome::Completed => ("completed", String::new()),
        CampaignOutcome::Skipped(reason) => ("skipped", reason.clone()),
        CampaignOutcome::Failed(reason) => ("failed", reason.clone()),
    }
}
