use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::data::evaluate::{Evaluation, evaluate};
use crate::data::filter::ConstraintSet;
use crate::data::loader::load_file;
use crate::data::model::{DatasetSchema, HotelDataset};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Explore hotel listings by region, price, rating and walk time.
#[derive(Debug, Parser)]
#[command(name = "hotel-scope", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Table to open in the viewer (.csv, .json or .parquet).
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the filtered count and rankings as JSON, without a window.
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Table to read (.csv, .json or .parquet).
    pub path: PathBuf,

    /// Prefecture to include; repeat for several. Defaults to all.
    #[arg(long = "region", value_name = "PREFECTURE")]
    pub regions: Vec<String>,

    /// Upper bound on price per person. Defaults to the dataset maximum.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Lower bound on rating. Ignored when the table has no ratings.
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Upper bound on walk minutes. Ignored when no walk times are recorded.
    #[arg(long)]
    pub max_walk: Option<u32>,

    /// Single-line JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

impl ReportArgs {
    /// Start from the unconstrained defaults and apply the flags given.
    pub fn constraints(&self, dataset: &HotelDataset) -> ConstraintSet {
        let open = ConstraintSet::unconstrained(dataset);
        ConstraintSet {
            selected_regions: if self.regions.is_empty() {
                open.selected_regions
            } else {
                self.regions.iter().cloned().collect::<BTreeSet<_>>()
            },
            price_ceiling: self.max_price.unwrap_or(open.price_ceiling),
            rating_floor: open.rating_floor.map(|f| self.min_rating.unwrap_or(f)),
            walk_ceiling: open.walk_ceiling.map(|w| self.max_walk.unwrap_or(w)),
        }
    }
}

// ---------------------------------------------------------------------------
// Headless report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub total: usize,
    pub schema: DatasetSchema,
    #[serde(flatten)]
    pub evaluation: &'a Evaluation,
}

pub fn run_report(args: &ReportArgs, out: &mut impl Write) -> Result<()> {
    let dataset = load_file(&args.path)
        .with_context(|| format!("loading {}", args.path.display()))?;
    let constraints = args.constraints(&dataset);
    log::debug!("Report constraints: {constraints:?}");

    let evaluation = evaluate(&dataset, &constraints);
    let report = Report {
        total: dataset.len(),
        schema: dataset.schema,
        evaluation: &evaluation,
    };

    if args.compact {
        serde_json::to_writer(&mut *out, &report)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, &report)?;
    }
    writeln!(out).context("writing report")?;
    Ok(())
}
