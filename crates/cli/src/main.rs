mod io;
mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use forestplan::geom2::rand::{draw_boundary_radial, rescale_to_area, RadialCfg, ReplayToken};
use forestplan::partition::{partition, PartitionCfg, PartitionStrategy};
use forestplan::sampling::{generate_samples_with, PlacementMethod, SamplingCfg};
use forestplan::stats::{compartment_stats, plot_stats};
use forestplan::{Coord, Polygon};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

use crate::io::TableFormat;
use crate::provenance::Payload;

#[derive(Parser)]
#[command(name = "forestplan")]
#[command(about = "Equal-area compartments and sample plots for forest boundaries")]
struct Cmd {
    /// Optional run label; propagated to provenance sidecars and logs
    #[arg(long, global = true)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Cut a boundary into compartments and write compartments.json
    Partition {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        count: usize,
        #[arg(long, value_enum, default_value_t = StrategyArg::Balanced)]
        strategy: StrategyArg,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Partition, then place sample plots and write the plot table
    Sample {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        count: usize,
        #[arg(long, value_enum, default_value_t = StrategyArg::Balanced)]
        strategy: StrategyArg,
        #[arg(long, default_value_t = 0.02)]
        intensity: f64,
        #[arg(long, default_value_t = 5)]
        min_plots: usize,
        #[arg(long, value_enum, default_value_t = MethodArg::Systematic)]
        method: MethodArg,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = TableFormat::Csv)]
        format: TableFormat,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Run the full pipeline on a random convex boundary of the given area (m²)
    Demo {
        #[arg(long, default_value_t = 4)]
        count: usize,
        #[arg(long, default_value_t = 1.0e6)]
        area: f64,
        #[arg(long, default_value_t = 12)]
        vertices: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = MethodArg::Systematic)]
        method: MethodArg,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print a small provenance JSON block with the default parameters
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Midpoint,
    Balanced,
}

impl From<StrategyArg> for PartitionStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Midpoint => PartitionStrategy::Midpoint,
            StrategyArg::Balanced => PartitionStrategy::Balanced,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    Systematic,
    Random,
}

impl From<MethodArg> for PlacementMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Systematic => PlacementMethod::Systematic,
            MethodArg::Random => PlacementMethod::Random,
        }
    }
}

/// Demo boundaries are centred on a UTM-like false origin.
const DEMO_ORIGIN: Coord<f64> = Coord {
    x: 500_000.0,
    y: 4_000_000.0,
};

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Partition {
            input,
            count,
            strategy,
            out_dir,
        } => {
            let boundary = io::read_boundary(&input)?;
            let cfg = PartitionCfg {
                strategy: strategy.into(),
                ..PartitionCfg::default()
            };
            let params = json!({
                "input": input,
                "count": count,
                "strategy": format!("{strategy:?}"),
            });
            run(&boundary, count, &cfg, None, &out_dir, cmd.tag, params)
        }
        Action::Sample {
            input,
            count,
            strategy,
            intensity,
            min_plots,
            method,
            seed,
            format,
            out_dir,
        } => {
            let boundary = io::read_boundary(&input)?;
            let pcfg = PartitionCfg {
                strategy: strategy.into(),
                ..PartitionCfg::default()
            };
            let scfg = SamplingCfg {
                intensity,
                min_per_compartment: min_plots,
                method: method.into(),
                replay: ReplayToken::new(seed, 0),
                ..SamplingCfg::default()
            };
            let params = json!({
                "input": input,
                "count": count,
                "strategy": format!("{strategy:?}"),
                "intensity": intensity,
                "min_plots": min_plots,
                "method": format!("{method:?}"),
                "seed": seed,
            });
            run(&boundary, count, &pcfg, Some((&scfg, format)), &out_dir, cmd.tag, params)
        }
        Action::Demo {
            count,
            area,
            vertices,
            seed,
            method,
            out_dir,
        } => demo(count, area, vertices, seed, method, &out_dir, cmd.tag),
        Action::Report => report(cmd.tag),
    }
}

fn run(
    boundary: &Polygon<f64>,
    count: usize,
    pcfg: &PartitionCfg,
    sampling: Option<(&SamplingCfg, TableFormat)>,
    out_dir: &Path,
    tag: Option<String>,
    params: serde_json::Value,
) -> Result<()> {
    tracing::info!(count, out_dir = %out_dir.display(), tag = ?tag, "run");
    let part = partition(boundary, count, pcfg).context("partitioning boundary")?;
    let cstats = compartment_stats(&part.compartments);
    tracing::info!(
        compartments = cstats.count,
        mean_area = cstats.mean_area,
        std_area = cstats.std_area,
        "partition done"
    );

    let compartments_path = out_dir.join("compartments.json");
    io::write_json(&compartments_path, &io::compartments_json(&part.compartments))?;
    let mut siblings = Vec::new();

    let (pstats, shortfalls) = match sampling {
        Some((scfg, format)) => {
            let samples = generate_samples_with(&part.compartments, scfg).context("placing sample plots")?;
            let ext = match format {
                TableFormat::Csv => "csv",
                TableFormat::Parquet => "parquet",
            };
            let plots_path = out_dir.join(format!("plots.{ext}"));
            io::write_plots(&plots_path, &samples.plots, format)?;
            siblings.push(plots_path);
            (Some(plot_stats(&samples.plots)), samples.shortfalls)
        }
        None => (None, Vec::new()),
    };

    let summary_path = out_dir.join("summary.json");
    io::write_json(
        &summary_path,
        &io::summary_json(&cstats, pstats.as_ref(), &part.deviations, &shortfalls),
    )?;
    siblings.push(summary_path);

    let prov = provenance::write_sidecar(
        &compartments_path,
        Payload::new(params).with_tag(tag).with_siblings(&siblings),
    )?;
    tracing::info!(provenance = %prov.display(), "outputs written");
    Ok(())
}

fn demo(
    count: usize,
    area: f64,
    vertices: usize,
    seed: u64,
    method: MethodArg,
    out_dir: &Path,
    tag: Option<String>,
) -> Result<()> {
    let cfg = RadialCfg {
        vertices,
        ..RadialCfg::default()
    };
    let raw = draw_boundary_radial(cfg, ReplayToken::new(seed, 0)).context("drawing demo boundary")?;
    let boundary = rescale_to_area(&raw, area, DEMO_ORIGIN).context("area must be positive and finite")?;
    let boundary_path = out_dir.join("boundary.json");
    io::write_json(&boundary_path, &serde_json::to_value(io::BoundaryFile::from_polygon(&boundary))?)?;

    let scfg = SamplingCfg {
        method: method.into(),
        replay: ReplayToken::new(seed, 1),
        ..SamplingCfg::default()
    };
    let params = json!({
        "demo": true,
        "input": boundary_path,
        "count": count,
        "area": area,
        "vertices": vertices,
        "seed": seed,
        "method": format!("{method:?}"),
    });
    run(
        &boundary,
        count,
        &PartitionCfg::default(),
        Some((&scfg, TableFormat::Csv)),
        out_dir,
        tag,
        params,
    )
}

fn report(tag: Option<String>) -> Result<()> {
    let pcfg = PartitionCfg::default();
    let scfg = SamplingCfg::default();
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "forestplan_version": forestplan::VERSION,
        "tag": tag,
        "params": {
            "partition": {
                "strategy": format!("{:?}", pcfg.strategy),
                "accept_frac": pcfg.accept_frac,
                "max_depth": pcfg.max_depth,
                "balance_tolerance": pcfg.balance_tolerance,
            },
            "sampling": {
                "intensity": scfg.intensity,
                "min_per_compartment": scfg.min_per_compartment,
                "method": format!("{:?}", scfg.method),
                "attempts_factor": scfg.attempts_factor,
            },
        },
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
