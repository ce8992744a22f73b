use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use forestplan::partition::{AreaDeviation, Compartment};
use forestplan::sampling::{SamplePoint, Shortfall};
use forestplan::stats::{CompartmentStats, PlotStats};
use forestplan::{Coord, LineString, Polygon};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Boundary file: `{"exterior": [[x, y], …], "holes": [[[x, y], …], …]}` in metric coordinates.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BoundaryFile {
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl BoundaryFile {
    pub fn to_polygon(&self) -> Polygon<f64> {
        let ring = |pts: &[[f64; 2]]| LineString::from(pts.to_vec());
        Polygon::new(ring(&self.exterior), self.holes.iter().map(|h| ring(h)).collect())
    }

    pub fn from_polygon(poly: &Polygon<f64>) -> Self {
        let ring = |ls: &LineString<f64>| -> Vec<[f64; 2]> { ls.0.iter().map(|c| [c.x, c.y]).collect() };
        Self {
            exterior: ring(poly.exterior()),
            holes: poly.interiors().iter().map(ring).collect(),
        }
    }
}

/// Plot table output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Csv,
    Parquet,
}

pub fn read_boundary(path: &Path) -> Result<Polygon<f64>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file: BoundaryFile =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing boundary {}", path.display()))?;
    if file.exterior.is_empty() {
        bail!("boundary {} has an empty exterior ring", path.display());
    }
    Ok(file.to_polygon())
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))
}

pub fn compartments_json(compartments: &[Compartment]) -> Value {
    let ring = |ls: &LineString<f64>| ls.0.iter().map(|c: &Coord<f64>| [c.x, c.y]).collect::<Vec<_>>();
    let rows: Vec<Value> = compartments
        .iter()
        .map(|c| {
            json!({
                "compartment_id": c.id,
                "area": c.area,
                "exterior": ring(c.polygon.exterior()),
                "holes": c.polygon.interiors().iter().map(ring).collect::<Vec<_>>(),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn summary_json(
    cstats: &CompartmentStats,
    pstats: Option<&PlotStats>,
    deviations: &[AreaDeviation],
    shortfalls: &[Shortfall],
) -> Value {
    json!({
        "compartments": {
            "count": cstats.count,
            "total_area": cstats.total_area,
            "mean_area": cstats.mean_area,
            "min_area": cstats.min_area,
            "max_area": cstats.max_area,
            "std_area": cstats.std_area,
            "area_variance": cstats.variance,
        },
        "area_deviations": deviations.iter().map(|d| json!({
            "compartment_id": d.id,
            "area": d.area,
            "deviation": d.deviation,
            "tolerance": d.tolerance,
        })).collect::<Vec<_>>(),
        "plots": pstats.map(|p| json!({
            "total_plots": p.total_plots,
            "plots_per_compartment": p.plots_per_compartment,
            "min_plots": p.min,
            "max_plots": p.max,
            "avg_plots": p.average,
        })),
        "shortfalls": shortfalls.iter().map(|s| json!({
            "compartment_id": s.compartment_id,
            "requested": s.requested,
            "placed": s.placed,
        })).collect::<Vec<_>>(),
    })
}

/// Plot table with columns `plot_id, compartment_id, easting, northing`.
pub fn plots_frame(plots: &[SamplePoint]) -> PolarsResult<DataFrame> {
    df!(
        "plot_id" => plots.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        "compartment_id" => plots.iter().map(|p| p.compartment_id.as_str()).collect::<Vec<_>>(),
        "easting" => plots.iter().map(SamplePoint::easting).collect::<Vec<_>>(),
        "northing" => plots.iter().map(SamplePoint::northing).collect::<Vec<_>>(),
    )
}

pub fn write_plots(path: &Path, plots: &[SamplePoint], format: TableFormat) -> Result<()> {
    ensure_parent(path)?;
    let mut df = plots_frame(plots)?;
    let mut file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match format {
        TableFormat::Csv => CsvWriter::new(&mut file).include_header(true).finish(&mut df)?,
        TableFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
    }
    tracing::info!(rows = df.height(), path = %path.display(), "plot table written");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}
