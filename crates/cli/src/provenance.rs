use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to every artifact a run writes.
pub struct Payload {
    pub params: Value,
    /// Free-form run label from `--tag`.
    pub tag: Option<String>,
    /// Sibling artifacts produced by the same run.
    pub siblings: Vec<PathBuf>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            tag: None,
            siblings: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_siblings(mut self, siblings: &[PathBuf]) -> Self {
        self.siblings = siblings.to_vec();
        self
    }
}

/// Write `<artifact>.provenance.json` with the git commit, callsite, library version, params and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let outputs: Vec<String> = std::iter::once(artifact)
        .chain(payload.siblings.iter().map(PathBuf::as_path))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let doc = json!({
        "code_rev": current_git_rev(),
        "forestplan_version": forestplan::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "tag": payload.tag,
        "params": payload.params,
        "outputs": outputs
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    tracing::debug!(path = %provenance_path.display(), "provenance sidecar written");
    Ok(provenance_path)
}

/// `plots.csv` → `plots.provenance.json`.
fn provenance_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// Commit of the running build: `GIT_COMMIT` at compile time, then at run
/// time, then `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    let pinned = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    if let Some(rev) = pinned {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forestplan::partition::partition_with_defaults;
    use forestplan::sampling::{generate_samples_with, PlacementMethod, SamplingCfg};
    use forestplan::{LineString, Polygon};
    use std::fs;
    use tempfile::tempdir;

    fn read(path: &Path) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn sidecar_sits_next_to_each_output() {
        assert_eq!(
            provenance_path(Path::new("/runs/stand-12/plots.csv")),
            Path::new("/runs/stand-12/plots.provenance.json")
        );
        assert_eq!(
            provenance_path(Path::new("out/compartments.json")),
            Path::new("out/compartments.provenance.json")
        );
    }

    #[test]
    fn sampling_run_is_traceable_from_its_sidecar() {
        let dir = tempdir().unwrap();
        let boundary = Polygon::new(
            LineString::from(vec![[0.0, 0.0], [300.0, 0.0], [300.0, 200.0], [0.0, 200.0], [0.0, 0.0]]),
            Vec::new(),
        );
        let compartments = partition_with_defaults(&boundary, 3).unwrap().compartments;
        let cfg = SamplingCfg {
            method: PlacementMethod::Random,
            ..SamplingCfg::default()
        };
        let run = generate_samples_with(&compartments, &cfg).unwrap();

        let plots = dir.path().join("plots.csv");
        let summary = dir.path().join("summary.json");
        fs::write(&plots, "plot_id,compartment_id,easting,northing\n").unwrap();
        let params = json!({
            "count": compartments.len(),
            "intensity": cfg.intensity,
            "min_plots": cfg.min_per_compartment,
            "method": format!("{:?}", cfg.method),
            "plots": run.plots.len(),
        });
        let payload = Payload::new(params)
            .with_tag(Some("stand-12".into()))
            .with_siblings(&[summary.clone()]);
        let sidecar = write_sidecar(&plots, payload).unwrap();

        let doc = read(&sidecar);
        assert_eq!(doc["tag"], "stand-12");
        assert_eq!(doc["forestplan_version"], forestplan::VERSION);
        assert_eq!(doc["params"]["count"], 3);
        assert_eq!(doc["params"]["method"], "Random");
        assert_eq!(doc["params"]["plots"], 15);
        assert_eq!(doc["outputs"][0], plots.to_string_lossy().as_ref());
        assert_eq!(doc["outputs"][1], summary.to_string_lossy().as_ref());
        assert!(doc["callsite"]["file"].as_str().unwrap().ends_with("provenance.rs"));
    }

    #[test]
    fn untagged_run_records_null_tag() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested/compartments.json");
        let sidecar = write_sidecar(&artifact, Payload::new(json!({}))).unwrap();
        assert!(sidecar.ends_with("nested/compartments.provenance.json"));
        let doc = read(&sidecar);
        assert!(doc["tag"].is_null());
        assert_eq!(doc["outputs"].as_array().unwrap().len(), 1);
        assert!(!doc["code_rev"].as_str().unwrap().is_empty());
    }
}
