//! featclust - cluster records and pick a cluster count.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use featclust::{
    Agglomerative, ClusterConfig, Clusterer, FeatureVector, FieldRole, KRange, Record, Schema,
    best_k, load_records, silhouette, sweep,
};

use output::{Assigned, ClusterReport, SweepReport};

/// Agglomerative clustering of line-oriented records.
///
/// Every record spans one row per schema field (default: the ten-row movie
/// layout). Feature fields drive clustering; label fields can be used to
/// score the result with the silhouette coefficient.
#[derive(Parser, Debug)]
#[command(name = "featclust")]
#[command(about = "Cluster records and score cluster counts")]
#[command(version)]
struct Args {
    /// Record file
    data: PathBuf,

    /// Config file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target cluster count (overrides config)
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Set-distance steepness (overrides config)
    #[arg(long)]
    coeff: Option<f64>,

    /// Sweep cluster counts, e.g. 2..10 (overrides config)
    #[arg(long, value_parser = parse_range)]
    sweep: Option<KRange>,

    /// Field to evaluate against (default: first label field)
    #[arg(long)]
    eval: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn parse_range(s: &str) -> Result<KRange, String> {
    let (min, max) = s
        .split_once("..")
        .ok_or_else(|| format!("expected MIN..MAX, got {s:?}"))?;
    let min = min.trim().parse().map_err(|e| format!("bad min: {e}"))?;
    let max = max.trim().parse().map_err(|e| format!("bad max: {e}"))?;
    Ok(KRange::new(min, max))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let mut cfg = match &args.config {
        Some(path) => ClusterConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ClusterConfig::default(),
    };
    if let Some(k) = args.clusters {
        cfg.n_clusters = k;
    }
    if let Some(coeff) = args.coeff {
        cfg.coeff = coeff;
    }
    if args.sweep.is_some() {
        cfg.sweep = args.sweep;
    }
    cfg.validate()?;

    let schema = cfg.schema();
    let records = load_records(&args.data, &schema)
        .with_context(|| format!("read records from {}", args.data.display()))?;
    if records.is_empty() {
        bail!("no complete records in {}", args.data.display());
    }
    tracing::info!(records = records.len(), "loaded records");

    let features: Vec<FeatureVector> = records.iter().map(|r| schema.features(r)).collect();
    let metric = cfg.distance()?;
    let engine = Agglomerative::new(metric);
    let eval_items = eval_items(&schema, &records, args.eval.as_deref())?;

    if let Some(range) = cfg.sweep {
        let Some(eval_items) = eval_items else {
            bail!("sweep needs a field to evaluate against (--eval or a label field in the schema)");
        };
        let points = sweep(&features, &engine, range, &eval_items, &metric)?;
        let report = SweepReport {
            best: best_k(&points),
            points,
        };
        return output::print(&report, args.json);
    }

    let assignment = engine.fit(&features, cfg.n_clusters)?;
    let score = match &eval_items {
        Some(items) if assignment.k() >= 2 => Some(silhouette(items, assignment.labels(), &metric)?),
        _ => None,
    };
    let report = ClusterReport {
        k: assignment.k(),
        silhouette: score,
        items: records
            .iter()
            .zip(assignment.labels())
            .enumerate()
            .map(|(i, (r, &label))| Assigned {
                id: r.id().map(str::to_string).unwrap_or_else(|| i.to_string()),
                label,
            })
            .collect(),
    };
    output::print(&report, args.json)
}

/// Projects the evaluation field out of every record.
fn eval_items(
    schema: &Schema,
    records: &[Record],
    name: Option<&str>,
) -> Result<Option<Vec<FeatureVector>>> {
    let name = match name {
        Some(n) => n,
        None => match schema.specs().iter().find(|s| s.role == FieldRole::Label) {
            Some(spec) => spec.name.as_str(),
            None => return Ok(None),
        },
    };
    let items = records
        .iter()
        .map(|r| schema.project(r, &[name]))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("project eval field {name:?}"))?;
    Ok(Some(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("2..10").unwrap(), KRange::new(2, 10));
        assert_eq!(parse_range(" 3 .. 4 ").unwrap(), KRange::new(3, 4));
        assert!(parse_range("2-10").is_err());
        assert!(parse_range("a..3").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from(["featclust", "-k", "4", "--sweep", "2..6", "data.csv"])
            .unwrap();
        assert_eq!(args.clusters, Some(4));
        assert_eq!(args.sweep, Some(KRange::new(2, 6)));
        assert_eq!(args.data, PathBuf::from("data.csv"));
    }
}
