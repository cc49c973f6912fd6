//! Report formatting.

use std::fmt;

use anyhow::Result;
use featclust::SweepPoint;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Assigned {
    pub id: String,
    pub label: usize,
}

/// Result of a single fit.
#[derive(Debug, Serialize)]
pub struct ClusterReport {
    pub k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silhouette: Option<f64>,
    pub items: Vec<Assigned>,
}

/// Result of a cluster-count sweep.
#[derive(Debug, Serialize)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
    pub best: Option<SweepPoint>,
}

impl fmt::Display for ClusterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}\t{}", item.id, item.label)?;
        }
        write!(f, "# k={}", self.k)?;
        if let Some(s) = self.silhouette {
            write!(f, " silhouette={s:.4}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "k\tsilhouette")?;
        for p in &self.points {
            writeln!(f, "{}\t{:.4}", p.k, p.score)?;
        }
        match self.best {
            Some(b) => write!(f, "# best k={} silhouette={:.4}", b.k, b.score),
            None => write!(f, "# no candidates"),
        }
    }
}

/// Prints `value` as pretty JSON or as its text form.
pub fn print<T: Serialize + fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_report_text() {
        let r = ClusterReport {
            k: 2,
            silhouette: Some(0.5),
            items: vec![
                Assigned { id: "a".into(), label: 0 },
                Assigned { id: "b".into(), label: 1 },
            ],
        };
        assert_eq!(r.to_string(), "a\t0\nb\t1\n# k=2 silhouette=0.5000");
    }

    #[test]
    fn sweep_report_json() {
        let p = SweepPoint { k: 3, score: 0.25 };
        let r = SweepReport {
            points: vec![p],
            best: Some(p),
        };
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(v["best"]["k"], 3);
        assert_eq!(v["points"][0]["score"], 0.25);
        assert!(r.to_string().ends_with("# best k=3 silhouette=0.2500"));
    }
}
