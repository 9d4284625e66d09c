//! Drift report rendering and audit artifacts.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{DriftReport, FeatureDrift, Severity};
use crate::Result;

/// Persisted form of a report: the verdict plus its generation time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftAudit {
    pub generated_at: DateTime<Utc>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub report: DriftReport,
}

impl DriftAudit {
    pub fn new(report: DriftReport) -> Self {
        Self { generated_at: Utc::now(), threshold: report.test.threshold(), report }
    }
}

/// Paths of the files written by [`write_report`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Write `drift_report_<stamp>.json` and `.html` into `dir`
pub fn write_report(report: &DriftReport, dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(dir)?;
    let audit = DriftAudit::new(report.clone());
    let stamp = audit.generated_at.format("%Y%m%d_%H%M%S_%3f");

    let paths = ReportPaths {
        json: dir.join(format!("drift_report_{stamp}.json")),
        html: dir.join(format!("drift_report_{stamp}.html")),
    };
    fs::write(&paths.json, serde_json::to_vec_pretty(&audit)?)?;
    fs::write(&paths.html, render_html(&audit))?;

    info!(json = %paths.json.display(), html = %paths.html.display(), "drift report written");
    Ok(paths)
}

/// Plain-text summary for terminal output
pub fn render_text(report: &DriftReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Drift test: {} (reference {} rows, window {} rows)",
        report.test.name(),
        report.reference_rows,
        report.window_rows
    );
    let _ = writeln!(
        out,
        "Drifted features: {}/{} ({:.1}%)",
        report.drifted_feature_count,
        report.total_features(),
        report.drift_percentage()
    );
    for result in report.per_feature.values() {
        let _ = writeln!(out, "  {}", feature_line(result));
    }
    if let Some(prediction) = &report.prediction_drift {
        let _ = writeln!(out, "Prediction drift (informational): {}", feature_line(prediction));
    }
    let verdict = if report.overall_drift { "DRIFT DETECTED" } else { "no drift" };
    let _ = write!(out, "Overall: {verdict}");
    out
}

fn feature_line(result: &FeatureDrift) -> String {
    let marker = match result.severity {
        Severity::Critical => "DRIFT",
        Severity::Warning => "warn",
        Severity::None => "ok",
    };
    format!(
        "{:<16} statistic={:.4} p_value={:.4} [{marker}]",
        result.feature, result.statistic, result.p_value
    )
}

/// Standalone HTML summary of an audit record
pub fn render_html(audit: &DriftAudit) -> String {
    let report = &audit.report;
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Drift report</title>\n");
    html.push_str("<style>\n");
    html.push_str("body { font-family: system-ui, sans-serif; max-width: 900px; margin: 0 auto; padding: 2rem; }\n");
    html.push_str("table { border-collapse: collapse; width: 100%; }\n");
    html.push_str("td, th { border: 1px solid #ddd; padding: 0.4rem; text-align: left; }\n");
    html.push_str(".critical { background: #fdd; }\n.warning { background: #ffd; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(html, "<h1>Drift report</h1>");
    let _ = writeln!(
        html,
        "<p>Generated {} using {}; reference {} rows, window {} rows.</p>",
        escape_html(&audit.generated_at.to_rfc3339()),
        escape_html(report.test.name()),
        report.reference_rows,
        report.window_rows
    );
    let _ = writeln!(
        html,
        "<p><strong>{}</strong>: {} of {} features drifted.</p>",
        if report.overall_drift { "Drift detected" } else { "No drift" },
        report.drifted_feature_count,
        report.total_features()
    );

    html.push_str("<table>\n<tr><th>Feature</th><th>Statistic</th><th>P-value</th><th>Drifted</th></tr>\n");
    for result in report.per_feature.values().chain(report.prediction_drift.iter()) {
        let class = match result.severity {
            Severity::Critical => " class=\"critical\"",
            Severity::Warning => " class=\"warning\"",
            Severity::None => "",
        };
        let _ = writeln!(
            html,
            "<tr{class}><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td></tr>",
            escape_html(&result.feature),
            result.statistic,
            result.p_value,
            if result.drifted { "yes" } else { "no" }
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::drift::DriftTest;
    use tempfile::TempDir;

    fn report() -> DriftReport {
        DriftReport::from_results(
            vec![FeatureDrift {
                feature: "<age>".to_string(),
                test: DriftTest::default(),
                statistic: 0.6,
                p_value: 0.001,
                drifted: true,
                severity: Severity::Critical,
            }],
            DriftTest::default(),
            100,
            40,
            None,
        )
    }

    #[test]
    fn test_write_report_creates_both_files() {
        let dir = TempDir::new().unwrap();
        let paths = write_report(&report(), dir.path()).unwrap();
        assert!(paths.json.exists());
        assert!(paths.html.exists());

        let audit: DriftAudit =
            serde_json::from_slice(&std::fs::read(&paths.json).unwrap()).unwrap();
        assert_eq!(audit.report, report());
        assert_eq!(audit.threshold, Some(0.05));
    }

    #[test]
    fn test_html_escapes_feature_names() {
        let html = render_html(&DriftAudit::new(report()));
        assert!(html.contains("&lt;age&gt;"));
        assert!(!html.contains("<age>"));
        assert!(html.contains("class=\"critical\""));
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&report());
        assert!(text.contains("Drifted features: 1/1"));
        assert!(text.ends_with("DRIFT DETECTED"));
    }
}
