//! Structured (JSON) and tabular (CSV) exports of the current results.
//!
//! Batch rows wrap every value in quotes without escaping embedded quotes;
//! finding rows in the single-report export double them. A batch value that
//! contains `"` yields a malformed row.

use chrono::{DateTime, Utc};

use crate::core::{
    error::OsintError,
    state::OrchestrationState,
    time::epoch_millis,
    types::{AnalysisReport, Finding},
};

pub const BATCH_HEADERS: [&str; 5] = [
    "Identifier",
    "Operator",
    "Circle",
    "Risk_Level",
    "Confidence_Score",
];
pub const FINDING_HEADERS: [&str; 4] = ["Source", "Summary", "Timestamp", "Severity"];
pub const FINDINGS_SECTION: &str = "INTELLIGENCE FINDINGS MANIFEST";

#[derive(Debug, Clone, Copy)]
pub enum ExportSubject<'a> {
    Single(&'a AnalysisReport),
    Batch(&'a [AnalysisReport]),
}

impl<'a> ExportSubject<'a> {
    /// Batch results win when non-empty; otherwise the single report, if any.
    pub fn from_state(state: &'a OrchestrationState) -> Option<Self> {
        match (state.batch(), state.report()) {
            (Some(batch), _) if !batch.is_empty() => Some(ExportSubject::Batch(batch)),
            (_, Some(report)) => Some(ExportSubject::Single(report)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub fn to_structured_export(
    subject: ExportSubject<'_>,
    now: DateTime<Utc>,
) -> Result<ExportFile, OsintError> {
    let json = match subject {
        ExportSubject::Single(report) => serde_json::to_string_pretty(report),
        ExportSubject::Batch(reports) => serde_json::to_string_pretty(reports),
    }
    .map_err(|e| OsintError::Export(e.to_string()))?;

    Ok(ExportFile {
        filename: format!("OSINT_REPORT_{}.json", epoch_millis(now)),
        content_type: "application/json",
        bytes: json.into_bytes(),
    })
}

pub fn to_tabular_export(subject: ExportSubject<'_>, now: DateTime<Utc>) -> ExportFile {
    let (filename, rows) = match subject {
        ExportSubject::Batch(reports) => (
            format!("BATCH_MANIFEST_{}.csv", epoch_millis(now)),
            batch_rows(reports),
        ),
        ExportSubject::Single(report) => (
            format!("DETAILED_LOG_{}.csv", digits_of(&report.identifier)),
            single_rows(report),
        ),
    };

    ExportFile {
        filename,
        content_type: "text/csv;charset=utf-8",
        bytes: rows.join("\n").into_bytes(),
    }
}

fn batch_rows(reports: &[AnalysisReport]) -> Vec<String> {
    let mut rows = Vec::with_capacity(reports.len() + 1);
    rows.push(BATCH_HEADERS.join(","));
    for report in reports {
        let fields = [
            quote(&report.identifier),
            quote(&report.operator),
            quote(&report.circle),
            quote(report.risk_level.as_str()),
            quote(&format!("{}%", report.confidence_score)),
        ];
        rows.push(fields.join(","));
    }
    rows
}

fn single_rows(report: &AnalysisReport) -> Vec<String> {
    let metadata = [
        ["TARGET IDENTIFIER", report.identifier.as_str()].join(","),
        ["OPERATOR", report.operator.as_str()].join(","),
        ["CIRCLE", report.circle.as_str()].join(","),
        ["RISK ASSESSMENT", report.risk_level.as_str()].join(","),
        format!("CONFIDENCE SCORE,{}%", report.confidence_score),
        ["CONNECTION TYPE", report.metadata.connection_type.as_str()].join(","),
    ];

    let mut rows: Vec<String> = metadata.into_iter().collect();
    rows.push(String::new());
    rows.push(FINDINGS_SECTION.to_string());
    rows.push(FINDING_HEADERS.join(","));
    rows.extend(report.findings.iter().map(finding_row));
    rows
}

fn finding_row(finding: &Finding) -> String {
    [
        quote_escaped(&finding.source),
        quote_escaped(&finding.summary),
        quote_escaped(&finding.timestamp),
        quote(finding.severity.as_str()),
    ]
    .join(",")
}

fn quote(value: &str) -> String {
    format!("\"{value}\"")
}

fn quote_escaped(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn digits_of(identifier: &str) -> String {
    identifier.chars().filter(|c| c.is_ascii_digit()).collect()
}
