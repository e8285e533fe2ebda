use std::fs;

use bharat_osint::config::AppConfig;
use bharat_osint::core::engine::{Engine, RunOutcome};
use bharat_osint::core::types::AnalysisReport;
use bharat_osint::pipeline::reporter::write_exports;
use httpmock::prelude::*;
use serde_json::{json, Value};

const FIXED_TIME: &str = "2025-01-02T00:00:00Z";
const FIXED_MILLIS: &str = "1735776000000";

fn engine_for(server: &MockServer, dir: &tempfile::TempDir) -> Engine {
    std::env::set_var("OSINT_FIXED_TIME", FIXED_TIME);
    let mut cfg = AppConfig::default();
    cfg.recent_store_path = dir
        .path()
        .join("recent.json")
        .to_string_lossy()
        .into_owned();
    cfg.provider.base_url = server.base_url();
    cfg.provider.model = "export-model".into();
    cfg.provider.api_key_env = "BHARAT_OSINT_EXPORT_KEY_NEVER_SET".into();
    Engine::new(&cfg).unwrap()
}

fn mock_number(server: &MockServer, number: &str, operator: &str, summary: &str) {
    let report = json!({
        "phoneNumber": number,
        "country": "India",
        "operator": operator,
        "circle": "Karnataka",
        "riskLevel": "MEDIUM",
        "confidenceScore": 72,
        "isValid": true,
        "findings": [
            {"source": "Forum", "summary": summary, "timestamp": "2024-06-01", "severity": "Alert"}
        ],
        "metadata": {"connectionType": "Postpaid", "isDND": false, "potentialOwnerType": "Individual"}
    });
    let number = number.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/v1beta/models/export-model:generateContent")
            .body_contains(number.as_str());
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": report.to_string() }] } }]
        }));
    });
}

#[tokio::test]
async fn single_report_exports_to_disk() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    mock_number(&server, "+91 91234 56789", "Airtel", "Quoted \"handle\" seen");
    let engine = engine_for(&server, &dir);

    assert!(matches!(
        engine.run_single("919123456789").await,
        RunOutcome::Completed(_)
    ));

    let files = vec![
        engine.export_structured().unwrap().unwrap(),
        engine.export_tabular().unwrap(),
    ];
    let out = dir.path().join("exports");
    let paths = write_exports(&files, &out).unwrap();
    assert_eq!(paths[0], out.join(format!("OSINT_REPORT_{FIXED_MILLIS}.json")));
    assert_eq!(paths[1], out.join("DETAILED_LOG_919123456789.csv"));

    let json: AnalysisReport = serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(json.operator, "Airtel");

    let csv = fs::read_to_string(&paths[1]).unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines[0], "TARGET IDENTIFIER,+91 91234 56789");
    assert_eq!(lines[4], "CONFIDENCE SCORE,72%");
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "INTELLIGENCE FINDINGS MANIFEST");
    assert_eq!(
        lines[9],
        "\"Forum\",\"Quoted \"\"handle\"\" seen\",\"2024-06-01\",\"Alert\""
    );

    let log = engine.log_lines();
    assert!(log[0].contains("REPORT EXPORTED: CSV [DETAILED_LOG_919123456789.csv]"));
}

#[tokio::test]
async fn batch_exports_replace_single_report() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    mock_number(&server, "+91 90000 00001", "Jio", "a");
    mock_number(&server, "+91 90000 00002", "BSNL", "b");
    let engine = engine_for(&server, &dir);

    engine.run_single("9000000001").await;
    engine.run_batch("9000000001\n9000000002\nxyz").await;

    let json = engine.export_structured().unwrap().unwrap();
    assert_eq!(json.filename, format!("OSINT_REPORT_{FIXED_MILLIS}.json"));
    let parsed: Value = serde_json::from_slice(&json.bytes).unwrap();
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(2));
    assert_eq!(parsed[1]["operator"], "BSNL");

    let csv = engine.export_tabular().unwrap();
    assert_eq!(csv.filename, format!("BATCH_MANIFEST_{FIXED_MILLIS}.csv"));
    assert_eq!(
        csv.as_text(),
        "Identifier,Operator,Circle,Risk_Level,Confidence_Score\n\
         \"+91 90000 00001\",\"Jio\",\"Karnataka\",\"MEDIUM\",\"72%\"\n\
         \"+91 90000 00002\",\"BSNL\",\"Karnataka\",\"MEDIUM\",\"72%\""
    );
}

#[tokio::test]
async fn nothing_to_export_after_reset() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    mock_number(&server, "+91 90000 00001", "Jio", "a");
    let engine = engine_for(&server, &dir);

    engine.run_single("9000000001").await;
    assert!(engine.reset());
    assert!(engine.export_tabular().is_none());
    assert!(engine.export_structured().unwrap().is_none());
}

#[tokio::test]
async fn focused_batch_row_exports_its_findings() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    mock_number(&server, "+91 90000 00001", "Jio", "first row");
    mock_number(&server, "+91 90000 00002", "BSNL", "second \"row\"");
    let engine = engine_for(&server, &dir);

    engine.run_batch("9000000001,9000000002").await;
    assert!(engine.focus_result(1));

    let csv = engine.export_tabular().unwrap();
    assert_eq!(csv.filename, "DETAILED_LOG_919000000002.csv");
    let text = csv.as_text();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines[1], "OPERATOR,BSNL");
    assert_eq!(
        lines[9],
        "\"Forum\",\"second \"\"row\"\"\",\"2024-06-01\",\"Alert\""
    );

    let json = engine.export_structured().unwrap().unwrap();
    let single: AnalysisReport = serde_json::from_slice(&json.bytes).unwrap();
    assert_eq!(single.identifier, "+91 90000 00002");
    assert_eq!(single.findings[0].summary, "second \"row\"");
}
