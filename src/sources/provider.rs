use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::AppConfig,
    core::{
        error::OsintError,
        identifier::NormalizedIdentifier,
        types::{AnalysisReport, Finding, ReportMetadata, RiskLevel, Severity},
    },
    sources::ReportFetcher,
};

/// Generative-model backed report provider speaking the `generateContent` API.
pub struct ProviderClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ProviderClient {
    pub fn new(config: &AppConfig) -> Result<Self, OsintError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| OsintError::Config(e.to_string()))?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.provider.base_url.trim_end_matches('/'),
            config.provider.model
        );
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                "no provider key in ${}; requests will likely be refused",
                config.provider.api_key_env
            );
        }
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReportFetcher for ProviderClient {
    fn name(&self) -> &str {
        "generative-provider"
    }

    async fn fetch(&self, identifier: &NormalizedIdentifier) -> Result<AnalysisReport, OsintError> {
        let mut request = self.client.post(&self.endpoint).json(&request_body(identifier));
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OsintError::ProviderUnreachable(format!(
                "provider returned {status}"
            )));
        }

        let envelope: GenerateResponse = response.json().await?;
        let text = envelope.first_text().ok_or_else(|| {
            OsintError::MalformedProviderResponse("response carried no candidate text".into())
        })?;
        tracing::debug!("provider answered for {} ({} bytes)", identifier, text.len());
        parse_report(text)
    }
}

fn request_body(identifier: &NormalizedIdentifier) -> Value {
    let prompt = format!(
        "Perform a simulated OSINT analysis on the Indian phone number: {identifier}. \
         Provide telecom details (Operator, Circle), a risk assessment, and a list of \
         potential public data sources where such a number might be found (business \
         directories, leaked databases, social footprints). \
         This is for educational and ethical OSINT demonstration."
    );
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "phoneNumber": { "type": "STRING" },
            "country": { "type": "STRING" },
            "operator": { "type": "STRING" },
            "circle": { "type": "STRING" },
            "riskLevel": { "type": "STRING", "enum": ["LOW", "MEDIUM", "HIGH", "CRITICAL"] },
            "confidenceScore": { "type": "NUMBER" },
            "isValid": { "type": "BOOLEAN" },
            "findings": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "source": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "timestamp": { "type": "STRING" },
                        "severity": { "type": "STRING" }
                    }
                }
            },
            "metadata": {
                "type": "OBJECT",
                "properties": {
                    "connectionType": { "type": "STRING" },
                    "isDND": { "type": "BOOLEAN" },
                    "potentialOwnerType": { "type": "STRING" }
                }
            }
        },
        "required": ["phoneNumber", "operator", "circle", "riskLevel", "findings"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    phone_number: Option<String>,
    country: Option<String>,
    operator: Option<String>,
    circle: Option<String>,
    risk_level: Option<String>,
    confidence_score: Option<f64>,
    is_valid: Option<bool>,
    findings: Option<Vec<RawFinding>>,
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    source: Option<String>,
    summary: Option<String>,
    timestamp: Option<String>,
    severity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    connection_type: Option<String>,
    #[serde(rename = "isDND")]
    is_dnd: Option<bool>,
    potential_owner_type: Option<String>,
}

/// Coerces the provider's JSON text into a typed report.
pub fn parse_report(text: &str) -> Result<AnalysisReport, OsintError> {
    let raw: RawReport = serde_json::from_str(strip_code_fence(text))?;
    raw.into_report()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, OsintError> {
    value.ok_or_else(|| OsintError::MalformedProviderResponse(format!("missing {field}")))
}

impl RawReport {
    fn into_report(self) -> Result<AnalysisReport, OsintError> {
        let risk_text = required(self.risk_level, "riskLevel")?;
        let risk_level = RiskLevel::parse(&risk_text).ok_or_else(|| {
            OsintError::MalformedProviderResponse(format!("unknown riskLevel {risk_text:?}"))
        })?;
        let findings = required(self.findings, "findings")?
            .into_iter()
            .map(RawFinding::into_finding)
            .collect::<Result<Vec<_>, _>>()?;
        let metadata = self.metadata.unwrap_or_default();

        Ok(AnalysisReport {
            identifier: required(self.phone_number, "phoneNumber")?,
            country: self.country.unwrap_or_default(),
            operator: required(self.operator, "operator")?,
            circle: required(self.circle, "circle")?,
            risk_level,
            confidence_score: self.confidence_score.unwrap_or(0.0),
            is_valid: self.is_valid.unwrap_or(false),
            findings,
            metadata: ReportMetadata {
                connection_type: metadata.connection_type.unwrap_or_default(),
                is_dnd: metadata.is_dnd.unwrap_or(false),
                potential_owner_type: metadata.potential_owner_type.unwrap_or_default(),
            },
        })
    }
}

impl RawFinding {
    fn into_finding(self) -> Result<Finding, OsintError> {
        let severity_text = required(self.severity, "finding severity")?;
        let severity = Severity::parse(&severity_text).ok_or_else(|| {
            OsintError::MalformedProviderResponse(format!("unknown severity {severity_text:?}"))
        })?;
        Ok(Finding {
            source: self.source.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_default(),
            severity,
        })
    }
}
