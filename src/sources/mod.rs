use async_trait::async_trait;

use crate::core::{error::OsintError, identifier::NormalizedIdentifier, types::AnalysisReport};

pub mod provider;

/// Remote analysis provider. Any failure is opaque to the engine.
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, identifier: &NormalizedIdentifier) -> Result<AnalysisReport, OsintError>;
}
