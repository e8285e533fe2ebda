use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::cli::config::{read_batch_input, resolve_config, RunConfig};
use crate::cli::flags::{Cli, Command, ExportFormatArg};
use crate::core::engine::{Engine, ItemOutcome, RunOutcome};
use crate::core::error::OsintError;
use crate::pipeline::exporter::ExportFile;
use crate::pipeline::reporter::write_exports;
use crate::ui::{app::App, terminal::run_console};

pub async fn run(cli: Cli) -> Result<()> {
    let cfg = resolve_config(&cli)?;
    let engine = Arc::new(Engine::new(&cfg.app)?);
    tracing::debug!("report source: {}", engine.fetcher_name());

    match cli.command {
        Command::Scan { target, .. } => run_scan(&engine, &cfg, &target).await,
        Command::Batch { input, file, .. } => {
            let raw = read_batch_input(input.as_deref(), file.as_deref())?;
            run_batch(&engine, &cfg, &raw).await
        }
        Command::Recent { clear, rescan, .. } => run_recent(&engine, &cfg, clear, rescan).await,
        Command::Console { .. } => {
            let app = App::new(cfg.export_dir.clone());
            run_console(engine, app).await?;
            Ok(())
        }
    }
}

async fn run_scan(engine: &Engine, cfg: &RunConfig, target: &str) -> Result<()> {
    match engine.run_single(target).await {
        RunOutcome::Completed(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            export(engine, cfg)
        }
        RunOutcome::Rejected {
            sanitized_attempt,
            reason,
        } => Err(OsintError::Validation(format!("{reason} (got \"{sanitized_attempt}\")")).into()),
        RunOutcome::Failed { message } => Err(anyhow!(message)),
        RunOutcome::Skipped => Err(anyhow!("no target given")),
        other => Err(anyhow!("unexpected scan outcome: {other:?}")),
    }
}

async fn run_batch(engine: &Engine, cfg: &RunConfig, raw: &str) -> Result<()> {
    let run = match engine.run_batch(raw).await {
        RunOutcome::Batch(run) => run,
        RunOutcome::Skipped => {
            tracing::warn!("batch list contained no candidates; nothing to do");
            return Ok(());
        }
        other => return Err(anyhow!("unexpected batch outcome: {other:?}")),
    };

    for item in &run.items {
        match &item.outcome {
            ItemOutcome::Invalid { reason } => {
                tracing::warn!("[{}] skipped {:?}: {}", item.position + 1, item.candidate, reason)
            }
            ItemOutcome::FetchFailed { error } => {
                tracing::warn!("[{}] failed {}: {}", item.position + 1, item.candidate, error)
            }
            ItemOutcome::Completed => {}
        }
    }
    tracing::info!(
        "batch finished: {} reports, {} invalid, {} failed of {}",
        run.results.len(),
        run.invalid_count(),
        run.failed_count(),
        run.total()
    );

    println!("{}", serde_json::to_string_pretty(&run.results)?);
    export(engine, cfg)
}

async fn run_recent(
    engine: &Engine,
    cfg: &RunConfig,
    clear: bool,
    rescan: Option<u16>,
) -> Result<()> {
    if clear {
        engine.clear_recent()?;
        println!("recent searches cleared");
        return Ok(());
    }

    if let Some(n) = rescan {
        let index = usize::from(n) - 1;
        return match engine.select_recent(index).await {
            RunOutcome::Completed(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                export(engine, cfg)
            }
            RunOutcome::Skipped => Err(anyhow!("no recent entry #{n}")),
            RunOutcome::Failed { message } => Err(anyhow!(message)),
            other => Err(anyhow!("unexpected rescan outcome: {other:?}")),
        };
    }

    let recent = engine.recent();
    if recent.is_empty() {
        println!("no recent searches");
    }
    for (i, id) in recent.iter().enumerate() {
        println!("{:>2}. {}", i + 1, id);
    }
    Ok(())
}

fn export(engine: &Engine, cfg: &RunConfig) -> Result<()> {
    let mut files: Vec<ExportFile> = Vec::new();
    for format in &cfg.formats {
        let file = match format {
            ExportFormatArg::Json => engine.export_structured()?,
            ExportFormatArg::Csv => engine.export_tabular(),
        };
        match file {
            Some(file) => files.push(file),
            None => tracing::warn!("no results to export as {:?}", format),
        }
    }
    let written: Vec<PathBuf> = write_exports(&files, &cfg.export_dir)?;
    for path in written {
        eprintln!("exported {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::core::error::PROVIDER_UNREACHABLE_MESSAGE;
    use crate::core::identifier::{NormalizedIdentifier, INVALID_IDENTIFIER_REASON};
    use crate::core::recent::RecentStore;
    use crate::core::types::AnalysisReport;
    use crate::sources::ReportFetcher;

    struct DownFetcher;

    #[async_trait]
    impl ReportFetcher for DownFetcher {
        fn name(&self) -> &str {
            "down"
        }

        async fn fetch(&self, _: &NormalizedIdentifier) -> Result<AnalysisReport, OsintError> {
            Err(OsintError::ProviderUnreachable("connection refused".into()))
        }
    }

    fn setup(dir: &tempfile::TempDir) -> (Engine, RunConfig) {
        let engine = Engine::with_fetcher(Arc::new(DownFetcher), RecentStore::in_memory());
        let cfg = RunConfig {
            app: AppConfig::default(),
            export_dir: dir.path().to_path_buf(),
            formats: vec![ExportFormatArg::Json],
        };
        (engine, cfg)
    }

    #[tokio::test]
    async fn rejected_scan_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, cfg) = setup(&dir);
        let err = run_scan(&engine, &cfg, "12345").await.unwrap_err();
        match err.downcast_ref::<OsintError>() {
            Some(OsintError::Validation(msg)) => {
                assert!(msg.starts_with(INVALID_IDENTIFIER_REASON));
                assert!(msg.ends_with("(got \"12345\")"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_scan_reports_generic_message_and_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, cfg) = setup(&dir);
        let err = run_scan(&engine, &cfg, "9123456789").await.unwrap_err();
        assert_eq!(err.to_string(), PROVIDER_UNREACHABLE_MESSAGE);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
