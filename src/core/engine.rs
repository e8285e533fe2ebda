use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    config::AppConfig,
    core::{
        activity::ActivityLog,
        error::{OsintError, PROVIDER_UNREACHABLE_MESSAGE},
        identifier::{validate, NormalizedIdentifier, ValidationOutcome},
        recent::RecentStore,
        state::{OrchestrationState, Transition},
        time::now_utc,
        types::AnalysisReport,
    },
    pipeline::{
        collector::split_candidates,
        exporter::{to_structured_export, to_tabular_export, ExportFile, ExportSubject},
    },
    sources::{provider::ProviderClient, ReportFetcher},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Invalid { reason: String },
    FetchFailed { error: String },
    Completed,
}

/// One attempted candidate of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub position: usize,
    pub candidate: String,
    pub normalized: Option<NormalizedIdentifier>,
    pub outcome: ItemOutcome,
    /// Progress published right after this item.
    pub progress: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRun {
    pub items: Vec<BatchItem>,
    pub results: Vec<AnalysisReport>,
}

impl BatchRun {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Invalid { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::FetchFailed { .. }))
    }

    pub fn progress(&self) -> u8 {
        self.items.last().map(|i| i.progress).unwrap_or(0)
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Box<AnalysisReport>),
    Rejected {
        sanitized_attempt: String,
        reason: String,
    },
    Failed {
        message: String,
    },
    Batch(BatchRun),
    /// Nothing to do: blank input or no batch candidates.
    Skipped,
    /// Another run is in flight; nothing changed.
    Busy,
}

/// `round(100 * done / total)`, halves rounded up.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total);
    ((200 * done + total) / (2 * total)) as u8
}

/// Orchestrates validation, provider calls and result bookkeeping for one
/// console session. Only one run may be in flight at a time.
pub struct Engine {
    fetcher: Arc<dyn ReportFetcher>,
    state: Mutex<OrchestrationState>,
    recent: Mutex<RecentStore>,
    log: Mutex<ActivityLog>,
}

impl Engine {
    pub fn new(config: &AppConfig) -> Result<Self, OsintError> {
        let fetcher = ProviderClient::new(config)?;
        let recent = RecentStore::load(std::path::Path::new(&config.recent_store_path));
        Ok(Self::with_fetcher(Arc::new(fetcher), recent))
    }

    pub fn with_fetcher(fetcher: Arc<dyn ReportFetcher>, recent: RecentStore) -> Self {
        Self {
            fetcher,
            state: Mutex::new(OrchestrationState::default()),
            recent: Mutex::new(recent),
            log: Mutex::new(ActivityLog::new()),
        }
    }

    pub async fn run_single(&self, raw: &str) -> RunOutcome {
        if raw.trim().is_empty() {
            return RunOutcome::Skipped;
        }
        if self.state().in_flight() {
            return RunOutcome::Busy;
        }

        let normalized = match validate(raw) {
            ValidationOutcome::Valid { normalized } => normalized,
            ValidationOutcome::Invalid {
                sanitized_attempt,
                reason,
            } => {
                if !self.begin(Transition::Rejected {
                    reason: reason.clone(),
                }) {
                    return RunOutcome::Busy;
                }
                self.log("ERROR: validation failed.");
                return RunOutcome::Rejected {
                    sanitized_attempt,
                    reason,
                };
            }
        };

        if !self.begin(Transition::SingleStarted) {
            return RunOutcome::Busy;
        }
        self.log(format!("INITIATING TARGET SCAN: {normalized}"));

        match self.fetcher.fetch(&normalized).await {
            Ok(report) => {
                self.apply(Transition::SingleCompleted(Box::new(report.clone())));
                self.log("SCAN COMPLETE. REPORT AVAILABLE.");
                self.remember(&normalized);
                RunOutcome::Completed(Box::new(report))
            }
            Err(err) => {
                self.report_fetch_error(&normalized, &err);
                let message = PROVIDER_UNREACHABLE_MESSAGE.to_string();
                self.apply(Transition::SingleFailed {
                    message: message.clone(),
                });
                self.log("SCAN ABORTED: PROVIDER UNREACHABLE.");
                RunOutcome::Failed { message }
            }
        }
    }

    /// Processes every candidate in input order; invalid or failed items are
    /// dropped from the results and never abort the run.
    pub async fn run_batch(&self, raw: &str) -> RunOutcome {
        let candidates = split_candidates(raw);
        if candidates.is_empty() {
            return RunOutcome::Skipped;
        }
        if !self.begin(Transition::BatchStarted) {
            return RunOutcome::Busy;
        }

        let total = candidates.len();
        self.log(format!("INITIATING BATCH EXTRACTION: {total} TARGETS"));

        let mut run = BatchRun::default();
        for (idx, candidate) in candidates.into_iter().enumerate() {
            let step = format!("[{}/{}]", idx + 1, total);
            let (normalized, outcome) = match validate(&candidate) {
                ValidationOutcome::Invalid { reason, .. } => {
                    self.log(format!("SKIPPING INVALID {step}: {candidate}"));
                    (None, ItemOutcome::Invalid { reason })
                }
                ValidationOutcome::Valid { normalized } => {
                    self.log(format!("SCANNING {step}: {normalized}"));
                    match self.fetcher.fetch(&normalized).await {
                        Ok(report) => {
                            run.results.push(report);
                            self.remember(&normalized);
                            (Some(normalized), ItemOutcome::Completed)
                        }
                        Err(err) => {
                            self.report_fetch_error(&normalized, &err);
                            self.log(format!("FAILED {step}: {candidate}"));
                            (
                                Some(normalized),
                                ItemOutcome::FetchFailed {
                                    error: err.to_string(),
                                },
                            )
                        }
                    }
                }
            };

            let progress = progress_percent(idx + 1, total);
            self.apply(Transition::Progress(progress));
            run.items.push(BatchItem {
                position: idx,
                candidate,
                normalized,
                outcome,
                progress,
            });
        }

        self.apply(Transition::BatchCompleted(run.results.clone()));
        self.log(format!(
            "BATCH EXTRACTION COMPLETE: {}/{} REPORTS.",
            run.results.len(),
            total
        ));
        RunOutcome::Batch(run)
    }

    /// Re-runs single mode for the `index`-th recently used identifier.
    pub async fn select_recent(&self, index: usize) -> RunOutcome {
        let selected = self.recent_store().get(index).cloned();
        match selected {
            Some(id) => self.run_single(id.as_str()).await,
            None => RunOutcome::Skipped,
        }
    }

    /// Switches the view from the batch results to the `index`-th report.
    pub fn focus_result(&self, index: usize) -> bool {
        let target = {
            let mut state = self.state();
            if state.in_flight() {
                return false;
            }
            let Some(target) = state.batch().and_then(|b| b.get(index)) else {
                return false;
            };
            let target = target.identifier.clone();
            state.apply(Transition::FocusBatchItem(index));
            target
        };
        self.log(format!("SWITCHED VIEW TO TARGET: {target}"));
        true
    }

    /// Clears results, error and progress. Ignored while a run is in flight.
    pub fn reset(&self) -> bool {
        if !self.begin(Transition::Reset) {
            return false;
        }
        self.log("CONSOLE RESET.");
        true
    }

    pub fn clear_recent(&self) -> Result<(), OsintError> {
        self.recent_store().clear()?;
        self.log("RECENT SEARCH CACHE WIPED.");
        Ok(())
    }

    pub fn next_page(&self) {
        self.state().next_page();
    }

    pub fn prev_page(&self) {
        self.state().prev_page();
    }

    pub fn snapshot(&self) -> OrchestrationState {
        self.state().clone()
    }

    pub fn recent(&self) -> Vec<NormalizedIdentifier> {
        self.recent_store().entries().to_vec()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.activity().lines()
    }

    pub fn fetcher_name(&self) -> String {
        self.fetcher.name().to_string()
    }

    pub fn export_structured(&self) -> Result<Option<ExportFile>, OsintError> {
        let state = self.snapshot();
        let Some(subject) = ExportSubject::from_state(&state) else {
            return Ok(None);
        };
        let file = to_structured_export(subject, now_utc())?;
        self.log(format!("REPORT EXPORTED: JSON [{}].", file.filename));
        Ok(Some(file))
    }

    pub fn export_tabular(&self) -> Option<ExportFile> {
        let state = self.snapshot();
        let subject = ExportSubject::from_state(&state)?;
        let file = to_tabular_export(subject, now_utc());
        self.log(format!("REPORT EXPORTED: CSV [{}].", file.filename));
        Some(file)
    }

    /// Applies `transition` only when no run is in flight.
    fn begin(&self, transition: Transition) -> bool {
        let mut state = self.state();
        if state.in_flight() {
            return false;
        }
        state.apply(transition);
        true
    }

    fn apply(&self, transition: Transition) {
        self.state().apply(transition);
    }

    fn remember(&self, id: &NormalizedIdentifier) {
        if let Err(err) = self.recent_store().record(id) {
            tracing::warn!("could not persist recent search {}: {}", id, err);
        }
    }

    fn report_fetch_error(&self, id: &NormalizedIdentifier, err: &OsintError) {
        if err.is_provider_failure() {
            tracing::warn!("{} failed for {}: {}", self.fetcher.name(), id, err);
        } else {
            tracing::error!("{} raised unexpected error for {}: {}", self.fetcher.name(), id, err);
        }
    }

    fn log(&self, msg: impl Into<String>) {
        self.activity().push(msg);
    }

    fn state(&self) -> MutexGuard<'_, OrchestrationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recent_store(&self) -> MutexGuard<'_, RecentStore> {
        self.recent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn activity(&self) -> MutexGuard<'_, ActivityLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
