use crate::core::types::AnalysisReport;

pub const ITEMS_PER_PAGE: usize = 5;

/// A single mutation of [`OrchestrationState`]. The engine only changes
/// state by applying one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Single-mode input failed validation; prior results stay on screen.
    Rejected { reason: String },
    SingleStarted,
    BatchStarted,
    Progress(u8),
    SingleCompleted(Box<AnalysisReport>),
    SingleFailed { message: String },
    BatchCompleted(Vec<AnalysisReport>),
    /// Promotes one batch row to the single report and drops the batch.
    /// Ignored while in flight or when the index is out of range.
    FocusBatchItem(usize),
    Reset,
}

/// Session-scoped console state. At most one of the single report and the
/// batch results is populated at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestrationState {
    in_flight: bool,
    report: Option<AnalysisReport>,
    batch: Option<Vec<AnalysisReport>>,
    error: Option<String>,
    progress: u8,
    page: usize,
}

impl OrchestrationState {
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Rejected { reason } => {
                self.error = Some(reason);
            }
            Transition::SingleStarted => {
                self.in_flight = true;
                self.clear_results();
            }
            Transition::BatchStarted => {
                self.in_flight = true;
                self.clear_results();
                self.progress = 0;
            }
            Transition::Progress(percent) => {
                self.progress = self.progress.max(percent.min(100));
            }
            Transition::SingleCompleted(report) => {
                self.in_flight = false;
                self.batch = None;
                self.report = Some(*report);
            }
            Transition::SingleFailed { message } => {
                self.in_flight = false;
                self.error = Some(message);
            }
            Transition::BatchCompleted(results) => {
                self.in_flight = false;
                self.report = None;
                self.batch = Some(results);
                self.page = 0;
            }
            Transition::FocusBatchItem(index) => {
                if self.in_flight {
                    return;
                }
                let Some(report) = self.batch.as_ref().and_then(|b| b.get(index)).cloned() else {
                    return;
                };
                self.report = Some(report);
                self.batch = None;
                self.page = 0;
            }
            Transition::Reset => {
                *self = Self::default();
            }
        }
    }

    fn clear_results(&mut self) {
        self.report = None;
        self.batch = None;
        self.error = None;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn batch(&self) -> Option<&[AnalysisReport]> {
        self.batch.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.batch
            .as_ref()
            .map(|b| b.len().div_ceil(ITEMS_PER_PAGE))
            .unwrap_or(0)
    }

    pub fn current_page(&self) -> &[AnalysisReport] {
        let Some(batch) = self.batch.as_deref() else {
            return &[];
        };
        let start = (self.page * ITEMS_PER_PAGE).min(batch.len());
        let end = (start + ITEMS_PER_PAGE).min(batch.len());
        &batch[start..end]
    }

    /// Batch index of the `row`-th entry on the current page.
    pub fn page_row_index(&self, row: usize) -> Option<usize> {
        let index = self.page * ITEMS_PER_PAGE + row;
        (row < ITEMS_PER_PAGE && index < self.batch.as_ref()?.len()).then_some(index)
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ReportMetadata, RiskLevel};

    fn report(id: &str) -> AnalysisReport {
        AnalysisReport {
            identifier: id.into(),
            country: "India".into(),
            operator: "Op".into(),
            circle: "Circle".into(),
            risk_level: RiskLevel::Low,
            confidence_score: 50.0,
            is_valid: true,
            findings: vec![],
            metadata: ReportMetadata::default(),
        }
    }

    #[test]
    fn single_and_batch_results_are_exclusive() {
        let mut state = OrchestrationState::default();
        state.apply(Transition::SingleStarted);
        state.apply(Transition::SingleCompleted(Box::new(report("a"))));
        assert!(state.report().is_some());

        state.apply(Transition::BatchStarted);
        assert!(state.report().is_none());
        assert!(state.in_flight());
        state.apply(Transition::BatchCompleted(vec![report("b")]));
        assert!(state.report().is_none());
        assert_eq!(state.batch().map(|b| b.len()), Some(1));

        state.apply(Transition::SingleStarted);
        assert!(state.batch().is_none());
    }

    #[test]
    fn rejection_sets_error_without_starting() {
        let mut state = OrchestrationState::default();
        state.apply(Transition::Rejected {
            reason: "bad".into(),
        });
        assert_eq!(state.error(), Some("bad"));
        assert!(!state.in_flight());

        state.apply(Transition::SingleStarted);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn progress_never_goes_backwards() {
        let mut state = OrchestrationState::default();
        state.apply(Transition::BatchStarted);
        state.apply(Transition::Progress(40));
        state.apply(Transition::Progress(20));
        assert_eq!(state.progress(), 40);
        state.apply(Transition::Progress(100));
        assert_eq!(state.progress(), 100);
        state.apply(Transition::BatchStarted);
        assert_eq!(state.progress(), 0);
    }

    #[test]
    fn pagination_is_clamped_and_reset_by_new_batch() {
        let mut state = OrchestrationState::default();
        let batch: Vec<_> = (0..12).map(|i| report(&i.to_string())).collect();
        state.apply(Transition::BatchCompleted(batch.clone()));
        assert_eq!(state.page_count(), 3);
        assert_eq!(state.current_page().len(), 5);
        state.next_page();
        state.next_page();
        state.next_page();
        assert_eq!(state.page(), 2);
        assert_eq!(state.current_page().len(), 2);
        assert_eq!(state.current_page()[0].identifier, "10");

        state.apply(Transition::BatchCompleted(batch));
        assert_eq!(state.page(), 0);
        state.prev_page();
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn focusing_a_batch_row_makes_it_the_report() {
        let mut state = OrchestrationState::default();
        let batch: Vec<_> = (0..7).map(|i| report(&i.to_string())).collect();
        state.apply(Transition::BatchCompleted(batch));
        state.next_page();
        assert_eq!(state.page_row_index(1), Some(6));
        assert_eq!(state.page_row_index(2), None);

        state.apply(Transition::FocusBatchItem(99));
        assert_eq!(state.batch().map(|b| b.len()), Some(7));

        state.apply(Transition::FocusBatchItem(6));
        assert!(state.batch().is_none());
        assert_eq!(state.report().map(|r| r.identifier.as_str()), Some("6"));
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn focus_is_ignored_while_in_flight() {
        let mut state = OrchestrationState::default();
        state.apply(Transition::BatchCompleted(vec![report("a")]));
        state.in_flight = true;
        state.apply(Transition::FocusBatchItem(0));
        assert!(state.report().is_none());
        assert_eq!(state.batch().map(|b| b.len()), Some(1));
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = OrchestrationState::default();
        state.apply(Transition::BatchCompleted(vec![report("a")]));
        state.apply(Transition::Rejected {
            reason: "x".into(),
        });
        state.apply(Transition::Reset);
        assert_eq!(state, OrchestrationState::default());
    }
}
