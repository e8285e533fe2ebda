use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Batch,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "SINGLE_MODE"),
            Mode::Batch => write!(f, "BATCH_MODE_ON"),
        }
    }
}

/// Operator-side console model: what is typed, which mode is active and
/// which recent entry is highlighted. Result data lives in the engine.
pub struct App {
    pub input: String,
    pub mode: Mode,
    pub selected_recent: usize,
    pub status: Option<String>,
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(export_dir: PathBuf) -> Self {
        Self {
            input: String::new(),
            mode: Mode::Single,
            selected_recent: 0,
            status: None,
            export_dir,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Single => Mode::Batch,
            Mode::Batch => Mode::Single,
        };
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Newlines only make sense in the batch list.
    pub fn newline(&mut self) {
        if self.mode == Mode::Batch {
            self.input.push('\n');
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.status = None;
    }

    pub fn select_next_recent(&mut self, len: usize) {
        if len == 0 {
            self.selected_recent = 0;
        } else {
            self.selected_recent = (self.selected_recent + 1) % len;
        }
    }

    pub fn select_prev_recent(&mut self, len: usize) {
        if len == 0 {
            self.selected_recent = 0;
        } else {
            self.selected_recent = (self.selected_recent + len - 1) % len;
        }
    }

    pub fn input_title(&self) -> &'static str {
        match self.mode {
            Mode::Single => " MSISDN_IN (ENTER=PROBE) ",
            Mode::Batch => " LIST_ARRAY (ENTER=NEWLINE, F5=EXTRACT) ",
        }
    }

    pub fn trigger_label(&self, in_flight: bool) -> &'static str {
        match (in_flight, self.mode) {
            (true, _) => "RUNNING_DEEP_SCAN",
            (false, Mode::Single) => "INITIALIZE_OSINT_PROBE",
            (false, Mode::Batch) => "EXTRACT_BATCH_PACKETS",
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }
}
