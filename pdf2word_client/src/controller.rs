//! Toolkit independent side of the desktop window.
//!
//! The controller owns the file list, the [`UiState`] machine and the values
//! shown by the progress bar and the status label. Widgets are synced from it
//! after every operation, and worker notifications come back through
//! [`UiController::handle_event`] on the UI thread.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use pdf2word_l10n as l10n;

use crate::collector::FileCollector;
use crate::common::{self, AppEvent, EventSender};
use crate::error::Failure;
use crate::state::{ControlStates, Rejection, UiState};
use crate::worker::{BatchReport, BatchWorker};

pub struct UiController {
    collector: FileCollector,
    state: UiState,
    progress: u8,
    status: String,
    last_report: Option<BatchReport>,
    completion_message: Option<String>,
    trans: Box<dyn l10n::Translations>,
}

impl UiController {
    pub fn new(trans: Box<dyn l10n::Translations>) -> Self {
        Self {
            collector: FileCollector::new(),
            state: UiState::default(),
            progress: 0,
            status: trans.gettext("Ready (drag and drop files onto the window)"),
            last_report: None,
            completion_message: None,
            trans,
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        self.collector.entries()
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn controls(&self) -> ControlStates {
        self.state.controls()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_report(&self) -> Option<&BatchReport> {
        self.last_report.as_ref()
    }

    /// Completion acknowledgment, handed out once per finished batch.
    pub fn take_completion_message(&mut self) -> Option<String> {
        self.completion_message.take()
    }

    pub fn add_selected(&mut self, paths: Vec<PathBuf>) -> Result<usize, Failure> {
        self.ensure_editable()?;

        if paths.is_empty() {
            return Ok(0);
        }

        let added = self.collector.add_selected(paths);
        self.files_changed()?;
        self.status = self.files_added_message();

        Ok(added)
    }

    pub fn add_folder(&mut self, root: &Path) -> Result<usize, Failure> {
        self.ensure_editable()?;

        let count = self.collector.scan_folder(root);
        self.files_changed()?;
        self.status = self.trans.gettext_fmt("Folder scan finished, {0} file(s) added", vec![&count.to_string()]);

        Ok(count)
    }

    /// Drops are ignored while a batch is running.
    pub fn add_dropped(&mut self, paths: Vec<PathBuf>) -> bool {
        if !self.controls().accepts_drops {
            return false;
        }

        let accepted = self.collector.add_dropped(paths);

        if accepted && self.files_changed().is_ok() {
            self.status = self.files_added_message();
        }

        accepted
    }

    pub fn clear(&mut self) -> Result<(), Failure> {
        self.ensure_editable()?;

        self.collector.clear();
        self.files_changed()?;
        self.progress = 0;
        self.status = self.trans.gettext("List cleared");

        Ok(())
    }

    /// Freezes the list and hands a snapshot of it to `worker` on its own thread.
    ///
    /// An empty list is refused with a warning suitable for a message box,
    /// without any state change.
    pub fn start_conversion(&mut self, worker: BatchWorker, tx: Box<dyn EventSender>) -> Result<JoinHandle<BatchReport>, Failure> {
        let next_state = self.state.on_start_requested().map_err(|rejection| self.rejection_failure(rejection))?;
        let job = self.collector.snapshot();

        let handle = worker.spawn(job, tx)?;

        self.state = next_state;
        self.progress = 0;
        self.last_report = None;
        self.completion_message = None;

        Ok(handle)
    }

    pub fn handle_event(&mut self, evt: AppEvent) {
        match evt {
            AppEvent::StatusChanged(msg) => {
                self.status = msg;
            },
            AppEvent::ProgressChanged(percent) => {
                self.progress = self.progress.max(percent.min(100));
            },
            AppEvent::AllConversionEnded(report) => {
                self.state = self.state.on_conversion_finished(self.collector.len());
                self.progress = 100;
                self.status = self.trans.gettext("All conversions finished!");
                self.completion_message = Some(self.completion_summary(&report));
                self.last_report = Some(report);
            },
        }
    }

    pub fn completion_summary(&self, report: &BatchReport) -> String {
        if report.failed_count() == 0 {
            return self.trans.gettext("All PDF files were converted to Word!\nThe documents are saved next to the original files.");
        }

        let mut summary = self.trans.ngettext("{0} file failed to convert:", "{0} files failed to convert:", report.failed_count() as u64);

        for (input, _) in report.failures() {
            summary.push('\n');
            summary.push_str(&common::display_name(input));
        }

        summary
    }

    fn files_added_message(&self) -> String {
        self.trans.gettext_fmt("Files added, {0} in total", vec![&self.collector.len().to_string()])
    }

    fn files_changed(&mut self) -> Result<(), Failure> {
        self.state = self.state
            .on_files_changed(self.collector.len())
            .map_err(|rejection| self.rejection_failure(rejection))?;

        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), Failure> {
        if self.state.is_converting() {
            Err(Failure::Busy)
        } else {
            Ok(())
        }
    }

    fn rejection_failure(&self, rejection: Rejection) -> Failure {
        match rejection {
            Rejection::EmptyList => Failure::InvalidInput(self.trans.gettext("Please add PDF files first!")),
            Rejection::Busy      => Failure::Busy,
        }
    }
}
