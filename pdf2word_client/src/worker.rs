use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use pdf2word_l10n as l10n;

use crate::collector::BatchJob;
use crate::common::{self, AppEvent, EventSender};
use crate::converter::{DocumentConverter, PageRange};
use crate::error::Failure;

pub const WORKER_THREAD_NAME: &str = "pdf2word.worker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted { output: PathBuf },
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted { .. })
    }
}

/// Per-file outcomes of one batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl BatchReport {
    pub fn push(&mut self, input: PathBuf, outcome: FileOutcome) {
        self.outcomes.push((input, outcome));
    }

    pub fn outcomes(&self) -> &[(PathBuf, FileOutcome)] {
        &self.outcomes
    }

    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn converted_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| outcome.is_converted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total_count() - self.converted_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.outcomes.iter().filter_map(|(input, outcome)| match outcome {
            FileOutcome::Failed { reason } => Some((input, reason.as_str())),
            FileOutcome::Converted { .. }  => None,
        })
    }
}

/// Rounded share of processed files, `processed` counts the current one.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }

    let percent = (processed.min(total) as f64 / total as f64 * 100.0).round();
    percent as u8
}

/// Converts a batch one file at a time, reporting through an [`EventSender`].
#[derive(Clone)]
pub struct BatchWorker {
    converter: Arc<dyn DocumentConverter>,
    pages: PageRange,
    trans: Box<dyn l10n::Translations>,
}

impl BatchWorker {
    pub fn new(converter: Arc<dyn DocumentConverter>, pages: PageRange, trans: Box<dyn l10n::Translations>) -> Self {
        Self { converter, pages, trans }
    }

    /// Runs the batch on a dedicated thread, the handle yields the report.
    pub fn spawn(self, job: BatchJob, tx: Box<dyn EventSender>) -> io::Result<JoinHandle<BatchReport>> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run(job, tx))
    }

    pub fn run(&self, job: BatchJob, tx: Box<dyn EventSender>) -> BatchReport {
        let total = job.len();
        let mut report = BatchReport::default();

        tracing::info!("Starting conversion of {} file(s)", total);

        for (idx, input_path) in job.entries().iter().enumerate() {
            let file_name = common::display_name(input_path);
            notify(tx.as_ref(), AppEvent::StatusChanged(self.trans.gettext_fmt("Converting: {0} ...", vec![&file_name])));

            match self.convert_one(input_path) {
                Ok(output) => {
                    tracing::info!("Converted {} to {}", input_path.display(), output.display());
                    report.push(input_path.clone(), FileOutcome::Converted { output });
                    notify(tx.as_ref(), AppEvent::ProgressChanged(progress_percent(idx + 1, total)));
                },
                Err(ex) => {
                    tracing::warn!("Error converting {}: {}", input_path.display(), ex);
                    report.push(input_path.clone(), FileOutcome::Failed { reason: ex.to_string() });
                    notify(tx.as_ref(), AppEvent::StatusChanged(self.trans.gettext_fmt("Conversion failed: {0}", vec![&file_name])));
                }
            }
        }

        tracing::info!("Conversion ended: {} converted, {} failed", report.converted_count(), report.failed_count());
        notify(tx.as_ref(), AppEvent::AllConversionEnded(report.clone()));

        report
    }

    fn convert_one(&self, input_path: &Path) -> Result<PathBuf, Failure> {
        let output_path = common::docx_output_path(input_path)?;

        if output_path.exists() {
            tracing::warn!("Overwriting existing file {}", output_path.display());
        }

        self.converter.convert(input_path, &output_path, self.pages)?;
        Ok(output_path)
    }
}

// The receiving side may be gone (window closed), the batch still runs to the end.
fn notify(tx: &dyn EventSender, evt: AppEvent) {
    if tx.send(evt).is_err() {
        tracing::debug!("Event receiver disconnected");
    }
}
