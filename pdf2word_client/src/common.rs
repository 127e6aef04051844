use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, SendError};

use serde::{Deserialize, Serialize};

use crate::error::Failure;
use crate::worker::BatchReport;

pub const NAMESPACE_APP: &str = "com.pdf2word.client";
pub const ENV_VAR_PDF2WORD_CONVERTER: &str = "PDF2WORD_CONVERTER";
pub const DEFAULT_CONVERTER_EXE: &str = "pdf2docx";
pub const PDF_EXTENSION: &str = "pdf";
pub const DOCX_EXTENSION: &str = "docx";

pub const LOG_FORMAT_PLAIN: &str = "plain";
pub const LOG_FORMAT_JSON: &str = "json";

#[macro_export]
macro_rules! incl_gettext_files {
    ( $( $x:expr ),* ) => {
        {
            let mut ret = std::collections::HashMap::with_capacity(2);
            $(
                let data = include_bytes!(concat!("../translations/", $x, "/LC_MESSAGES/messages.mo")).as_slice();
                ret.insert($x, data);
            )*

            ret
        }
    };
}

pub trait EventSender: Send {
    fn send(&self, evt: AppEvent) -> Result<(), SendError<AppEvent>>;

    fn clone_box(&self) -> Box<dyn EventSender>;
}

/// Notifications flowing from the batch worker to whoever drives the UI.
#[derive(Clone, Debug)]
pub enum AppEvent {
    // human readable status line
    StatusChanged(String),
    // overall percentage, 0..=100
    ProgressChanged(u8),
    // sent exactly once per batch
    AllConversionEnded(BatchReport),
}

#[derive(Clone)]
pub struct ChannelEventSender {
    tx: mpsc::Sender<AppEvent>,
}

impl ChannelEventSender {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl EventSender for ChannelEventSender {
    fn send(&self, evt: AppEvent) -> Result<(), SendError<AppEvent>> {
        self.tx.send(evt)
    }

    fn clone_box(&self) -> Box<dyn EventSender> {
        Box::new(self.clone())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LogMessage {
    pub data: String,
    pub percent_complete: usize,
}

pub fn executable_find(exe_name: &str) -> Option<PathBuf> {
    which::which(exe_name).ok()
}

/// Case-insensitive `.pdf` suffix check, nothing else is validated.
pub fn has_pdf_suffix(path: &Path) -> bool {
    let suffix = format!(".{}", PDF_EXTENSION);

    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(&suffix))
        .unwrap_or(false)
}

/// Sibling `.docx` path for a PDF, i.e. `/docs/report.PDF` gives `/docs/report.docx`.
pub fn docx_output_path(input: &Path) -> Result<PathBuf, Failure> {
    if input.file_stem().is_none() {
        return Err(Failure::InvalidInput(format!("Cannot determine the Word output path for {}", input.display())));
    }

    Ok(input.with_extension(DOCX_EXTENSION))
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
