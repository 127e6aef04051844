//! Which controls are usable, as a function of what the application is doing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    /// Empty file list.
    #[default]
    Idle,
    /// At least one file listed, nothing running.
    CollectingFiles,
    /// A batch is running, the list is frozen.
    Converting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyList,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStates {
    pub add_files: bool,
    pub add_folder: bool,
    pub clear: bool,
    pub start: bool,
    pub accepts_drops: bool,
}

impl UiState {
    pub fn controls(&self) -> ControlStates {
        let editable = !self.is_converting();

        ControlStates {
            add_files: editable,
            add_folder: editable,
            clear: editable,
            start: editable,
            accepts_drops: editable,
        }
    }

    pub fn is_converting(&self) -> bool {
        matches!(self, UiState::Converting)
    }

    /// The file list changed, `file_count` is its new length.
    pub fn on_files_changed(self, file_count: usize) -> Result<UiState, Rejection> {
        match self {
            UiState::Converting => Err(Rejection::Busy),
            _ if file_count == 0 => Ok(UiState::Idle),
            _ => Ok(UiState::CollectingFiles),
        }
    }

    pub fn on_cleared(self) -> Result<UiState, Rejection> {
        self.on_files_changed(0)
    }

    pub fn on_start_requested(self) -> Result<UiState, Rejection> {
        match self {
            UiState::Idle            => Err(Rejection::EmptyList),
            UiState::CollectingFiles => Ok(UiState::Converting),
            UiState::Converting      => Err(Rejection::Busy),
        }
    }

    pub fn on_conversion_finished(self, file_count: usize) -> UiState {
        if file_count == 0 {
            UiState::Idle
        } else {
            UiState::CollectingFiles
        }
    }
}
