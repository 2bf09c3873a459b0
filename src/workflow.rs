//! Upload → validate → analyze → render state machine.
//!
//! The controller owns the selected video, its preview handle, and the
//! outcome of the last analysis. Each state carries only the data that is
//! meaningful in it, so a result and an error can never coexist.
//!
//! The network call itself happens elsewhere: [`WorkflowController::start_analysis`]
//! hands out an [`AnalysisTicket`], and the caller reports back through
//! [`WorkflowController::complete`]. Outcomes for tickets that are no longer
//! current (the file was replaced or the session reset) are dropped.

use crate::analyzer::AnalysisError;
use crate::report::AnalysisResult;
use crate::validator::{self, UploadedVideo, ValidationError};

/// Creates and releases preview resources for a selected video.
///
/// Every handle returned by `acquire` is passed back to `release` exactly once.
pub trait PreviewHost {
    type Handle;

    fn acquire(&mut self, video: &UploadedVideo) -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);
}

/// The selected video together with its preview.
#[derive(Debug)]
pub struct Selection<P> {
    pub video: UploadedVideo,
    pub preview: P,
}

/// Workflow state.
#[derive(Debug)]
pub enum WorkflowState<P> {
    Idle,
    VideoSelected(Selection<P>),
    Analyzing {
        selection: Selection<P>,
        ticket: u64,
    },
    Resulted {
        selection: Selection<P>,
        result: AnalysisResult,
    },
    Failed {
        selection: Selection<P>,
        error: String,
    },
}

/// Payload-free view of [`WorkflowState`], handy for rendering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStatus {
    Idle,
    VideoSelected,
    Analyzing,
    Resulted,
    Failed,
}

impl<P> Default for WorkflowState<P> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<P> WorkflowState<P> {
    pub fn status(&self) -> WorkflowStatus {
        match self {
            Self::Idle => WorkflowStatus::Idle,
            Self::VideoSelected(_) => WorkflowStatus::VideoSelected,
            Self::Analyzing { .. } => WorkflowStatus::Analyzing,
            Self::Resulted { .. } => WorkflowStatus::Resulted,
            Self::Failed { .. } => WorkflowStatus::Failed,
        }
    }

    fn selection(&self) -> Option<&Selection<P>> {
        match self {
            Self::Idle => None,
            Self::VideoSelected(selection)
            | Self::Analyzing { selection, .. }
            | Self::Resulted { selection, .. }
            | Self::Failed { selection, .. } => Some(selection),
        }
    }

    fn into_selection(self) -> Option<Selection<P>> {
        match self {
            Self::Idle => None,
            Self::VideoSelected(selection)
            | Self::Analyzing { selection, .. }
            | Self::Resulted { selection, .. }
            | Self::Failed { selection, .. } => Some(selection),
        }
    }
}

/// Work order for one analysis attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub id: u64,
    pub video: UploadedVideo,
}

pub struct WorkflowController<H: PreviewHost> {
    host: H,
    state: WorkflowState<H::Handle>,
    /// Inline message from the last rejected selection
    validation_message: Option<String>,
    next_ticket: u64,
}

impl<H: PreviewHost> WorkflowController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: WorkflowState::Idle,
            validation_message: None,
            next_ticket: 1,
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.state.status()
    }

    pub fn video(&self) -> Option<&UploadedVideo> {
        self.state.selection().map(|s| &s.video)
    }

    pub fn preview(&self) -> Option<&H::Handle> {
        self.state.selection().map(|s| &s.preview)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            WorkflowState::Resulted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, WorkflowState::Analyzing { .. })
    }

    /// Analysis can start from a fresh selection or as a retry after a failure.
    pub fn can_start_analysis(&self) -> bool {
        matches!(
            self.state,
            WorkflowState::VideoSelected(_) | WorkflowState::Failed { .. }
        )
    }

    /// Validate and adopt a new video. On rejection the state is untouched
    /// and the reason is kept as the validation message.
    pub fn select_file(&mut self, video: UploadedVideo) -> Result<(), ValidationError> {
        if let Err(e) = validator::validate(&video) {
            log::info!("Rejected {}: {e}", video.display_name);
            self.validation_message = Some(e.to_string());
            return Err(e);
        }

        if self.is_analyzing() {
            log::info!("Replacing video while analysis is in flight; its result will be dropped");
        }
        self.release_current();

        let preview = self.host.acquire(&video);
        log::info!("Selected {} ({:.1} MB)", video.display_name, video.size_mb());
        self.state = WorkflowState::VideoSelected(Selection { video, preview });
        self.validation_message = None;
        Ok(())
    }

    /// Surface a message for a file that could not even be inspected.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.validation_message = Some(reason.into());
    }

    /// Enter `Analyzing` and return the work order, or `None` if analysis
    /// cannot start (nothing selected, already in flight, or already resulted).
    pub fn start_analysis(&mut self) -> Option<AnalysisTicket> {
        if !self.can_start_analysis() {
            log::debug!("Ignoring analysis request while {:?}", self.status());
            return None;
        }
        let selection = std::mem::take(&mut self.state).into_selection()?;

        let id = self.next_ticket;
        self.next_ticket += 1;
        let ticket = AnalysisTicket {
            id,
            video: selection.video.clone(),
        };
        self.state = WorkflowState::Analyzing { selection, ticket: id };
        log::info!("Analysis #{id} started");
        Some(ticket)
    }

    /// Apply the outcome of ticket `id`. Returns `false` if the ticket is stale
    /// and the outcome was discarded.
    pub fn complete(
        &mut self,
        id: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        match &self.state {
            WorkflowState::Analyzing { ticket, .. } if *ticket == id => {}
            _ => {
                log::warn!("Discarding stale outcome of analysis #{id}");
                return false;
            }
        }
        let Some(selection) = std::mem::take(&mut self.state).into_selection() else {
            return false;
        };

        self.state = match outcome {
            Ok(result) => {
                log::info!("Analysis #{id} finished: {}", result.exercise_name);
                WorkflowState::Resulted { selection, result }
            }
            Err(e) => {
                log::error!("Analysis #{id} failed: {e}");
                let mut error = e.to_string();
                if error.trim().is_empty() {
                    error = "analysis failed".into();
                }
                WorkflowState::Failed { selection, error }
            }
        };
        true
    }

    /// Drop the selection and any outcome, releasing the preview.
    pub fn reset(&mut self) {
        if self.status() != WorkflowStatus::Idle {
            log::info!("Reset from {:?}", self.status());
        }
        self.release_current();
        self.validation_message = None;
    }

    fn release_current(&mut self) {
        if let Some(selection) = std::mem::take(&mut self.state).into_selection() {
            self.host.release(selection.preview);
        }
    }
}

impl<H: PreviewHost> Drop for WorkflowController<H> {
    fn drop(&mut self) {
        self.release_current();
    }
}
