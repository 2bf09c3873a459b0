use crate::analyzer::AnalysisError;
use crate::config::Config;
use crate::report::AnalysisResult;
use crate::ui::preview::VideoPreview;
use crate::ui::window::WindowWidgets;
use crate::validator::UploadedVideo;
use crate::workflow::WorkflowController;

/// Events delivered to the GTK main thread, from widgets and from the tokio runtime.
#[derive(Debug)]
pub enum BackendEvent {
    FileChosen(UploadedVideo),
    FileUnreadable(String),
    AnalyzeClicked,
    ResetClicked,
    AnalysisFinished {
        ticket: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub workflow: WorkflowController<VideoPreview>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // UI handles
    pub window: Option<WindowWidgets>,
}

impl AppState {
    pub fn new(
        config: Config,
        sender: async_channel::Sender<BackendEvent>,
        preview: VideoPreview,
    ) -> std::io::Result<Self> {
        if config.api_key().is_none() {
            log::warn!("No Gemini API key configured; set GEMINI_API_KEY or enter one in the window");
        }
        let tokio_rt = tokio::runtime::Runtime::new()?;

        Ok(Self {
            config,
            workflow: WorkflowController::new(preview),
            tokio_rt,
            backend_sender: sender,
            window: None,
        })
    }
}

/// Redraw every widget from the current workflow state.
pub fn refresh(state: &std::rc::Rc<std::cell::RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::window::render(window, &s.workflow);
    }
}

/// Release the preview and drop any selection. Safe to call more than once.
pub fn teardown(state: &std::rc::Rc<std::cell::RefCell<AppState>>) {
    log::info!("Shutting down");
    state.borrow_mut().workflow.reset();
}
