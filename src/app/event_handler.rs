use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::dispatch_analysis;
use super::state::{refresh, AppState, BackendEvent};

/// Handle a backend event. This is where UI input meets the workflow state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::FileChosen(video) => {
            // Rejections stay visible through the validation message.
            let _ = state.borrow_mut().workflow.select_file(video);
        }
        BackendEvent::FileUnreadable(reason) => {
            log::warn!("Could not use chosen file: {reason}");
            state.borrow_mut().workflow.reject(reason);
        }
        BackendEvent::AnalyzeClicked => {
            let ticket = state.borrow_mut().workflow.start_analysis();
            match ticket {
                Some(ticket) => dispatch_analysis(state, ticket),
                None => {
                    let status = state.borrow().workflow.status();
                    log::info!("Ignoring analyze request while status={status:?}");
                }
            }
        }
        BackendEvent::ResetClicked => {
            state.borrow_mut().workflow.reset();
        }
        BackendEvent::AnalysisFinished { ticket, outcome } => {
            let applied = state.borrow_mut().workflow.complete(ticket, outcome);
            if !applied {
                return;
            }
        }
    }
    refresh(state);
}
