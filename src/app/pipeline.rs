use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};
use crate::workflow::AnalysisTicket;

/// Run one Gemini analysis on the tokio runtime and post the outcome back.
pub fn dispatch_analysis(state: &Rc<RefCell<AppState>>, ticket: AnalysisTicket) {
    let s = state.borrow();
    let config = s.config.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        let outcome = crate::analyzer::analyze(&config, &ticket.video).await;
        let event = BackendEvent::AnalysisFinished {
            ticket: ticket.id,
            outcome,
        };
        if sender.send(event).await.is_err() {
            log::warn!("UI gone before analysis #{} finished", ticket.id);
        }
    });
}
