use log::debug;
use tokio::sync::mpsc;

use crate::services::FeedbackSink;

/// Forwards reload acknowledgements to the terminal UI, which flashes a notice.
pub struct UiFeedback {
    tx: mpsc::UnboundedSender<()>,
}

impl UiFeedback {
    pub fn new(tx: mpsc::UnboundedSender<()>) -> Self {
        Self { tx }
    }
}

impl FeedbackSink for UiFeedback {
    fn notify_success(&self) {
        if self.tx.send(()).is_err() {
            debug!("ui gone, reload notice dropped");
        }
    }
}
