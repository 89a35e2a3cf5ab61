//! Delivery seam for investment-opportunity signals.
//!
//! The income store hands every opportunity to an [`InvestmentNotifier`] in
//! addition to returning it from the mutation. Rendering the prompt (or
//! scheduling a device notification) is up to the presentation layer.

use shared::InvestmentOpportunity;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub trait InvestmentNotifier: Send + Sync {
    fn notify(&self, opportunity: &InvestmentOpportunity);
}

/// Default notifier: records the opportunity in the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl InvestmentNotifier for LogNotifier {
    fn notify(&self, opportunity: &InvestmentOpportunity) {
        info!(
            threshold = opportunity.threshold,
            total_before = opportunity.total_before,
            carried_over = opportunity.carried_over,
            "{} {}",
            opportunity.title,
            opportunity.body
        );
    }
}

/// Forwards opportunities to a receiver owned by the presentation layer
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<InvestmentOpportunity>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InvestmentOpportunity>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl InvestmentNotifier for ChannelNotifier {
    fn notify(&self, opportunity: &InvestmentOpportunity) {
        if self.sender.send(opportunity.clone()).is_err() {
            warn!("Investment opportunity dropped: no listener");
        }
    }
}
