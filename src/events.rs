use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Events emitted over the course of a checkout.
///
/// Consumers (notifications, analytics) subscribe to the receiving end of the
/// channel; the settlement core only publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutStarted {
        buyer_id: Uuid,
        branch_count: usize,
    },
    CouponApplied {
        branch_id: String,
        code: String,
        discount: Decimal,
    },
    CouponRejected {
        branch_id: String,
        code: String,
    },
    /// One branch's order reached storage.
    OrderSubmitted {
        buyer_id: Uuid,
        branch_id: String,
        order_id: Uuid,
    },
    /// Every branch in the checkout committed; the cart was cleared.
    CheckoutCompleted {
        buyer_id: Uuid,
        order_count: usize,
    },
    CheckoutFailed {
        buyer_id: Uuid,
        reason: String,
    },
}

/// Cloneable handle for publishing checkout events.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Publishes an event, logging instead of failing when the channel is
    /// closed or full. Event delivery must never abort a settlement.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!(error = %e, "failed to publish checkout event");
        }
    }
}
