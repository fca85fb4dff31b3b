//! Plugs the hub into the order lifecycle.

use tracing::warn;

use kaori_core::OrderEvent;
use kaori_orders::EventSink;

use crate::hub::{Audience, HubHandle};
use crate::protocol::Envelope;

/// Lifecycle events go to everyone watching the order's store.
///
/// A hub that is gone or an event that fails to encode is logged and
/// swallowed; the order change itself has already been stored.
impl EventSink for HubHandle {
    fn publish(&self, store_id: &str, event: OrderEvent) {
        let envelope = Envelope::new(store_id, event);
        if let Err(e) = self.broadcast(Audience::Store(store_id.to_string()), &envelope) {
            warn!(
                store_id = %store_id,
                order_id = %envelope.event.order_id(),
                event = envelope.event.kind(),
                error = %e,
                "Order event not broadcast"
            );
        }
    }
}
