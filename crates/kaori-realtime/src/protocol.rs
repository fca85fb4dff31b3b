//! # Realtime Wire Protocol
//!
//! One JSON text frame per event, server to client only:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {                                                                      │
//! │    "type":     "new_order" | "order_status" | "payment",               │
//! │    "payload":  <Order> | {id, status} | {id, payment_status, ...},     │
//! │    "store_id": "store-1"                                               │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Clients never send application frames. Anything they do send is read and
//! discarded; only Close and transport errors matter.

use serde::{Deserialize, Serialize};

use kaori_core::OrderEvent;

/// An [`OrderEvent`] stamped with the store it happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub event: OrderEvent,
    pub store_id: String,
}

impl Envelope {
    pub fn new(store_id: impl Into<String>, event: OrderEvent) -> Self {
        Envelope {
            event,
            store_id: store_id.into(),
        }
    }

    /// Encodes the envelope as a single text frame body.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
