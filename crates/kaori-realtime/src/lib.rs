//! # kaori-realtime: Live Order Broadcasts
//!
//! Fans order events out to kitchen and cashier displays over WebSocket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Realtime Data Flow                               │
//! │                                                                         │
//! │  kaori-orders OrderLifecycle                                           │
//! │       │ EventSink::publish(store_id, OrderEvent)                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  kaori-realtime (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   HubHandle ──► BroadcastHub loop ──► bounded queue per sub    │   │
//! │  │   (sink.rs)      (hub.rs)                  │                    │   │
//! │  │                                            ▼                    │   │
//! │  │                              SubscriberSession (session.rs)     │   │
//! │  └────────────────────────────────────────────┼────────────────────┘   │
//! │                                               ▼                         │
//! │                          kitchen display / cashier screen               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`hub`] - Coordination loop, `HubHandle`, audiences
//! - [`session`] - Per-connection read/write loops
//! - [`protocol`] - Wire envelope
//! - [`sink`] - `EventSink` for `HubHandle`
//! - [`config`] - `HubConfig`
//! - [`error`] - `HubError`

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod session;
pub mod sink;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::HubConfig;
pub use error::{HubError, HubResult};
pub use hub::{
    Audience, BroadcastHub, HubHandle, Outbound, SubscriberId, SubscriberInfo, SubscriberScope,
    Subscription,
};
pub use protocol::Envelope;
pub use session::SubscriberSession;
