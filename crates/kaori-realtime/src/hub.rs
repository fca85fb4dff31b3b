//! # Broadcast Hub
//!
//! Owns the set of live subscribers. Every mutation of that set and every
//! fan-out happens inside ONE coordination loop, so concurrent request and
//! connection tasks never race on it.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Broadcast Hub                                    │
//! │                                                                         │
//! │  HubHandle (Clone)            HubHandle (Clone)        HubHandle        │
//! │  lifecycle publish            ws session               /health          │
//! │       │ Broadcast                  │ Register/Unregister   │ Count      │
//! │       └──────────────┬─────────────┴───────────────────────┘            │
//! │                      ▼  unbounded command queue (FIFO)                  │
//! │        ┌──────────────────────────────────────────┐                     │
//! │        │        BroadcastHub::run (one task)      │                     │
//! │        │  HashMap<SubscriberId, Entry>            │                     │
//! │        └──────┬───────────────┬───────────────┬───┘                     │
//! │               │ try_send      │ try_send      │ try_send                │
//! │               ▼               ▼               ▼                         │
//! │        [queue cap N]   [queue cap N]   [queue FULL] ──► dropped         │
//! │         session #1      session #2      session #3     (unresponsive)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Rules
//! - At most once, never persisted, never replayed.
//! - Non-blocking per subscriber: a full or closed queue gets the subscriber
//!   removed and its queue closed, the broadcast carries on.
//! - Per-subscriber order follows command order. Nothing is promised across
//!   subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use kaori_core::StaffRole;

use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::protocol::Envelope;

// =============================================================================
// Subscribers
// =============================================================================

pub type SubscriberId = Uuid;

/// Encoded frame shared by every recipient of one broadcast.
pub type Outbound = Arc<str>;

/// Store and role a subscriber declared at handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscriberScope {
    pub store_id: Option<String>,
    pub role: Option<StaffRole>,
}

impl SubscriberScope {
    pub fn new(store_id: Option<String>, role: Option<StaffRole>) -> Self {
        SubscriberScope { store_id, role }
    }

    /// Whether a broadcast aimed at `audience` reaches this subscriber.
    ///
    /// Super admins hear every store. Everyone else must have declared the
    /// store; a subscriber with no store only hears [`Audience::All`].
    pub fn receives(&self, audience: &Audience) -> bool {
        let super_admin = self.role == Some(StaffRole::SuperAdmin);
        match audience {
            Audience::All => true,
            Audience::Store(store) => super_admin || self.is_in(store),
            Audience::Kitchen(store) => {
                super_admin
                    || (self.is_in(store) && self.role.is_some_and(|r| r.sees_kitchen()))
            }
        }
    }

    fn is_in(&self, store: &str) -> bool {
        self.store_id.as_deref() == Some(store)
    }
}

/// Who a broadcast is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    /// Every subscriber of one store.
    Store(String),
    /// Kitchen-facing roles of one store.
    Kitchen(String),
}

/// Read-only view of a live subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberInfo {
    pub id: SubscriberId,
    #[serde(flatten)]
    pub scope: SubscriberScope,
    pub connected_at: DateTime<Utc>,
}

/// Receiving end handed to a session on registration.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::Receiver<Outbound>,
}

struct Entry {
    scope: SubscriberScope,
    connected_at: DateTime<Utc>,
    tx: mpsc::Sender<Outbound>,
}

// =============================================================================
// Commands
// =============================================================================

enum HubCommand {
    Register {
        id: SubscriberId,
        scope: SubscriberScope,
        tx: mpsc::Sender<Outbound>,
    },
    Unregister(SubscriberId),
    Broadcast {
        audience: Audience,
        frame: Outbound,
    },
    Count(oneshot::Sender<usize>),
    Subscribers(oneshot::Sender<Vec<SubscriberInfo>>),
    Shutdown,
}

// =============================================================================
// Hub Handle
// =============================================================================

/// Cheap, cloneable entry point to the coordination loop.
///
/// `register`, `unregister` and `broadcast` never wait: they enqueue a command
/// and return. Commands are applied in the order they were sent, so a
/// broadcast issued after `register` returns is guaranteed to see the new
/// subscriber.
#[derive(Clone)]
pub struct HubHandle {
    cmd_tx: mpsc::UnboundedSender<HubCommand>,
    config: Arc<HubConfig>,
}

impl HubHandle {
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Adds a subscriber and returns its bounded outbound queue.
    pub fn register(&self, scope: SubscriberScope) -> HubResult<Subscription> {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        self.send(HubCommand::Register { id, scope, tx })?;
        Ok(Subscription { id, rx })
    }

    /// Removes a subscriber and closes its queue. Unknown ids are ignored.
    pub fn unregister(&self, id: SubscriberId) {
        // Nothing to clean up if the loop is already gone.
        let _ = self.send(HubCommand::Unregister(id));
    }

    /// Encodes `envelope` once and queues it for every matching subscriber.
    pub fn broadcast(&self, audience: Audience, envelope: &Envelope) -> HubResult<()> {
        let frame = envelope.encode().map_err(|e| {
            error!(event = envelope.event.kind(), ?e, "Failed to encode broadcast");
            HubError::from(e)
        })?;
        self.send(HubCommand::Broadcast {
            audience,
            frame: Arc::from(frame),
        })
    }

    /// Number of live subscribers.
    pub async fn subscriber_count(&self) -> HubResult<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Count(reply))?;
        rx.await.map_err(|_| HubError::ShuttingDown)
    }

    /// Snapshot of the live subscribers.
    pub async fn subscribers(&self) -> HubResult<Vec<SubscriberInfo>> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Subscribers(reply))?;
        rx.await.map_err(|_| HubError::ShuttingDown)
    }

    /// Stops the loop. Every subscriber queue closes, ending its session.
    pub fn shutdown(&self) -> HubResult<()> {
        self.send(HubCommand::Shutdown)
    }

    fn send(&self, cmd: HubCommand) -> HubResult<()> {
        self.cmd_tx.send(cmd).map_err(|_| HubError::ShuttingDown)
    }
}

// =============================================================================
// Hub Loop
// =============================================================================

/// The coordination loop and the subscriber set it owns.
pub struct BroadcastHub {
    config: Arc<HubConfig>,
    subscribers: HashMap<SubscriberId, Entry>,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> HubResult<Self> {
        config.validate()?;
        Ok(BroadcastHub {
            config: Arc::new(config),
            subscribers: HashMap::new(),
        })
    }

    /// Spawns the loop on the current runtime and returns a handle.
    pub fn start(self) -> HubHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = HubHandle {
            cmd_tx,
            config: Arc::clone(&self.config),
        };

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        handle
    }

    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<HubCommand>) {
        info!(
            queue_capacity = self.config.queue_capacity,
            store_scoped = self.config.store_scoped,
            "Broadcast hub started"
        );

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                HubCommand::Register { id, scope, tx } => {
                    info!(
                        subscriber_id = %id,
                        store_id = scope.store_id.as_deref().unwrap_or("-"),
                        role = scope.role.map(|r| r.as_str()).unwrap_or("-"),
                        "Subscriber registered"
                    );
                    self.subscribers.insert(
                        id,
                        Entry {
                            scope,
                            connected_at: Utc::now(),
                            tx,
                        },
                    );
                }
                HubCommand::Unregister(id) => {
                    if self.subscribers.remove(&id).is_some() {
                        info!(subscriber_id = %id, "Subscriber unregistered");
                    }
                }
                HubCommand::Broadcast { audience, frame } => {
                    self.fan_out(audience, frame);
                }
                HubCommand::Count(reply) => {
                    let _ = reply.send(self.subscribers.len());
                }
                HubCommand::Subscribers(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                HubCommand::Shutdown => {
                    info!("Broadcast hub shutting down");
                    break;
                }
            }
        }

        info!(
            remaining = self.subscribers.len(),
            "Broadcast hub stopped - closing subscriber queues"
        );
        self.subscribers.clear();
    }

    fn fan_out(&mut self, audience: Audience, frame: Outbound) {
        let audience = if self.config.store_scoped {
            audience
        } else {
            Audience::All
        };

        let mut delivered = 0usize;
        let mut unresponsive = Vec::new();

        for (id, entry) in &self.subscribers {
            if !entry.scope.receives(&audience) {
                continue;
            }
            match entry.tx.try_send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber_id = %id, "Subscriber queue full - dropping as unresponsive");
                    unresponsive.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber_id = %id, "Subscriber queue already closed");
                    unresponsive.push(*id);
                }
            }
        }

        for id in &unresponsive {
            self.subscribers.remove(id);
        }

        debug!(
            ?audience,
            delivered,
            dropped = unresponsive.len(),
            "Broadcast fanned out"
        );
    }

    fn snapshot(&self) -> Vec<SubscriberInfo> {
        let mut list: Vec<_> = self
            .subscribers
            .iter()
            .map(|(id, entry)| SubscriberInfo {
                id: *id,
                scope: entry.scope.clone(),
                connected_at: entry.connected_at,
            })
            .collect();
        list.sort_by_key(|info| info.connected_at);
        list
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kaori_core::{OrderEvent, OrderStatus, StatusChange};
    use tokio::sync::mpsc::error::TryRecvError;

    fn start(config: HubConfig) -> HubHandle {
        BroadcastHub::new(config).unwrap().start()
    }

    fn status_envelope(store: &str, id: &str) -> Envelope {
        Envelope::new(
            store,
            OrderEvent::OrderStatus(StatusChange {
                id: id.to_string(),
                status: OrderStatus::Cooking,
            }),
        )
    }

    fn scope(store: Option<&str>, role: Option<StaffRole>) -> SubscriberScope {
        SubscriberScope::new(store.map(str::to_string), role)
    }

    #[test]
    fn test_scope_rules() {
        let kitchen_s = scope(Some("s"), Some(StaffRole::Kitchen));
        let cashier_s = scope(Some("s"), Some(StaffRole::Cashier));
        let anon_t = scope(Some("t"), None);
        let storeless = scope(None, Some(StaffRole::Kitchen));
        let super_admin = scope(None, Some(StaffRole::SuperAdmin));

        let store_s = Audience::Store("s".into());
        let kitchen = Audience::Kitchen("s".into());

        assert!(kitchen_s.receives(&store_s));
        assert!(kitchen_s.receives(&kitchen));
        assert!(cashier_s.receives(&store_s));
        assert!(!cashier_s.receives(&kitchen));
        assert!(!anon_t.receives(&store_s));
        assert!(anon_t.receives(&Audience::All));
        assert!(!storeless.receives(&store_s));
        assert!(storeless.receives(&Audience::All));
        assert!(super_admin.receives(&store_s));
        assert!(super_admin.receives(&kitchen));
    }

    #[tokio::test]
    async fn test_register_then_broadcast_delivers_once() {
        let hub = start(HubConfig::default());
        let mut sub = hub.register(scope(Some("s"), None)).unwrap();

        hub.broadcast(Audience::Store("s".into()), &status_envelope("s", "o-1"))
            .unwrap();

        let frame = sub.rx.recv().await.unwrap();
        assert!(frame.contains("\"id\":\"o-1\""));
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);
        assert!(matches!(sub.rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery_and_is_idempotent() {
        let hub = start(HubConfig::default());
        let mut sub = hub.register(scope(Some("s"), None)).unwrap();

        hub.unregister(sub.id);
        hub.unregister(sub.id);
        hub.broadcast(Audience::All, &status_envelope("s", "o-1")).unwrap();

        assert_eq!(hub.subscriber_count().await.unwrap(), 0);
        // Queue closed with nothing in it.
        assert!(sub.rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_full_queue_drops_subscriber_without_blocking() {
        let hub = start(HubConfig {
            queue_capacity: 2,
            ..HubConfig::default()
        });
        let mut slow = hub.register(scope(Some("s"), None)).unwrap();
        let mut fast = hub.register(scope(Some("s"), None)).unwrap();

        for i in 0..3 {
            hub.broadcast(Audience::Store("s".into()), &status_envelope("s", &format!("o-{i}")))
                .unwrap();
            // Keep the fast consumer drained.
            if i < 2 {
                assert!(fast.rx.recv().await.is_some());
            }
        }
        assert!(fast.rx.recv().await.is_some());

        assert_eq!(hub.subscriber_count().await.unwrap(), 1);
        let remaining = hub.subscribers().await.unwrap();
        assert_eq!(remaining[0].id, fast.id);

        // The slow one keeps what it had, then sees its queue closed.
        assert!(slow.rx.recv().await.is_some());
        assert!(slow.rx.recv().await.is_some());
        assert!(slow.rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_store_scoping() {
        let hub = start(HubConfig::default());
        let mut in_s = hub.register(scope(Some("s"), Some(StaffRole::Kitchen))).unwrap();
        let mut in_t = hub.register(scope(Some("t"), Some(StaffRole::Kitchen))).unwrap();

        hub.broadcast(Audience::Store("s".into()), &status_envelope("s", "o-1"))
            .unwrap();
        hub.subscriber_count().await.unwrap();

        assert!(in_s.rx.try_recv().is_ok());
        assert!(matches!(in_t.rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_store_scoping_disabled_reaches_everyone() {
        let hub = start(HubConfig {
            store_scoped: false,
            ..HubConfig::default()
        });
        let mut in_t = hub.register(scope(Some("t"), None)).unwrap();
        let mut storeless = hub.register(SubscriberScope::default()).unwrap();

        hub.broadcast(Audience::Kitchen("s".into()), &status_envelope("s", "o-1"))
            .unwrap();
        hub.subscriber_count().await.unwrap();

        assert!(in_t.rx.try_recv().is_ok());
        assert!(storeless.rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_closes_queues() {
        let hub = start(HubConfig::default());
        let mut sub = hub.register(SubscriberScope::default()).unwrap();

        hub.shutdown().unwrap();

        assert!(sub.rx.recv().await.is_none());
        assert!(matches!(
            hub.subscriber_count().await,
            Err(HubError::ShuttingDown)
        ));
    }

    #[test]
    fn test_new_rejects_zero_capacity() {
        let result = BroadcastHub::new(HubConfig {
            queue_capacity: 0,
            ..HubConfig::default()
        });
        assert!(matches!(result, Err(HubError::InvalidConfig(_))));
    }
}
