//! # Subscriber Session
//!
//! Bridges one live WebSocket to the hub.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SubscriberSession::run                         │
//! │                                                                         │
//! │   hub queue ──► outbound loop ──► socket sink                           │
//! │                 • Text frame per queued message                         │
//! │                 • Ping every ping_interval                              │
//! │                 • queue closed ──► Close frame, stop                    │
//! │                 • write error  ──► stop                                 │
//! │                                                                         │
//! │   socket stream ──► inbound loop                                        │
//! │                 • client frames ignored                                 │
//! │                 • Close / error / EOF ──► stop                          │
//! │                                                                         │
//! │   whichever stops first ends the session ──► hub.unregister(id)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session never decides to drop itself for being slow. That call
//! belongs to the hub, which closes the queue.

use std::fmt::Display;
use std::pin::pin;
use std::time::Duration;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::hub::{HubHandle, Outbound, SubscriberId, Subscription};

/// One registered subscriber waiting to be attached to a transport.
pub struct SubscriberSession {
    hub: HubHandle,
    subscription: Subscription,
    ping_interval: Duration,
}

impl SubscriberSession {
    pub fn new(hub: HubHandle, subscription: Subscription) -> Self {
        let ping_interval = hub.config().ping_interval();
        SubscriberSession {
            hub,
            subscription,
            ping_interval,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.subscription.id
    }

    /// Runs both loops until either ends, then unregisters.
    pub async fn run<W, R, E>(self, sink: W, stream: R)
    where
        W: Sink<Message>,
        W::Error: Display,
        R: Stream<Item = Result<Message, E>>,
        E: Display,
    {
        let SubscriberSession {
            hub,
            subscription: Subscription { id, rx },
            ping_interval,
        } = self;

        info!(subscriber_id = %id, "Session started");

        tokio::select! {
            _ = outbound(id, rx, sink, ping_interval) => {}
            _ = inbound(id, stream) => {}
        }

        hub.unregister(id);
        info!(subscriber_id = %id, "Session ended");
    }
}

async fn outbound<W>(
    id: SubscriberId,
    mut rx: mpsc::Receiver<Outbound>,
    sink: W,
    ping_interval: Duration,
) where
    W: Sink<Message>,
    W::Error: Display,
{
    let mut sink = pin!(sink);
    let mut ping = interval_at(Instant::now() + ping_interval, ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Text(frame.to_string().into())).await {
                        warn!(subscriber_id = %id, error = %e, "Write failed - ending session");
                        return;
                    }
                }
                None => {
                    debug!(subscriber_id = %id, "Queue closed by hub - sending Close");
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
            },
            _ = ping.tick() => {
                if let Err(e) = sink.send(Message::Ping(axum::body::Bytes::new())).await {
                    warn!(subscriber_id = %id, error = %e, "Ping failed - ending session");
                    return;
                }
            }
        }
    }
}

async fn inbound<R, E>(id: SubscriberId, stream: R)
where
    R: Stream<Item = Result<Message, E>>,
    E: Display,
{
    let mut stream = pin!(stream);

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => {
                info!(subscriber_id = %id, "Client requested close");
                return;
            }
            Ok(_) => {
                // Pongs and stray client frames carry nothing for us.
            }
            Err(e) => {
                warn!(subscriber_id = %id, error = %e, "WebSocket error");
                return;
            }
        }
    }

    info!(subscriber_id = %id, "Client disconnected");
}
