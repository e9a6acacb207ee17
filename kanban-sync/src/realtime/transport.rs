//! Realtime transport seam and subscription handles

use super::channel::Channel;
use super::event::{EventName, RealtimeEvent};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// A pub/sub bus carrying realtime events.
///
/// Delivery is best-effort: no ordering or exactly-once guarantee, no replay for
/// subscribers that were not connected.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an event to the current subscribers of its channel, returning how many
    /// received it
    async fn publish(&self, event: RealtimeEvent) -> Result<usize>;

    async fn subscribe(&self, channel: &Channel) -> Result<Subscription>;

    async fn unsubscribe(&self, subscription: Subscription) -> Result<()>;
}

/// What a subscription yields next
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(RealtimeEvent),
    /// The subscriber fell behind and this many events were dropped unseen
    Lagged(u64),
}

/// Handle on one channel subscription.
///
/// Only events whose names are bound are delivered; everything else on the channel
/// is skipped. Dropping the handle (or passing it to
/// [`Transport::unsubscribe`]) ends the subscription.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    channel: Channel,
    receiver: broadcast::Receiver<RealtimeEvent>,
    bound: HashSet<EventName>,
}

impl Subscription {
    pub fn new(channel: Channel, receiver: broadcast::Receiver<RealtimeEvent>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            channel,
            receiver,
            bound: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Start delivering an event name; it must belong to the channel's family
    pub fn bind(&mut self, event: EventName) -> Result<()> {
        if event.family() != self.channel.family {
            return Err(SyncError::validation(format!(
                "cannot bind '{}' on channel '{}'",
                event, self.channel
            )));
        }
        self.bound.insert(event);
        Ok(())
    }

    /// Stop delivering an event name; returns whether it was bound
    pub fn unbind(&mut self, event: EventName) -> bool {
        self.bound.remove(&event)
    }

    pub fn is_bound(&self, event: EventName) -> bool {
        self.bound.contains(&event)
    }

    pub fn bound(&self) -> Vec<EventName> {
        self.bound.iter().copied().collect()
    }

    /// Wait for the next bound event or a report of dropped events; `None` once
    /// the transport closed the channel
    pub async fn deliver(&mut self) -> Option<Delivery> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.bound.contains(&event.event()) => {
                    return Some(Delivery::Event(event))
                }
                Ok(event) => {
                    tracing::trace!(channel = %self.channel, event = %event.event(), "skipping unbound event");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %self.channel, skipped, "subscriber lagged, events dropped");
                    return Some(Delivery::Lagged(skipped));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the next bound event, passing over lag reports
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        loop {
            match self.deliver().await? {
                Delivery::Event(event) => return Some(event),
                Delivery::Lagged(_) => continue,
            }
        }
    }

    /// Next bound event if one is already queued.
    ///
    /// Fails with `Transport` once the channel is closed.
    pub fn try_recv(&mut self) -> Result<Option<RealtimeEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.bound.contains(&event.event()) => return Ok(Some(event)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %self.channel, skipped, "subscriber lagged, events dropped");
                }
                Err(TryRecvError::Closed) => {
                    return Err(SyncError::transport(format!(
                        "channel '{}' closed",
                        self.channel
                    )))
                }
            }
        }
    }
}
