//! In-process transport built on tokio broadcast channels

use super::channel::Channel;
use super::event::RealtimeEvent;
use super::transport::{Subscription, Transport};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use dashmap::DashMap;
use kanban_sync_config::RealtimeConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// One broadcast channel per realtime channel, created on first subscribe.
///
/// [`LocalBus::disconnect`] simulates losing the connection: publishes and
/// subscribes fail with `Transport`, and every open subscription is closed.
/// Events published while disconnected are gone for good.
pub struct LocalBus {
    channels: DashMap<String, broadcast::Sender<RealtimeEvent>>,
    capacity: usize,
    connected: AtomicBool,
}

impl LocalBus {
    pub fn new(config: &RealtimeConfig) -> Self {
        Self::with_capacity(config.channel_capacity)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
            connected: AtomicBool::new(true),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Drop the connection and close every subscription
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.channels.clear();
        tracing::info!("realtime bus disconnected");
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("realtime bus reconnected");
    }

    /// Number of live subscriptions on a channel
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.channels
            .get(&channel.name())
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SyncError::transport("realtime bus is disconnected"))
        }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(&RealtimeConfig::default())
    }
}

#[async_trait]
impl Transport for LocalBus {
    async fn publish(&self, event: RealtimeEvent) -> Result<usize> {
        self.ensure_connected()?;
        let Some(sender) = self.channels.get(&event.channel().name()) else {
            return Ok(0);
        };
        // A send error only means nobody is listening right now
        Ok(sender.send(event).unwrap_or(0))
    }

    async fn subscribe(&self, channel: &Channel) -> Result<Subscription> {
        self.ensure_connected()?;
        let receiver = self
            .channels
            .entry(channel.name())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        tracing::debug!(channel = %channel, "subscribed");
        Ok(Subscription::new(channel.clone(), receiver))
    }

    async fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        let name = subscription.channel().name();
        drop(subscription);
        self.channels
            .remove_if(&name, |_, sender| sender.receiver_count() == 0);
        tracing::debug!(channel = %name, "unsubscribed");
        Ok(())
    }
}
