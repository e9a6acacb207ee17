//! Per-client subscriber

use super::origin::is_external;
use super::targets::invalidation_targets;
use crate::authority::Authority;
use crate::cache::{CacheKey, QueryCache, Refetcher};
use crate::error::Result;
use crate::realtime::{Channel, Delivery, EventName, RealtimeEvent, Subscription, Transport};
use crate::types::ActorId;
use kanban_sync_config::SyncConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Unsubscribed,
    Subscribed(Channel),
}

/// What handling one event did to the cache
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// The local actor caused the event; nothing was touched
    Suppressed,
    Refreshed {
        invalidated: Vec<CacheKey>,
        refetched: usize,
    },
    /// Events were dropped unseen; every cached view of the channel's kind was
    /// invalidated
    Resynced {
        skipped: u64,
        invalidated: Vec<CacheKey>,
        refetched: usize,
    },
}

/// Keeps one actor's cache in step with a realtime channel
pub struct SyncClient {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
    refetcher: Refetcher,
    actor: ActorId,
    refetch: bool,
    subscription: Option<Subscription>,
}

impl SyncClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        authority: Arc<dyn Authority>,
        cache: Arc<QueryCache>,
        actor: ActorId,
        config: &SyncConfig,
    ) -> Self {
        Self {
            refetcher: Refetcher::new(authority, cache.clone(), actor.clone()),
            transport,
            cache,
            actor,
            refetch: config.client.refetch_on_invalidate,
            subscription: None,
        }
    }

    pub fn state(&self) -> SyncState {
        match &self.subscription {
            Some(subscription) => SyncState::Subscribed(subscription.channel().clone()),
            None => SyncState::Unsubscribed,
        }
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Subscribe to a channel and bind every event of its family.
    ///
    /// Subscribing to the current channel again is a no-op; another channel
    /// replaces the current subscription.
    pub async fn subscribe(&mut self, channel: Channel) -> Result<()> {
        if let Some(current) = &self.subscription {
            if current.channel() == &channel {
                return Ok(());
            }
            self.teardown().await?;
        }

        let mut subscription = self.transport.subscribe(&channel).await?;
        for event in EventName::all_for(channel.family) {
            subscription.bind(event)?;
        }
        tracing::debug!(%channel, actor = %self.actor, "subscribed");
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Unbind every bound event, then unsubscribe
    pub async fn teardown(&mut self) -> Result<()> {
        let Some(mut subscription) = self.subscription.take() else {
            return Ok(());
        };
        for event in subscription.bound() {
            subscription.unbind(event);
        }
        let channel = subscription.channel().clone();
        self.transport.unsubscribe(subscription).await?;
        tracing::debug!(%channel, actor = %self.actor, "unsubscribed");
        Ok(())
    }

    /// React to one event: suppress it if it is ours, otherwise invalidate and
    /// (when configured) refetch the views it affects
    pub async fn handle(&self, event: &RealtimeEvent) -> Result<SyncAction> {
        if !is_external(event, &self.actor) {
            tracing::trace!(event = %event.event(), actor = %self.actor, "suppressing own event");
            return Ok(SyncAction::Suppressed);
        }

        let invalidated = invalidation_targets(event, &self.actor);
        let refetched = self.invalidate_all(&invalidated).await?;

        tracing::debug!(
            event = %event.event(),
            from = %event.actor(),
            invalidated = invalidated.len(),
            refetched,
            "applied external event"
        );
        Ok(SyncAction::Refreshed {
            invalidated,
            refetched,
        })
    }

    /// Recover from dropped events by invalidating every cached view of the
    /// channel's entity kind
    pub async fn resync(&self, channel: &Channel, skipped: u64) -> Result<SyncAction> {
        let invalidated = self.cache.keys_of(channel.family.kind());
        let refetched = self.invalidate_all(&invalidated).await?;
        tracing::info!(%channel, skipped, invalidated = invalidated.len(), "resynced after lag");
        Ok(SyncAction::Resynced {
            skipped,
            invalidated,
            refetched,
        })
    }

    async fn invalidate_all(&self, keys: &[CacheKey]) -> Result<usize> {
        for key in keys {
            self.cache.invalidate(key);
        }
        if self.refetch {
            self.refetcher.refetch_all(keys).await
        } else {
            Ok(0)
        }
    }

    /// Wait for the next event and handle it.
    ///
    /// Returns `None` when unsubscribed or once the transport closed the channel;
    /// a closed channel leaves the client unsubscribed.
    pub async fn next(&mut self) -> Result<Option<SyncAction>> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(None);
        };
        match subscription.deliver().await {
            Some(Delivery::Event(event)) => self.handle(&event).await.map(Some),
            Some(Delivery::Lagged(skipped)) => {
                let channel = subscription.channel().clone();
                self.resync(&channel, skipped).await.map(Some)
            }
            None => {
                tracing::info!(channel = %subscription.channel(), "channel closed, resubscribe to resume");
                self.subscription = None;
                Ok(None)
            }
        }
    }

    /// Handle events until cancelled or the channel closes, returning how many
    /// were handled
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<usize> {
        let mut handled = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                action = self.next() => match action? {
                    Some(_) => handled += 1,
                    None => break,
                },
            }
        }
        Ok(handled)
    }
}
