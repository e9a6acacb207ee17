//! Server-side publisher for committed writes

use super::channel::Channel;
use super::event::{EventName, EventPayload, RealtimeEvent};
use super::transport::Transport;
use crate::error::Result;
use crate::logging::Pretty;
use std::sync::Arc;

/// Proof that a write committed, carrying the event that announces it.
///
/// Only the authority's commit path can build one, and [`FanoutBus::announce`]
/// consumes it, so each commit is announced at most once.
#[derive(Debug)]
pub struct CommittedWrite {
    channel: Channel,
    event: EventName,
    payload: EventPayload,
}

impl CommittedWrite {
    pub(crate) fn new(channel: Channel, event: EventName, payload: EventPayload) -> Self {
        Self {
            channel,
            event,
            payload,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn event(&self) -> EventName {
        self.event
    }
}

/// Broadcasts committed mutations to every subscriber of the entity's channel
#[derive(Clone)]
pub struct FanoutBus {
    transport: Arc<dyn Transport>,
}

impl FanoutBus {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send one event over the transport
    pub async fn publish(
        &self,
        channel: Channel,
        event: EventName,
        payload: EventPayload,
    ) -> Result<usize> {
        let event = RealtimeEvent::new(channel, event, payload)?;
        tracing::debug!(channel = %event.channel(), event = %event.event(), "publishing {}", Pretty(&event));
        self.transport.publish(event).await
    }

    /// Announce a committed write.
    ///
    /// Best-effort: a failure is logged and swallowed since the commit already
    /// stands. Returns how many subscribers received the event.
    pub async fn announce(&self, write: CommittedWrite) -> usize {
        let CommittedWrite {
            channel,
            event,
            payload,
        } = write;
        let name = channel.name();
        match self.publish(channel, event, payload).await {
            Ok(delivered) => {
                tracing::info!(channel = %name, %event, delivered, "announced commit");
                delivered
            }
            Err(error) => {
                tracing::warn!(channel = %name, %event, %error, "failed to publish committed write");
                0
            }
        }
    }
}
