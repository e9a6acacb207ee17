//! Realtime fan-out: channels, typed events, transports and the commit publisher

mod channel;
mod event;
mod fanout;
mod local;
mod transport;

pub use channel::{Channel, ChannelFamily};
pub use event::{
    BoardEvent, CardEvent, ColumnEvent, EventName, EventPayload, InvitationEvent,
    MembershipEvent, NotificationEvent, RealtimeEvent,
};
pub use fanout::{CommittedWrite, FanoutBus};
pub use local::LocalBus;
pub use transport::{Delivery, Subscription, Transport};
