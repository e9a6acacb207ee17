//! Invitation commands

mod accept;
mod invite;

pub use accept::AcceptInvitation;
pub use invite::InviteMember;
