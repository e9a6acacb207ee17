//! Notification commands

mod read;

pub use read::MarkNotificationRead;
