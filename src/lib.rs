//! Mailpager — POP3-to-SMS bridge with emergency routing.

pub mod config;
pub mod error;
pub mod mailbox;
pub mod notifier;
pub mod poller;
pub mod routing;
