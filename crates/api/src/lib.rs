#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod bot;
pub mod command;
pub mod config;
pub mod outbox;
pub mod router;
pub mod schedule;
pub mod session;
pub mod supervisor;
pub mod timer;

pub use bot::Bot;
pub use config::Config;
pub use outbox::{Message, Outbox};
