#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod event;
pub mod poll;
pub mod quiz;
pub mod quote;
pub mod user;

pub use event::{Event, Search};
pub use poll::Poll;
pub use quiz::Question;
pub use quote::Quote;
pub use user::User;
