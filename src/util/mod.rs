//! Shared utilities: id generation and timestamp handling.

pub mod id;
pub mod time;
