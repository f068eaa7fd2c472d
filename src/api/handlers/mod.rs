//! HTTP request handlers.

pub mod push;

pub use push::{handle_panic, push_handler};
