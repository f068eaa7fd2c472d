//! Command handlers for CLI operations

pub mod channels;
pub mod serve;

pub use channels::ChannelsCommandHandler;
pub use serve::ServeCommandHandler;
