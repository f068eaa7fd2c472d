//! Domain models shared by configuration, routing and dispatch.

mod channel;

pub use channel::{ChannelConfig, ProviderConfig, ProviderKind, PushRequest};
