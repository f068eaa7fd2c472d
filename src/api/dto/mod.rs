//! Data Transfer Objects for API requests and responses.

mod push;

pub use push::{PushParams, PushResponse};
