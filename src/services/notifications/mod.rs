//! Push providers and the dispatcher selecting among them.
//!
//! The core trait `NotificationProvider` is implemented once per provider kind;
//! `ProviderRegistry` maps kinds to implementations and `Dispatcher` performs a
//! single send per request.

mod dingtalk_provider;
mod dispatcher;
mod provider;
mod registry;
mod telegram_provider;
mod wecom_mpnews_provider;
mod wecom_robot_provider;

pub use dingtalk_provider::DingTalkProvider;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use provider::{NotificationProvider, ProviderError};
pub use registry::ProviderRegistry;
pub use telegram_provider::TelegramProvider;
pub use wecom_mpnews_provider::WeComMpnewsProvider;
pub use wecom_robot_provider::WeComRobotProvider;
