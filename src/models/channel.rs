//! Channel models: the configured push destinations and transient requests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider kind tag selecting the adapter for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// DingTalk custom robot, plain text
    DingtalkText,
    /// Telegram bot `sendMessage`
    TelegramText,
    /// WeCom application message in `mpnews` format
    WecomMpnews,
    /// WeCom group robot webhook, plain text
    WecomRobotText,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::DingtalkText,
        ProviderKind::TelegramText,
        ProviderKind::WecomMpnews,
        ProviderKind::WecomRobotText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DingtalkText => "dingtalk_text",
            ProviderKind::TelegramText => "telegram_text",
            ProviderKind::WecomMpnews => "wecom_mpnews",
            ProviderKind::WecomRobotText => "wecom_robot_text",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque provider settings, interpreted only by the matching adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(BTreeMap<String, String>);

impl ProviderConfig {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    /// Value for `key`, treating blank values as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProviderConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One configured push channel. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    name: String,
    kind: ProviderKind,
    config: ProviderConfig,
}

impl ChannelConfig {
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        config: impl Into<ProviderConfig>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            config: config.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl From<BTreeMap<String, String>> for ProviderConfig {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self::new(values)
    }
}

/// A single inbound push: the message and its optional title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushRequest {
    pub message: String,
    pub title: Option<String>,
}

impl PushRequest {
    /// Build from raw inbound parameters; a blank title counts as absent.
    pub fn new(message: impl Into<String>, title: Option<String>) -> Self {
        Self {
            message: message.into(),
            title: title.filter(|t| !t.trim().is_empty()),
        }
    }
}
