//! The whole push path: route, dispatch, report.

use std::sync::Arc;

use crate::models::PushRequest;
use crate::services::channel_store::ConfigStore;
use crate::services::error::PushError;
use crate::services::error_log::ErrorLog;
use crate::services::notifications::{DispatchOutcome, Dispatcher, ProviderRegistry};
use crate::services::reporter::{PushReply, ResponseReporter};
use crate::services::router::ChannelRouter;

#[derive(Clone)]
pub struct PushService {
    router: ChannelRouter,
    dispatcher: Dispatcher,
    reporter: ResponseReporter,
}

impl PushService {
    pub fn new(store: Arc<ConfigStore>, registry: ProviderRegistry, error_log: Arc<ErrorLog>) -> Self {
        Self {
            router: ChannelRouter::new(store),
            dispatcher: Dispatcher::new(registry),
            reporter: ResponseReporter::new(error_log),
        }
    }

    /// Handle one inbound push for `path`.
    ///
    /// Every failure is normalized into [`PushReply::NotFound`]; details go to
    /// the console and the error log only.
    pub async fn push(&self, path: &str, request: PushRequest) -> PushReply {
        let (channel, outcome) = match self.router.route(path) {
            Ok(channel) => (
                channel.name().to_string(),
                self.dispatcher.dispatch(channel, &request).await,
            ),
            Err(e) => (e.channel().to_string(), DispatchOutcome::from(PushError::from(e))),
        };

        self.reporter.report(&channel, &outcome, &request).await
    }
}
