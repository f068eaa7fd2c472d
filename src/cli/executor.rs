//! Command executor for dispatching CLI commands

use super::handlers::{ChannelsCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Run the parsed command with the merged settings.
///
/// `serve` without `--dry-run` blocks until the server shuts down.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.resolved_command() {
        Commands::Serve { dry_run, .. } => ServeCommandHandler::new(settings).execute(dry_run).await,
        Commands::Channels => ChannelsCommandHandler::new(settings).execute(),
    }
}
