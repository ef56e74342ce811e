//! Command dispatch: bridges CLI args -> controller operations -> output.

pub mod adapters;
pub mod config_cmd;
pub mod operator;
pub mod status;
pub mod util;
pub mod watch;

use meshwatch_core::{Controller, ControllerConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Tune the controller configuration for the command about to run.
///
/// Only `watch` keeps the subscription and poll task; everything else is
/// a single request/response.
pub fn configure_for(cmd: &Command, config: &mut ControllerConfig) {
    if let Command::Watch(args) = cmd {
        watch::configure(args, config);
    } else {
        config.websocket_enabled = false;
        config.poll_interval_secs = 0;
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, global).await,
        Command::Adapters => adapters::handle(controller, global).await,
        Command::Operator(args) => operator::handle(controller, args, global).await,
        Command::Watch(_) => watch::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
