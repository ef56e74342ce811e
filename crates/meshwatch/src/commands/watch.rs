//! `meshwatch watch`: follow component status until interrupted.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use meshwatch_core::{
    ComponentsState, ConnectionStatus, Controller, ControllerConfig, selectors,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Poll interval used when events are off and none was configured.
const FALLBACK_POLL_SECS: u64 = 10;

pub fn configure(args: &WatchArgs, config: &mut ControllerConfig) {
    if args.no_events {
        config.websocket_enabled = false;
    }
    if let Some(secs) = args.poll_interval {
        config.poll_interval_secs = secs;
    }
    if !config.websocket_enabled && config.poll_interval_secs == 0 {
        config.poll_interval_secs = FALLBACK_POLL_SECS;
    }
}

/// The part of the state a watcher cares about; a line is printed each
/// time it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Summary {
    operator: ConnectionStatus,
    meshsync: ConnectionStatus,
    broker: ConnectionStatus,
    live_events: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    operator_error: Option<String>,
}

impl Summary {
    fn of(state: &ComponentsState) -> Self {
        let error = selectors::operator_error(state);
        Self {
            operator: selectors::operator(state).connection_status.clone(),
            meshsync: selectors::meshsync(state).connection_status.clone(),
            broker: selectors::broker(state).connection_status.clone(),
            live_events: selectors::subscription(state).initialised,
            operator_error: error.is_reported().then(|| error.to_string()),
        }
    }

    fn line(&self, format: OutputFormat, color: bool) -> String {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        match format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let mut value = serde_json::json!({ "time": ts });
                if let (Some(obj), Ok(serde_json::Value::Object(fields))) =
                    (value.as_object_mut(), serde_json::to_value(self))
                {
                    obj.extend(fields);
                }
                value.to_string()
            }
            _ => {
                let mut line = format!(
                    "{ts}  operator={}  meshsync={}  broker={}  [{}]",
                    output::paint_status(&self.operator, color),
                    output::paint_status(&self.meshsync, color),
                    output::paint_status(&self.broker, color),
                    if self.live_events { "events" } else { "polling" },
                );
                if let Some(ref err) = self.operator_error {
                    line.push_str("  error=");
                    line.push_str(err);
                }
                line
            }
        }
    }
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let mut states = controller.subscribe_state();
    controller.start().await?;

    let color = output::should_color(global.color);
    let mut last = Summary::of(&controller.state());
    output::print_output(&last.line(global.output, color), global.quiet);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            snap = states.changed() => {
                let Some(snap) = snap else { break };
                let next = Summary::of(&snap);
                if next != last {
                    output::print_output(&next.line(global.output, color), global.quiet);
                    last = next;
                }
            }
        }
    }
    Ok(())
}
