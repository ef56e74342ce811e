//! `meshwatch status`: component connection status.

use serde::Serialize;
use tabled::Tabled;

use meshwatch_core::{ComponentStatus, ComponentsState, Controller, OperatorError, selectors};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// What `status` prints.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub operator: ComponentStatus,
    pub meshsync: ComponentStatus,
    pub broker: ComponentStatus,
    pub server: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_error: Option<OperatorError>,
}

impl StatusReport {
    pub fn from_state(state: &ComponentsState) -> Self {
        let error = selectors::operator_error(state);
        Self {
            operator: selectors::operator(state).clone(),
            meshsync: selectors::meshsync(state).clone(),
            broker: selectors::broker(state).clone(),
            server: selectors::server(state).clone(),
            operator_error: error.is_reported().then(|| error.clone()),
        }
    }

    fn components(&self) -> [(&'static str, &ComponentStatus); 4] {
        [
            ("operator", &self.operator),
            ("meshsync", &self.meshsync),
            ("broker", &self.broker),
            ("server", &self.server),
        ]
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Component")]
    component: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn detail(report: &StatusReport, color: bool) -> String {
    let rows: Vec<StatusRow> = report
        .components()
        .into_iter()
        .map(|(name, c)| StatusRow {
            component: name,
            status: output::paint_status(&c.connection_status, color),
            version: c.version.clone(),
        })
        .collect();
    let mut out = output::render_table(&rows);
    if let Some(ref err) = report.operator_error {
        out.push_str(&format!("\noperator error: {err}"));
    }
    out
}

fn plain(report: &StatusReport) -> String {
    report
        .components()
        .iter()
        .map(|(name, c)| format!("{name}\t{}\t{}", c.connection_status, c.version))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.fetch_components_status().await?;

    let report = StatusReport::from_state(&controller.state());
    let color = output::should_color(global.color);
    let out = output::render_single(global.output, &report, |r| detail(r, color), plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
