//! `meshwatch adapters`: list adapters registered with the server.

use tabled::Tabled;

use meshwatch_core::{Adapter, Controller, selectors};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct AdapterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn text(adapter: &Adapter, key: &str) -> String {
    adapter.field(key).unwrap_or("-").to_owned()
}

fn to_row(adapter: &Adapter) -> AdapterRow {
    AdapterRow {
        name: text(adapter, "name"),
        location: text(adapter, "adapter_location"),
        version: text(adapter, "version"),
    }
}

/// Plain output is one adapter location per line.
fn location(adapter: &Adapter) -> String {
    adapter
        .field("adapter_location")
        .or_else(|| adapter.field("name"))
        .map_or_else(|| adapter.raw().to_string(), str::to_owned)
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.fetch_available_adapters().await?;

    let state = controller.state();
    let out = output::render_list(global.output, selectors::adapters(&state), to_row, location);
    output::print_output(&out, global.quiet);
    Ok(())
}
