//! `meshwatch operator enable|disable`.

use serde::Serialize;

use meshwatch_core::{Controller, OperatorError, OperatorTargetStatus};

use crate::cli::{GlobalOpts, OperatorArgs, OperatorCommand};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ChangeResult {
    requested: OperatorTargetStatus,
    status: Option<String>,
}

fn target_for(command: OperatorCommand) -> OperatorTargetStatus {
    match command {
        OperatorCommand::Enable => OperatorTargetStatus::Enabled,
        OperatorCommand::Disable => OperatorTargetStatus::Disabled,
    }
}

pub async fn handle(
    controller: &Controller,
    args: OperatorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = target_for(args.command);

    if target == OperatorTargetStatus::Disabled
        && !super::util::confirm(
            "Disable the Meshery operator? MeshSync and the broker will stop.",
            "operator disable",
            global.yes,
        )?
    {
        return Ok(());
    }

    let response = controller.change_operator_state(target).await?;

    if let Some(error) = response
        .error
        .map(OperatorError::from)
        .filter(OperatorError::is_reported)
    {
        return Err(CliError::OperatorRejected {
            detail: error.to_string(),
        });
    }

    let result = ChangeResult {
        requested: target,
        status: response.status,
    };
    let out = output::render_single(
        global.output,
        &result,
        |r| {
            format!(
                "Operator change requested; server reports {}",
                r.status.as_deref().unwrap_or("no status")
            )
        },
        |r| r.status.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommands_map_to_targets() {
        assert_eq!(target_for(OperatorCommand::Enable), OperatorTargetStatus::Enabled);
        assert_eq!(target_for(OperatorCommand::Disable), OperatorTargetStatus::Disabled);
    }
}
