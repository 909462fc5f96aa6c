use crate::OperationCommands;
use clc_api::Session;
use clc_v2::{OperationStatus, operation};
use colored::Colorize;

pub async fn handle(
    session: &Session,
    command: OperationCommands,
    alias: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        OperationCommands::Status { id } => {
            let status = operation::status(session, &id, alias).await?;
            let colored = match &status {
                OperationStatus::Succeeded => status.as_str().green(),
                OperationStatus::Failed => status.as_str().red(),
                OperationStatus::Unknown(_) => status.as_str().yellow(),
                _ => status.as_str().blue(),
            };
            println!("{}: {}", id, colored);
            Ok(())
        }
    }
}
