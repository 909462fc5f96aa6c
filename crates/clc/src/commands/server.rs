use crate::ServerCommands;
use crate::commands::print_queued;
use clc_api::Session;
use clc_v2::{Server, ServerOperation};
use colored::Colorize;

pub async fn handle(
    session: &Session,
    command: ServerCommands,
    alias: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        ServerCommands::Show { id } => {
            let server = Server::get(session, &id, alias).await?;
            show(&server).await
        }
        ServerCommands::Attr { id, field } => {
            let server = Server::get(session, &id, alias).await?;
            let value = server.attr(&field)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        ServerCommands::Power { id, action } => {
            let operation = ServerOperation::from(action);
            let server = Server::get(session, &id, alias).await?;
            println!("{} {} on {}...", "Queueing".blue(), operation, server.to_string().cyan());
            let queued = server.execute(operation).await?;
            print_queued(&queued);
            Ok(())
        }
        ServerCommands::Snapshot { id, days } => {
            let server = Server::get(session, &id, alias).await?;
            println!(
                "{} {} (kept {} days)...",
                "Creating snapshot of".blue(),
                server.to_string().cyan(),
                days
            );
            let queued = server.snapshot(Some(days)).await?;
            print_queued(&queued);
            Ok(())
        }
    }
}

async fn show(server: &Server) -> anyhow::Result<()> {
    let na = "N/A";

    println!("{}", server.to_string().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("  ID:          {}", server.id());
    println!("  Description: {}", server.description().unwrap_or(na));
    println!("  Location:    {}", server.location_id().unwrap_or(na));

    let status = server.status().unwrap_or(na);
    let status_colored = if status == "active" {
        status.green()
    } else {
        status.yellow()
    };
    println!("  Status:      {}", status_colored);

    let power = server.power_state().unwrap_or(na);
    let power_colored = if power == "started" {
        power.green()
    } else {
        power.red()
    };
    println!("  Power:       {}", power_colored);
    println!("  OS:          {}", server.os().unwrap_or(na));
    println!(
        "  CPU:         {}",
        server.cpu().map(|c| c.to_string()).unwrap_or_else(|| na.to_string())
    );
    println!(
        "  Memory:      {}",
        server
            .memory_mb()
            .map(|m| format!("{} MB", m))
            .unwrap_or_else(|| na.to_string())
    );
    println!(
        "  Storage:     {}",
        server
            .storage_gb()
            .map(|s| format!("{} GB", s))
            .unwrap_or_else(|| na.to_string())
    );
    if server.in_maintenance_mode() == Some(true) {
        println!("  {}", "In maintenance mode".yellow());
    }

    if let Ok(group) = server.group() {
        let data = group.get().await?;
        println!(
            "  Group:       {} ({})",
            data.name.as_deref().unwrap_or(na),
            group.id()
        );
    }

    Ok(())
}
