use crate::PolicyCommands;
use clc_api::Session;
use clc_v2::AntiAffinity;
use colored::Colorize;

pub async fn handle(
    session: &Session,
    command: PolicyCommands,
    alias: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        PolicyCommands::List { location } => list(session, alias, location.as_deref()).await,
        PolicyCommands::Create { name, location } => {
            let policy = AntiAffinity::create(session, &name, alias, location.as_deref()).await?;
            println!(
                "{} Created policy {} ({}) in {}",
                "✓".green(),
                policy.name().cyan(),
                policy.id(),
                policy.location()
            );
            Ok(())
        }
        PolicyCommands::Rename { id, name } => {
            let mut policy = AntiAffinity::get(session, &id, alias).await?;
            let old_name = policy.name().to_string();
            policy.update(&name).await?;
            println!(
                "{} Renamed policy {}: {} → {}",
                "✓".green(),
                id,
                old_name.dimmed(),
                policy.name().cyan()
            );
            Ok(())
        }
        PolicyCommands::Delete { id } => {
            let policy = AntiAffinity::get(session, &id, alias).await?;
            let name = policy.name().to_string();
            policy.delete().await?;
            println!("{} Deleted policy {} ({})", "✓".green(), name.cyan(), id);
            Ok(())
        }
    }
}

async fn list(session: &Session, alias: Option<&str>, location: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "Fetching anti-affinity policies...".blue());
    let policies = AntiAffinity::get_all(session, alias, location).await?;

    println!();
    if policies.is_empty() {
        println!("{}", "No anti-affinity policies".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<36} {:<24} {:<8} {}", "ID", "NAME", "LOCATION", "SERVERS").bold()
    );
    println!("{}", "─".repeat(90).dimmed());
    for policy in &policies {
        let servers = if policy.servers().is_empty() {
            "-".dimmed().to_string()
        } else {
            policy.servers().join(", ")
        };
        println!(
            "{:<36} {:<24} {:<8} {}",
            policy.id(),
            policy.name().cyan(),
            policy.location(),
            servers
        );
    }

    Ok(())
}
