pub mod operation;
pub mod policy;
pub mod server;

use clc_v2::QueuedOperation;
use colored::Colorize;

/// Print the per-server answers of an operation request
pub fn print_queued(operations: &[QueuedOperation]) {
    for op in operations {
        if op.is_queued {
            let status = op.status_id().unwrap_or("-");
            println!("  {} {} (status: {})", "✓".green(), op.server.cyan(), status);
        } else {
            let reason = op.error_message.as_deref().unwrap_or("not queued");
            println!("  {} {}: {}", "✗".red(), op.server.cyan(), reason.red());
        }
    }
}
