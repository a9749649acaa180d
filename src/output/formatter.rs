use colored::Colorize;

use crate::config::types::FdwConfig;
use crate::engine::connection;
use crate::engine::ApplySummary;

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

/// Print an error message.
pub fn print_error(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg.red());
}

/// Print the configured targets with their databases and resolved endpoints.
pub fn print_targets(config: &FdwConfig) {
    println!();
    println!("{}", "Targets".bold());
    println!("{}", "─".repeat(60));
    for target in &config.targets {
        let endpoint = match connection::resolve(&target.connection) {
            Ok(endpoint) => endpoint.to_string(),
            Err(e) => format!("{}", e).red().to_string(),
        };
        println!(
            "  {} {} - {} - {}",
            target.id.bold(),
            target.client,
            target.fdw_type.cyan(),
            endpoint
        );
        for db in &target.databases {
            println!("      {} [{}]", db.name, db.schemas.join(", ").dimmed());
        }
    }
    println!("{}", "─".repeat(60));
}

/// Print the outcome of an engine call, notices first.
pub fn print_summary(summary: &ApplySummary) {
    if !summary.notices.is_empty() {
        println!();
        for notice in &summary.notices {
            println!("  {} {}", "NOTICE".yellow().bold(), notice);
        }
    }
    println!();
    if summary.roles_processed == 0 {
        println!(
            "{}",
            "No enabled role matches the selected schemas. Nothing to do.".dimmed()
        );
        return;
    }
    print_success(&summary.to_string());
}
