pub mod destroy;
pub mod output;
pub mod preview;
pub mod up;

use colored::Colorize;
use plumin_cloud::{Action, ActionType};

/// One plan line, prefixed like a diff
pub(crate) fn print_action(action: &Action) {
    let line = format!(
        "{} ({})",
        action.logical_name,
        action.kind.type_token()
    );
    match action.action_type {
        ActionType::Create => println!("  {} {}", "+".green().bold(), line.green()),
        ActionType::Update => println!("  {} {}", "~".yellow().bold(), line.yellow()),
        ActionType::Delete => println!("  {} {}", "-".red().bold(), line.red()),
        ActionType::NoOp => println!("    {}", line.dimmed()),
    }
}
