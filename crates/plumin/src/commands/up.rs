use crate::project::Project;
use colored::Colorize;

pub async fn handle(project: &Project) -> anyhow::Result<()> {
    let engine = project.engine().await?;
    println!(
        "Updating {} ({}) on {}...",
        project.config.name.cyan(),
        project.config.stack.cyan(),
        engine.provider().display_name()
    );
    println!();

    let deployment = project.deployment()?;
    let result = engine.up(deployment).await?;

    for done in &result.apply.succeeded {
        println!("  {} {}", "✓".green(), done.message);
    }
    for failed in &result.apply.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.logical_name,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    println!("Resources: {}", result.summary);

    if !result.outputs.is_empty() || !result.failed_outputs.is_empty() {
        println!();
        println!("Outputs:");
        for (name, value) in &result.outputs {
            println!("  {}: {}", name, display_value(value).cyan());
        }
        for (name, reason) in &result.failed_outputs {
            println!("  {}: {}", name, reason.red());
        }
    }

    if result.is_success() {
        println!();
        println!(
            "{} ({}ms)",
            "✓ Update complete".green().bold(),
            result.apply.duration_ms
        );
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "update incomplete: {} actions failed, {} outputs unresolved",
            result.apply.failed.len(),
            result.failed_outputs.len()
        ))
    }
}

/// Strings without quotes, everything else as JSON
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
