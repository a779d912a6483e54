use crate::project::Project;
use colored::Colorize;
use std::io::{BufRead, Write};

pub async fn handle(project: &Project, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm(project)? {
        println!("Cancelled");
        return Ok(());
    }

    let engine = project.engine().await?;
    println!(
        "Destroying {} ({}) on {}...",
        project.config.name.cyan(),
        project.config.stack.cyan(),
        engine.provider().display_name()
    );
    println!();

    let result = engine.destroy().await?;

    for done in &result.succeeded {
        println!("  {} {}", "✓".green(), done.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.logical_name,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    if !result.is_success() {
        return Err(anyhow::anyhow!(
            "{} resources could not be deleted",
            result.failed.len()
        ));
    }

    println!();
    if result.succeeded.is_empty() {
        println!("{}", "✓ Nothing to destroy".green());
    } else {
        println!(
            "{}",
            format!("✓ Destroyed {} resources", result.succeeded.len())
                .green()
                .bold()
        );
    }
    Ok(())
}

fn confirm(project: &Project) -> anyhow::Result<bool> {
    print!(
        "Delete every resource of {} ({})? [y/N] ",
        project.config.name, project.config.stack
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
