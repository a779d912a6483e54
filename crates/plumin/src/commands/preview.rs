use crate::project::Project;
use colored::Colorize;

pub async fn handle(project: &Project) -> anyhow::Result<()> {
    let engine = project.engine().await?;
    println!(
        "Previewing {} ({}) on {}...",
        project.config.name.cyan(),
        project.config.stack.cyan(),
        engine.provider().display_name()
    );
    println!();

    let deployment = project.deployment()?;
    let plan = engine.preview(&deployment).await?;

    for action in &plan.actions {
        super::print_action(action);
    }
    println!();
    println!("Resources: {}", plan.summary());

    if !plan.has_changes {
        println!("{}", "✓ No changes".green());
    }

    let pending: Vec<String> = deployment
        .outputs()
        .into_iter()
        .map(|(name, state)| format!("{}: {}", name, state))
        .collect();
    if !pending.is_empty() {
        println!();
        println!("Outputs:");
        for line in pending {
            println!("  {}", line.dimmed());
        }
    }

    Ok(())
}
