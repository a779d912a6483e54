use crate::commands::up::display_value;
use crate::project::Project;
use colored::Colorize;

pub async fn handle(project: &Project, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let engine = project.engine().await?;
    let outputs = engine.outputs().await?;

    if let Some(name) = name {
        let value = outputs.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "output '{}' not found in stack {}",
                name,
                project.config.stack
            )
        })?;
        if json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", display_value(value));
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    if outputs.is_empty() {
        println!("{}", "No outputs. Run `plumin up` first.".yellow());
        return Ok(());
    }

    println!("Current stack outputs ({}):", outputs.len());
    for (name, value) in &outputs {
        println!("  {}: {}", name, display_value(value).cyan());
    }
    Ok(())
}
