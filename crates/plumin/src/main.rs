mod commands;
mod program;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "plumin")]
#[command(about = "Declare a network in Rust. Preview it, apply it, read its outputs.", long_about = None)]
struct Cli {
    /// Stack name (overrides the project file)
    #[arg(short, long, global = true, env = "PLUMIN_STACK")]
    stack: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what `up` would change
    Preview,
    /// Create or update the declared resources
    Up,
    /// Delete every resource of the stack
    Destroy {
        /// Run without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show outputs recorded by the last `up`
    Output {
        /// Output name (all outputs when omitted)
        name: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    // stdout carries results, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let stack = cli.stack;

    match cli.command {
        Commands::Version => {
            println!("plumin {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Preview => commands::preview::handle(&load_project(stack)?).await?,
        Commands::Up => commands::up::handle(&load_project(stack)?).await?,
        Commands::Destroy { yes } => {
            commands::destroy::handle(&load_project(stack)?, yes).await?
        }
        Commands::Output { name, json } => {
            commands::output::handle(&load_project(stack)?, name.as_deref(), json).await?
        }
    }

    Ok(())
}

fn load_project(stack: Option<String>) -> anyhow::Result<project::Project> {
    let project = project::Project::discover(stack)?;
    tracing::debug!(
        "Project {} stack {} rooted at {}",
        project.config.name,
        project.config.stack,
        project.root.display()
    );
    Ok(project)
}
