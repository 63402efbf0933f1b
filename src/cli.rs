use crate::app::dto::RenderJob;
use crate::app::engine::DiagramEngine;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Render the job stored in `job_path` and print the diagram to stdout.
pub fn render_job_file(engine: &DiagramEngine, job_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(job_path)
        .with_context(|| format!("Failed to read job file: {}", job_path.display()))?;
    let job: RenderJob = serde_json::from_str(&content).context("Failed to parse job JSON")?;
    let response = engine.render(&job)?;
    println!("{}", response.diagram);
    Ok(())
}

/// Print every origin bucket of the universe with its member count.
pub fn list_containers(
    engine: &DiagramEngine,
    project_dir: Option<&str>,
    module_dirs: &[String],
) -> Result<()> {
    let health = engine.health()?;
    let containers = engine.containers(project_dir, module_dirs)?;

    println!(
        "{} types in {} containers ({})",
        health.type_count,
        containers.len(),
        health.universe_path
    );
    println!("{}", "=".repeat(60));
    for c in &containers {
        let flag = if c.hidden { " (hidden)" } else { "" };
        println!("  {:<40} {:>6}{}", c.name, c.member_count, flag);
    }
    Ok(())
}
