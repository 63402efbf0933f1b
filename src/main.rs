use anyhow::Result;
use clap::{Parser, Subcommand};
use plantarch::app::engine::DiagramEngine;
use plantarch::server::{http, mcp::DiagramMcpServer, stdio};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plantarch")]
#[command(about = "Render PlantUML class and entity-relationship diagrams from a type universe", version)]
struct Cli {
    /// Type universe JSON written by an extractor
    #[arg(long, global = true, default_value = "universe.json")]
    universe: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one job JSON per stdin line until `exit`
    Serve,
    /// Serve the HTTP API
    Http {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
    /// Serve MCP tools over stdio
    Mcp,
    /// Render a single job file to stdout
    Render {
        #[arg(long)]
        job: PathBuf,
    },
    /// List the origin buckets of the universe
    Containers {
        #[arg(long)]
        project_dir: Option<String>,
        /// Directory whose classes form one module (repeatable)
        #[arg(long = "module-dir")]
        module_dirs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries diagrams (and MCP frames); logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = DiagramEngine::load_from_json(&cli.universe)?;

    match cli.command {
        Commands::Serve => stdio::serve_stdio(engine).await?,
        Commands::Http { addr } => http::serve(engine, addr).await?,
        Commands::Mcp => DiagramMcpServer::new(engine).serve_stdio().await?,
        Commands::Render { job } => plantarch::cli::render_job_file(&engine, &job)?,
        Commands::Containers {
            project_dir,
            module_dirs,
        } => plantarch::cli::list_containers(&engine, project_dir.as_deref(), &module_dirs)?,
    }
    Ok(())
}
