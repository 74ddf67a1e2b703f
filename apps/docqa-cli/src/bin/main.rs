use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use docqa_cli::{ask, cancel_on_ctrl_c, chat_loop, ingest, init_tracing, load_config, print_status};
use docqa_rag::Pipeline;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a local document collection")]
#[command(version)]
struct Cli {
    /// Base configuration file; `config.<RUST_ENV>.toml` next to it is merged on top
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the source directory
    Ingest {
        /// Overrides `data.source_dir`
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// Interactive question answering
    Chat,
    /// Answer a single question
    Ask { question: String },
    /// Show what the persisted index contains
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Commands::Ingest { source: Some(source) } = &cli.command {
        config.data.source_dir = source.to_string_lossy().to_string();
    }
    let mut pipeline = match cli.command {
        Commands::Ingest { .. } => Pipeline::rebuilding(config)?,
        _ => Pipeline::from_config(config)?,
    };

    match cli.command {
        Commands::Ingest { .. } => {
            ingest(&mut pipeline).await?;
        }
        Commands::Chat => {
            if pipeline.status().passages == 0 {
                eprintln!("The index is empty; run `docqa ingest` first.");
            }
            let engine = pipeline.engine()?;
            let cancel = cancel_on_ctrl_c();
            let stdin = BufReader::new(tokio::io::stdin());
            chat_loop(&engine, stdin, &mut std::io::stdout(), &cancel).await?;
        }
        Commands::Ask { question } => {
            let engine = pipeline.engine()?;
            let cancel = cancel_on_ctrl_c();
            ask(&engine, &question, &cancel, &mut std::io::stdout()).await?;
        }
        Commands::Status => print_status(&pipeline.status()),
    }
    Ok(())
}
