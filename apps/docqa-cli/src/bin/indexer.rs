use std::path::PathBuf;

use clap::Parser;

use docqa_cli::{ingest, init_tracing, load_config, print_status};
use docqa_rag::Pipeline;

/// Build the passage index from a directory of text files
#[derive(Parser)]
#[command(name = "docqa-indexer")]
#[command(version)]
struct Args {
    /// Source directory; defaults to `data.source_dir`
    data_dir: Option<PathBuf>,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = &args.data_dir {
        config.data.source_dir = dir.to_string_lossy().to_string();
    }
    if args.quiet {
        config.ingest.progress = false;
    }

    println!("Source: {}", config.data.source_dir);
    let mut pipeline = Pipeline::rebuilding(config)?;
    ingest(&mut pipeline).await?;
    print_status(&pipeline.status());
    Ok(())
}
