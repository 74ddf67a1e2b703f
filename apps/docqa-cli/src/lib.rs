//! Shared plumbing for the `docqa` and `docqa-indexer` binaries.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing_subscriber::EnvFilter;

use docqa_core::config::{AppConfig, Config};
use docqa_core::Error;
use docqa_rag::{BuildReport, CancellationToken, GroundedChatEngine, IndexStatus, Pipeline};

pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong answering that. Please try again.";

/// Logs go to stderr so answers on stdout stay clean. `RUST_LOG` overrides
/// the default `docqa=info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docqa=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load_file(&path)
        .and_then(|c| c.app())
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    Ok(config)
}

pub async fn ingest(pipeline: &mut Pipeline) -> anyhow::Result<BuildReport> {
    let report = pipeline.ingest().await.context("ingest failed")?;
    println!(
        "Indexed {} documents ({} passages), skipped {}",
        report.documents,
        report.passages,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.doc_id, skipped.reason);
    }
    Ok(report)
}

pub fn print_status(status: &IndexStatus) {
    println!("Index:     {}", status.location);
    println!("Embedder:  {}", status.spec.embedder_id);
    println!("Metric:    {} ({} dims)", status.spec.metric, status.spec.dimension);
    println!("Documents: {}", status.documents);
    println!("Passages:  {}", status.passages);
}

/// Cancels the returned token on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

/// Answer one question and write the rendered reply to `out`.
pub async fn ask<W: Write>(
    engine: &GroundedChatEngine,
    query: &str,
    cancel: &CancellationToken,
    out: &mut W,
) -> anyhow::Result<()> {
    let turn = engine.chat(query, cancel).await?;
    writeln!(out, "{}", turn.render(engine.config()))?;
    Ok(())
}

/// Read queries line by line until EOF, `/quit` or cancellation.
///
/// A failed turn prints [`FAILURE_MESSAGE`] and the loop carries on.
pub async fn chat_loop<R, W>(
    engine: &GroundedChatEngine,
    input: R,
    out: &mut W,
    cancel: &CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "Query: ")?;
        out.flush()?;

        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            writeln!(out)?;
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "/quit" {
            break;
        }

        match engine.chat(query, cancel).await {
            Ok(turn) => writeln!(out, "{}", turn.render(engine.config()))?,
            Err(Error::Cancelled) => break,
            Err(e) => {
                tracing::error!(error = %e, "chat turn failed");
                writeln!(out, "{FAILURE_MESSAGE}")?;
            }
        }
    }
    Ok(())
}
