//! Line-oriented request loop: one job JSON per line in, one diagram document per line out.

use crate::app::engine::DiagramEngine;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::spawn_blocking;
use tracing::{info, warn};

const READY: &str = "'Ready";
const SHUTTING_DOWN: &str = "'Shutting down";

/// Serve jobs on stdin/stdout until `exit` or end of input.
pub async fn serve_stdio(engine: DiagramEngine) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    serve_lines(engine, reader, tokio::io::stdout()).await
}

/// Prompt with `'Ready` before every request. Malformed or failing requests are answered with a
/// `' error: ...` comment line and the loop continues.
pub async fn serve_lines<R, W>(engine: DiagramEngine, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        write_line(&mut writer, READY).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let request = line.trim().to_string();
        if request.is_empty() {
            continue;
        }
        if request.eq_ignore_ascii_case("exit") {
            write_line(&mut writer, SHUTTING_DOWN).await?;
            break;
        }

        let engine = engine.clone();
        let reply = match spawn_blocking(move || engine.render_line(&request)).await {
            Ok(Ok(diagram)) => {
                info!(bytes = diagram.len(), "Answered render request");
                diagram
            }
            Ok(Err(e)) => {
                warn!(error = %format!("{e:#}"), "Render request failed");
                format!("' error: {e:#}")
            }
            Err(e) => format!("' error: task join error: {e}"),
        };
        write_line(&mut writer, &reply).await?;
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
