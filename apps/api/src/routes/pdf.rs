//! PDF export: renders on a blocking worker and streams pages to the client.
//!
//! The render pass writes into a `ChannelSink`; each flushed page becomes one
//! body chunk. The handler waits for the first chunk before committing to a
//! 200, so a sink that fails at once still yields a JSON error. A failure after
//! that point is sent down the stream as an error, which aborts the response
//! instead of ending it as if the file were complete.

use std::io::{self, Write};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{error, info};

use crate::errors::AppError;
use crate::render::{render, RenderError, Template};
use crate::routes::parse_resume_id;
use crate::state::AppState;

/// Chunks in flight between the render worker and the response body.
const CHANNEL_DEPTH: usize = 4;
/// Buffered bytes that force a send even without a flush.
const MAX_CHUNK: usize = 64 * 1024;

type Chunk = Result<Bytes, io::Error>;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub template: Option<String>,
}

/// GET /api/pdf/:id?template=classic|modern
/// GET /documents/:id?template=classic|modern
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let id = parse_resume_id(&id)?;
    let record = state
        .store
        .fetch_by_id(id)
        .await?
        .ok_or_else(AppError::resume_not_found)?;
    let template = Template::from_query(query.template.as_deref());
    let disposition = format!(
        "attachment; filename={}",
        attachment_filename(&record.name)
    );

    info!(resume_id = %id, template = template.as_str(), "exporting resume PDF");

    let (tx, mut rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
    let worker = tokio::task::spawn_blocking(move || {
        let sink = ChannelSink::new(tx.clone());
        if let Err(e) = render(&record, template, sink) {
            error!(resume_id = %record.id, "render failed: {e}");
            // Receiver may already be gone; nothing left to report to.
            let _ = tx.blocking_send(Err(io::Error::other(e.to_string())));
        }
    });

    let first = match rx.recv().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(e)) => return Err(AppError::Render(RenderError::Io(e))),
        None => {
            worker.await.map_err(|e| {
                AppError::Internal(anyhow::anyhow!("render worker failed: {e}"))
            })?;
            return Err(AppError::Internal(anyhow::anyhow!(
                "render worker produced no output"
            )));
        }
    };

    Response::builder()
        .header(CONTENT_TYPE, "application/pdf")
        .header(CONTENT_DISPOSITION, disposition)
        .body(streaming_body(first, rx))
        .map_err(|e| AppError::Internal(e.into()))
}

/// Response body yielding `first` and then whatever the render worker sends.
/// An `Err` chunk ends the body with an error, so the client sees a broken
/// transfer rather than a short file.
fn streaming_body(first: Bytes, rx: mpsc::Receiver<Chunk>) -> Body {
    let stream = tokio_stream::once(Ok::<Bytes, io::Error>(first)).chain(ReceiverStream::new(rx));
    Body::from_stream(stream)
}

/// `{name}_resume.pdf` with everything outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn attachment_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_resume.pdf")
}

// ────────────────────────────────────────────────────────────────────────────
// Channel sink
// ────────────────────────────────────────────────────────────────────────────

/// `io::Write` adapter that forwards buffered bytes to an async channel.
///
/// Must be used from a blocking context: sends block when the channel is full,
/// which is how a slow client throttles the render.
pub struct ChannelSink {
    tx: mpsc::Sender<Chunk>,
    buf: Vec<u8>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Chunk>) -> Self {
        Self { tx, buf: Vec::new() }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::take(&mut self.buf));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }
}

impl Write for ChannelSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= MAX_CHUNK {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}
