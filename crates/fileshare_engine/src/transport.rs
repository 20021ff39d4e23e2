use std::future::Future;
use std::io;
use std::sync::Arc;

use bytes::Bytes;
use fileshare_core::{TaskId, TaskPatch, TaskStateStore};
use fileshare_logging::{share_debug, share_trace};
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;

use crate::{
    ApiResponse, FailureKind, FileSource, FileStoreClient, ProgressMode, UploadFile,
    UploadOutcome,
};

/// Percent reported by the coarse adapter while a transfer is in flight.
pub const COARSE_IN_FLIGHT_PERCENT: u8 = 50;

/// Receives upload progress in whole percent.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Writes progress straight into the task's store record.
pub struct StoreProgressSink {
    store: TaskStateStore,
    id: TaskId,
}

impl StoreProgressSink {
    pub fn new(store: TaskStateStore, id: TaskId) -> Self {
        Self { store, id }
    }
}

impl ProgressSink for StoreProgressSink {
    fn report(&self, percent: u8) {
        if let Err(err) = self.store.update(self.id, TaskPatch::progress(percent)) {
            share_debug!("dropping progress {}% for task {}: {}", percent, self.id, err);
        }
    }
}

/// Performs one file upload. Implementations never fail past this call:
/// every error, including an expired `deadline`, resolves to
/// `UploadOutcome::Failed`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: &dyn ProgressSink,
        deadline: Instant,
    ) -> UploadOutcome;
}

/// Runs `transfer` until `deadline`. On expiry the transfer future is
/// dropped, which aborts the in-flight request.
pub async fn enforce_deadline<F>(deadline: Instant, transfer: F) -> UploadOutcome
where
    F: Future<Output = UploadOutcome>,
{
    match tokio::time::timeout_at(deadline, transfer).await {
        Ok(outcome) => outcome,
        Err(_) => UploadOutcome::Failed(FailureKind::Timeout),
    }
}

pub fn build_transport(
    mode: ProgressMode,
    client: FileStoreClient,
    chunk_size: usize,
) -> Arc<dyn Transport> {
    match mode {
        ProgressMode::Coarse => Arc::new(CoarseTransport::new(client)),
        ProgressMode::Streaming => Arc::new(StreamingTransport::new(client, chunk_size)),
    }
}

/// Reports a fixed midpoint while in flight and 100 on completion.
#[derive(Debug, Clone)]
pub struct CoarseTransport {
    client: FileStoreClient,
}

impl CoarseTransport {
    pub fn new(client: FileStoreClient) -> Self {
        Self { client }
    }

    async fn transfer(&self, file: &UploadFile, progress: &dyn ProgressSink) -> UploadOutcome {
        let data = match &file.source {
            FileSource::Memory(bytes) => bytes.clone(),
            FileSource::Path(path) => match tokio::fs::read(path).await {
                Ok(data) => Bytes::from(data),
                Err(err) => {
                    share_debug!("cannot read {:?}: {}", path, err);
                    return UploadOutcome::Failed(FailureKind::Io);
                }
            },
        };
        let length = data.len() as u64;
        progress.report(COARSE_IN_FLIGHT_PERCENT);
        let part = Part::stream_with_length(Body::from(data), length).file_name(file.name.clone());
        send_upload(&self.client, part).await
    }
}

#[async_trait::async_trait]
impl Transport for CoarseTransport {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: &dyn ProgressSink,
        deadline: Instant,
    ) -> UploadOutcome {
        let outcome = enforce_deadline(deadline, self.transfer(file, progress)).await;
        if outcome.is_success() {
            progress.report(100);
        }
        outcome
    }
}

/// Reports the share of body bytes handed to the connection so far.
#[derive(Debug, Clone)]
pub struct StreamingTransport {
    client: FileStoreClient,
    chunk_size: usize,
}

impl StreamingTransport {
    pub fn new(client: FileStoreClient, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    async fn open(&self, source: &FileSource) -> io::Result<(u64, BoxStream<'static, io::Result<Bytes>>)> {
        match source {
            FileSource::Memory(bytes) => {
                let chunks: Vec<io::Result<Bytes>> = (0..bytes.len())
                    .step_by(self.chunk_size)
                    .map(|start| Ok(bytes.slice(start..(start + self.chunk_size).min(bytes.len()))))
                    .collect();
                Ok((bytes.len() as u64, stream::iter(chunks).boxed()))
            }
            FileSource::Path(path) => {
                let file = tokio::fs::File::open(path).await?;
                let length = file.metadata().await?.len();
                Ok((length, ReaderStream::with_capacity(file, self.chunk_size).boxed()))
            }
        }
    }

    async fn transfer(&self, file: &UploadFile, progress: &dyn ProgressSink) -> UploadOutcome {
        let (total, chunks) = match self.open(&file.source).await {
            Ok(opened) => opened,
            Err(err) => {
                share_debug!("cannot open {}: {}", file.name, err);
                return UploadOutcome::Failed(FailureKind::Io);
            }
        };
        progress.report(0);

        // The body stream must be 'static, so percentages travel back over a
        // channel and are relayed to the borrowed sink while the request runs.
        let (percent_tx, mut percent_rx) = mpsc::unbounded_channel::<u8>();
        let mut sent: u64 = 0;
        let counted = chunks.map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                let _ = percent_tx.send(percent_of(sent, total));
            }
            chunk
        });
        let part = Part::stream_with_length(Body::wrap_stream(counted), total)
            .file_name(file.name.clone());

        let upload = send_upload(&self.client, part);
        tokio::pin!(upload);
        let outcome = loop {
            tokio::select! {
                outcome = &mut upload => break outcome,
                Some(percent) = percent_rx.recv() => progress.report(percent),
            }
        };
        while let Ok(percent) = percent_rx.try_recv() {
            progress.report(percent);
        }
        outcome
    }
}

#[async_trait::async_trait]
impl Transport for StreamingTransport {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: &dyn ProgressSink,
        deadline: Instant,
    ) -> UploadOutcome {
        let outcome = enforce_deadline(deadline, self.transfer(file, progress)).await;
        if outcome.is_success() {
            progress.report(100);
        }
        outcome
    }
}

/// Whole percent of `sent` over `total`, kept below 100 until the server
/// has accepted the file.
fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (sent.saturating_mul(100) / total).min(99) as u8
}

async fn send_upload(client: &FileStoreClient, part: Part) -> UploadOutcome {
    let url = match client.endpoint(&["upload"]) {
        Ok(url) => url,
        Err(err) => return UploadOutcome::Failed(FailureKind::from(&err)),
    };
    let form = Form::new().part("file", part);
    let response = match client.http().post(url).multipart(form).send().await {
        Ok(response) => response,
        Err(err) => {
            share_trace!("upload request failed: {}", err);
            let kind = if err.is_timeout() {
                FailureKind::Timeout
            } else {
                FailureKind::Network
            };
            return UploadOutcome::Failed(kind);
        }
    };

    let status = response.status();
    if !status.is_success() {
        return UploadOutcome::Failed(FailureKind::HttpStatus(status.as_u16()));
    }
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(_) => return UploadOutcome::Failed(FailureKind::Network),
    };
    // A plain 2xx accepts the file; a JSON envelope can still refuse it.
    match serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body) {
        Ok(envelope) if !envelope.success => UploadOutcome::Failed(FailureKind::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "upload refused".to_string()),
        )),
        _ => UploadOutcome::Completed,
    }
}
