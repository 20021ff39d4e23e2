use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use fileshare_core::{PlatformProfile, SessionSummary, TaskStateStore};
use fileshare_logging::{share_error, share_info, share_warn};
use tokio::sync::{mpsc as async_mpsc, Mutex};

use crate::{
    build_transport, local_file_name, session_profile, ApiError, AtomicFileWriter,
    ClientSettings, FileEntry, FileStoreClient, Transport, UploadFile, UploadScheduler,
};

const FALLBACK_ARCHIVE_NAME: &str = "download.zip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Upload { files: Vec<UploadFile> },
    List,
    Download { names: Vec<String>, dir: PathBuf },
    DownloadArchive { names: Vec<String>, dir: PathBuf },
    Delete { names: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Listed(Result<Vec<FileEntry>, ApiError>),
    Downloaded {
        name: String,
        result: Result<PathBuf, ApiError>,
    },
    Deleted {
        name: String,
        result: Result<(), ApiError>,
    },
    UploadFinished(SessionSummary),
    /// The finished session's tasks were removed from the store.
    SessionCleared,
}

/// Handle to the background engine. Commands run on a single-threaded
/// runtime owned by a dedicated thread; results come back as events.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    store: TaskStateStore,
    profile: PlatformProfile,
}

struct Worker {
    settings: ClientSettings,
    client: FileStoreClient,
    transport: Arc<dyn Transport>,
    store: TaskStateStore,
    profile: PlatformProfile,
    // Held for a whole upload session, grace period included.
    session_gate: Mutex<()>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = FileStoreClient::new(&settings)?;
        let transport = build_transport(settings.progress_mode, client.clone(), settings.chunk_size);
        let store = TaskStateStore::new();
        let profile = session_profile(&settings);

        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Arc::new(Worker {
            settings,
            client,
            transport,
            store: store.clone(),
            profile,
            session_gate: Mutex::new(()),
        });

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    share_error!("cannot start engine runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                while let Some(command) = cmd_rx.recv().await {
                    let worker = worker.clone();
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        worker.handle_command(command, event_tx).await;
                    });
                }
            });
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            store,
            profile,
        })
    }

    pub fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            share_warn!("engine is not running; command dropped");
        }
    }

    /// Task records of the running (or just finished) upload session.
    pub fn store(&self) -> &TaskStateStore {
        &self.store
    }

    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Disconnected` means the
    /// engine thread has stopped.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

impl Worker {
    async fn handle_command(&self, command: EngineCommand, event_tx: mpsc::Sender<EngineEvent>) {
        match command {
            EngineCommand::Upload { files } => {
                let _gate = self.session_gate.lock().await;
                let scheduler = UploadScheduler::new(
                    self.transport.as_ref(),
                    &self.client,
                    self.store.clone(),
                    self.profile,
                )
                .with_upload_deadline(self.settings.upload_deadline)
                .with_archive_threshold(self.settings.archive_threshold);
                let summary = scheduler.run(files).await;
                let _ = event_tx.send(EngineEvent::UploadFinished(summary));

                tokio::time::sleep(self.settings.summary_grace).await;
                self.store.clear();
                let _ = event_tx.send(EngineEvent::SessionCleared);
            }
            EngineCommand::List => {
                let result = self.client.list().await;
                if let Err(err) = &result {
                    share_warn!("listing files failed: {}", err);
                }
                let _ = event_tx.send(EngineEvent::Listed(result));
            }
            EngineCommand::Download { names, dir } => {
                let writer = AtomicFileWriter::new(dir);
                for name in names {
                    let result = match self.client.download(&name).await {
                        Ok(bytes) => save(&writer, local_file_name(&name), bytes).await,
                        Err(err) => Err(err),
                    };
                    log_outcome("download", &name, &result);
                    let _ = event_tx.send(EngineEvent::Downloaded { name, result });
                }
            }
            EngineCommand::DownloadArchive { names, dir } => {
                let writer = AtomicFileWriter::new(dir);
                let label = format!("{} files", names.len());
                let result = match self.client.download_many(&names).await {
                    Ok((suggested, bytes)) => {
                        let filename = suggested
                            .as_deref()
                            .map(local_file_name)
                            .unwrap_or_else(|| FALLBACK_ARCHIVE_NAME.to_string());
                        save(&writer, filename, bytes).await
                    }
                    Err(err) => Err(err),
                };
                log_outcome("archive download", &label, &result);
                let _ = event_tx.send(EngineEvent::Downloaded {
                    name: label,
                    result,
                });
            }
            EngineCommand::Delete { names } => {
                for name in names {
                    let result = self.client.delete(&name).await;
                    log_outcome("delete", &name, &result);
                    let _ = event_tx.send(EngineEvent::Deleted { name, result });
                }
            }
        }
    }
}

/// Writes on the blocking pool, off the runtime thread.
async fn save(writer: &AtomicFileWriter, filename: String, bytes: Bytes) -> Result<PathBuf, ApiError> {
    let writer = writer.clone();
    let written = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes))
        .await
        .map_err(|err| ApiError::LocalIo(err.to_string()))?;
    written.map_err(|err| ApiError::LocalIo(err.to_string()))
}

fn log_outcome<T>(action: &str, subject: &str, result: &Result<T, ApiError>) {
    match result {
        Ok(_) => share_info!("{} of {} succeeded", action, subject),
        Err(err) => share_warn!("{} of {} failed: {}", action, subject, err),
    }
}
