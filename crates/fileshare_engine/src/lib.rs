//! Fileshare engine: REST client, upload transports and batch scheduling.
mod api;
mod archive;
mod engine;
mod filename;
mod persist;
mod probe;
mod scheduler;
mod settings;
mod transport;
mod types;

pub use api::{ApiResponse, FileEntry, FileStoreClient};
pub use archive::ArchiveRequester;
pub use engine::{EngineCommand, EngineEvent, EngineHandle};
pub use filename::local_file_name;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use probe::{probe_environment, session_profile};
pub use scheduler::UploadScheduler;
pub use settings::{ClientSettings, ProgressMode, DEFAULT_BASE_URL};
pub use transport::{
    build_transport, enforce_deadline, CoarseTransport, ProgressSink, StoreProgressSink,
    StreamingTransport, Transport, COARSE_IN_FLIGHT_PERCENT,
};
pub use types::{ApiError, FailureKind, FileSource, UploadFile, UploadOutcome};
