pub mod backup;
pub mod batch;
pub mod cli;
pub mod client;
pub mod constants;
pub mod error;
pub mod failures;
pub mod logger;
pub mod outcome;
pub mod resolver;
pub mod utils;

pub use backup::backup_directory;
pub use batch::{partition, BatchOptions, BatchOrchestrator, RetryOutcome, RunPhase};
pub use client::{parse_shrink_response, ClientOptions, Compressor, ShrinkOutput, TinyClient};
pub use error::{Result, TinyError};
pub use failures::{FailedFileRecord, FailureDocument, FailureStore};
pub use outcome::{CompressionOutcome, FileReport, RunSummary, Saving, SkipReason};
pub use resolver::{is_image_file, resolve, ImageFile, Resolution, ResolverInput};
