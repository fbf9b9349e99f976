pub const DEFAULT_API_URL: &str = "https://tinypng.com/web/shrink";
pub const DEFAULT_REFERER: &str = "https://tinypng.com/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.131 Safari/537.36";

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_COOLDOWN_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_JITTER_MS: u64 = 1000;

/// Minimum saving, in percent, for a compressed file to replace the original.
pub const MIN_SAVING_PERCENT: u64 = 1;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png"];

pub const FAILURE_STORE_FILENAME: &str = ".tiny-failed.json";
pub const FAILURE_STORE_TEMP_FILENAME: &str = ".tiny-failed.tmp";

pub const BACKUP_SUFFIX: &str = "_backup";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.yellow} {msg}";

pub const NO_OUTPUT_MESSAGE: &str = "no compressed output received";
pub const RETRY_HINT: &str = "Run `tiny retry` to compress the failed files again";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const SKIP_PREFIX: &str = "⏭️ ";
pub const FAILURE_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const BATCH_PREFIX: &str = "📦";
