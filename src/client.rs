use crate::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_JITTER_MS, DEFAULT_REFERER, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, NO_OUTPUT_MESSAGE,
};
use crate::error::{Result, TinyError};
use crate::outcome::{CompressionOutcome, Saving, SkipReason};
use crate::resolver::ImageFile;
use crate::utils::{random_ipv4, random_jitter};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Anything that can take one image through a compression attempt.
///
/// Implementations must never panic or return early with an error: every
/// failure is reported as [`CompressionOutcome::Failed`].
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, file: &ImageFile) -> CompressionOutcome;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub referer: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_jitter: Duration,
    /// Send a random `X-Forwarded-For` / `X-Real-IP` with every upload.
    pub spoof_client_ip: bool,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
            spoof_client_ip: false,
            system_proxy: true,
        }
    }
}

impl ClientOptions {
    pub fn new(
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        spoof_client_ip: bool,
    ) -> Self {
        let defaults = Self::default();
        Self {
            api_url: api_url.unwrap_or(defaults.api_url),
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            spoof_client_ip,
            ..defaults
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: Option<ShrinkOutput>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShrinkOutput {
    pub url: String,
    pub size: u64,
}

impl ShrinkResponse {
    fn message(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// Extracts the compressed artifact descriptor from a shrink response body.
///
/// # Returns
/// * `Ok(ShrinkOutput)` - The download URL and compressed size
/// * `Err(TinyError::Parse)` - If the body is not JSON or carries no output
pub fn parse_shrink_response(body: &[u8]) -> Result<ShrinkOutput> {
    let response: ShrinkResponse = serde_json::from_slice(body)
        .map_err(|e| TinyError::Parse(format!("not a valid JSON response ({})", e)))?;

    let message = response.message();
    response
        .output
        .ok_or_else(|| TinyError::Parse(message.unwrap_or_else(|| NO_OUTPUT_MESSAGE.to_string())))
}

/// Byte size of the file as it is right now, rejecting empty files.
pub fn read_original_size(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TinyError::FileNotFound(path.to_path_buf()),
        _ => TinyError::Io(e),
    })?;
    if metadata.len() == 0 {
        return Err(TinyError::EmptyFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// HTTP client for the TinyPNG-style web shrink endpoint.
#[derive(Debug, Clone)]
pub struct TinyClient {
    http: Client,
    options: ClientOptions,
}

impl TinyClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&options.referer)
                .map_err(|e| TinyError::HttpClient(format!("invalid referer: {}", e)))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .map_err(|e| TinyError::HttpClient(format!("invalid user agent: {}", e)))?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout);
        if !options.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| TinyError::HttpClient(e.to_string()))?;

        Ok(Self { http, options })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn try_compress(&self, file: &ImageFile) -> Result<CompressionOutcome> {
        let original_size = read_original_size(&file.path)?;
        let body = tokio::fs::read(&file.path).await?;

        let jitter = random_jitter(self.options.max_jitter);
        if !jitter.is_zero() {
            tokio::time::sleep(jitter).await;
        }

        let output = self.upload(body).await?;
        let saving = Saving::new(original_size, output.size);
        crate::verbose!(
            "{}: {} -> {} bytes ({:.2}%)",
            file.path.display(),
            original_size,
            output.size,
            saving.percent()
        );

        if !saving.is_worthwhile() {
            return Ok(CompressionOutcome::Skipped(SkipReason::BelowThreshold));
        }

        self.download(&output.url, &file.path).await?;

        Ok(CompressionOutcome::Compressed {
            saved_bytes: saving.saved_bytes() as u64,
            percent: saving.percent(),
        })
    }

    async fn upload(&self, body: Vec<u8>) -> Result<ShrinkOutput> {
        let mut request = self.http.post(&self.options.api_url).body(body);
        if self.options.spoof_client_ip {
            let ip = random_ipv4().to_string();
            request = request
                .header("X-Forwarded-For", ip.as_str())
                .header("X-Real-IP", ip.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TinyError::Upload(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TinyError::Upload(e.to_string()))?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ShrinkResponse>(&bytes)
                .ok()
                .and_then(|r| r.message())
                .unwrap_or_else(|| status.to_string());
            return Err(TinyError::Upload(reason));
        }

        parse_shrink_response(&bytes)
    }

    /// Streams `url` into a temporary sibling of `target`, then renames it over
    /// `target`. The original stays intact unless the whole body arrived.
    ///
    /// A symlinked `target` is resolved first so the link survives, and the
    /// replacement keeps the original file's permissions.
    async fn download(&self, url: &str, target: &Path) -> Result<()> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TinyError::Download(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TinyError::Download(response.status().to_string()));
        }

        let target = std::fs::canonicalize(target)?;
        let permissions = std::fs::metadata(&target)?.permissions();
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TinyError::Download(e.to_string()))?;
            temp.write_all(&chunk)?;
            written += chunk.len() as u64;
        }

        if written == 0 {
            return Err(TinyError::Download("empty response body".to_string()));
        }

        temp.as_file().set_permissions(permissions)?;
        temp.as_file_mut().sync_all()?;
        temp.persist(&target).map_err(|e| TinyError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl Compressor for TinyClient {
    async fn compress(&self, file: &ImageFile) -> CompressionOutcome {
        match self.try_compress(file).await {
            Ok(outcome) => outcome,
            Err(e) => CompressionOutcome::Failed(e.to_string()),
        }
    }
}
