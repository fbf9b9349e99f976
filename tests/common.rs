#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn create_test_image_files(temp_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let jpg_file = temp_dir.join("test.jpg");
    let png_file = temp_dir.join("test.png");
    let gif_file = temp_dir.join("test.gif");
    let txt_file = temp_dir.join("test.txt");

    for (path, data) in [
        (&jpg_file, &b"fake jpg data"[..]),
        (&png_file, &b"fake png data"[..]),
        (&gif_file, &b"fake gif data"[..]),
        (&txt_file, &b"not an image"[..]),
    ] {
        File::create(path).unwrap().write_all(data).unwrap();
    }

    files.push(jpg_file);
    files.push(png_file);
    files.push(gif_file);
    files.push(txt_file);

    files
}

pub fn create_image_of_size(path: &Path, len: usize) {
    File::create(path)
        .unwrap()
        .write_all(&vec![0x5A; len])
        .unwrap();
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Canned reply for one route of the stub server.
#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }
}

/// Placeholder in a shrink body replaced by the server's own `/output` URL.
pub const OUTPUT_URL: &str = "{OUTPUT_URL}";

type HeaderLog = Arc<Mutex<Vec<Vec<(String, String)>>>>;

/// Minimal HTTP/1.1 server: `POST /shrink` answers with `shrink`,
/// `GET /output` answers with `output`.
pub struct StubServer {
    pub addr: SocketAddr,
    pub uploads: Arc<AtomicUsize>,
    pub downloads: Arc<AtomicUsize>,
    /// Request headers of every upload, names lowercased.
    pub upload_headers: HeaderLog,
}

impl StubServer {
    pub async fn start(shrink: StubResponse, output: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let uploads = Arc::new(AtomicUsize::new(0));
        let downloads = Arc::new(AtomicUsize::new(0));
        let upload_headers: HeaderLog = Arc::new(Mutex::new(Vec::new()));

        let (up, down, log) = (uploads.clone(), downloads.clone(), upload_headers.clone());
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let (shrink, output) = (shrink.clone(), output.clone());
                let (up, down, log) = (up.clone(), down.clone(), log.clone());
                tokio::spawn(async move {
                    let _ = serve(stream, addr, shrink, output, up, down, log).await;
                });
            }
        });

        Self {
            addr,
            uploads,
            downloads,
            upload_headers,
        }
    }

    pub fn shrink_url(&self) -> String {
        format!("http://{}/shrink", self.addr)
    }

    pub fn output_url(&self) -> String {
        format!("http://{}/output", self.addr)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Value of `name` on the most recent upload, if it was sent.
    pub fn last_upload_header(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let log = self.upload_headers.lock().unwrap();
        let value = log
            .last()?
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone());
        value
    }
}

async fn serve(
    mut stream: TcpStream,
    addr: SocketAddr,
    shrink: StubResponse,
    output: StubResponse,
    uploads: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
    upload_headers: HeaderLog,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    // read headers
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let headers: Vec<(String, String)> = head
        .lines()
        .skip(1)
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();
    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    // drain body
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request_line = head.lines().next().unwrap_or_default();
    let reply = if request_line.starts_with("POST /shrink") {
        uploads.fetch_add(1, Ordering::SeqCst);
        upload_headers.lock().unwrap().push(headers);
        let body = String::from_utf8_lossy(&shrink.body)
            .replace(OUTPUT_URL, &format!("http://{}/output", addr));
        StubResponse::json(shrink.status, &body)
    } else if request_line.starts_with("GET /output") {
        downloads.fetch_add(1, Ordering::SeqCst);
        output
    } else {
        StubResponse::json(404, "{}")
    };

    let header = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&reply.body).await?;
    stream.shutdown().await?;
    Ok(())
}
