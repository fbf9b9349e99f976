//! Terminal spinners, byte formatting and the OS-seeded randomness behind
//! upload jitter and forwarded client addresses.

use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Create a progress spinner with consistent styling
///
/// Returns a hidden bar in quiet mode so callers never need to branch.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Draws a random `u64` from the operating system's entropy source.
///
/// Falls back to `0` if the source is unavailable; callers only use this for
/// request shaping, never for anything security sensitive.
pub fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(_) => 0,
    }
}

/// Uniform-ish random delay in `0..=max`, at millisecond granularity.
pub fn random_jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(random_u64() % (max_ms + 1))
}

/// Random public-looking IPv4 address used for forwarded-for headers.
pub fn random_ipv4() -> Ipv4Addr {
    let bytes = random_u64().to_le_bytes();
    // first octet in 1..=223 keeps the address out of 0/8 and multicast space
    Ipv4Addr::new(bytes[0] % 223 + 1, bytes[1], bytes[2], bytes[3])
}
