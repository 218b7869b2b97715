//! Utility functions and helpers

use std::path::Path;

use sha2::{Digest, Sha256};

/// Short content hash, used for `ETag` headers
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Display `to` relative to `from`, falling back to the full path
pub fn display_relative(from: &Path, to: &Path) -> String {
    pathdiff::diff_paths(to, from)
        .filter(|p| !p.starts_with(".."))
        .unwrap_or_else(|| to.to_path_buf())
        .display()
        .to_string()
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration as human-readable string
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();

    if secs >= 1.0 {
        format!("{:.2}s", secs)
    } else if secs >= 0.001 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{}µs", duration.as_micros())
    }
}
