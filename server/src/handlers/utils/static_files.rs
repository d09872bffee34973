use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use hyper::{Response, StatusCode, header};
use tracing::{debug, error};

use crate::ResponseBody;

use super::responses::full;

/// Expand tilde (~) in path to home directory
fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path_ref: &Path = path.as_ref();
    let path_str: &str = path_ref.to_str().unwrap_or("");

    if path_str.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut home_path: PathBuf = PathBuf::from(home);
            home_path.push(&path_str[2..]);
            return home_path;
        }
    }

    path_ref.to_path_buf()
}

/// Deliver a file from disk with a MIME type derived from its extension.
///
/// `cache` controls the `Cache-Control` header: fingerprinted assets get a
/// long-lived immutable policy, pages get no-store.
pub fn deliver_file<P: AsRef<Path>>(file_path: P, cache: bool) -> Result<Response<ResponseBody>> {
    let expanded_path: PathBuf = expand_tilde(file_path);

    debug!("Reading file from: {}", expanded_path.display());

    let content = std::fs::read(&expanded_path)
        .with_context(|| format!("Failed to read file: {}", expanded_path.display()))?;
    let content_bytes = Bytes::from(content);
    let mime_type = get_mime_type(&expanded_path);

    debug!(
        "Delivering file, size: {} bytes, mime: {}, cache: {}",
        content_bytes.len(),
        mime_type,
        cache
    );

    let cache_control = if cache {
        "public, max-age=31536000, immutable"
    } else {
        "no-cache, no-store, must-revalidate"
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CACHE_CONTROL, cache_control)
        .body(full(content_bytes))
        .map_err(|e: http::Error| {
            error!("Failed to build file response: {}", e);
            anyhow!("Failed to build file response: {}", e)
        })?;

    Ok(response)
}

/// Deliver an HTML page from disk with security headers applied.
pub fn deliver_html_file<P: AsRef<Path>>(file_path: P) -> Result<Response<ResponseBody>> {
    let expanded_path: PathBuf = expand_tilde(file_path);

    debug!("Reading HTML file from: {}", expanded_path.display());

    let html = std::fs::read_to_string(&expanded_path)
        .with_context(|| format!("Failed to read HTML file: {}", expanded_path.display()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(header::X_FRAME_OPTIONS, "DENY")
        .header(header::REFERRER_POLICY, "no-referrer")
        .body(full(Bytes::from(html)))
        .map_err(|e: http::Error| {
            error!("Failed to build HTML response: {}", e);
            anyhow!("Failed to build HTML response: {}", e)
        })?;

    Ok(response)
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        // Web documents
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml",

        // Images
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Documents
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",

        // Default
        _ => "application/octet-stream",
    }
}
