//! Path classification for the request interceptor.

/// Header carrying the current request path, consumed by page-layout logic
/// to conditionally suppress chrome.
pub const PATHNAME_HEADER: &str = "x-pathname";

/// Where identities without a usable username are sent.
pub const SETUP_PATH: &str = "/setup-username";

/// Paths that bypass auth and profile checks entirely (the path header is
/// still set).
pub const PUBLIC_PATHS: &[&str] = &["/login", "/auth/callback", SETUP_PATH, "/icon"];

/// Static-asset paths the interceptor never touches, mirroring the
/// framework matcher of the original deployment.
const EXCLUDED_PREFIXES: &[&str] = &["/static/"];
const EXCLUDED_PATHS: &[&str] = &["/favicon.ico", "/robots.txt", "/sitemap.xml"];

/// Whether the interceptor runs for this path at all.
pub fn is_intercepted(path: &str) -> bool {
    if EXCLUDED_PATHS.contains(&path) {
        return false;
    }
    !EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Whether the path is on the public allow-list (exact match).
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}
