use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use anyhow::{Context, Result};
use hyper::header::SET_COOKIE;
use hyper::{Method, Request, Response, StatusCode};
use tower::Service;
use tracing::{debug, error, warn};

use crate::auth::{self, admin::get_is_admin};
use crate::handlers::utils::responses::{
    deliver_error_json, deliver_redirect, deliver_success_json, internal_error_response,
};
use crate::handlers::utils::static_files::{deliver_file, deliver_html_file};
use crate::handlers::{comments, feedback, news, places, setup_username};
use crate::session::{self, CurrentSession, ResponseCookies, has_session_set_cookie};
use crate::{AppState, RequestBody, ResponseBody};

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Three security tiers:
//
//   OpenHandler   — no auth.  Receives (req, state).
//                   Use for: content reads, login, the auth callback,
//                   static files.
//
//   AuthedHandler — requires a live session, resolved by the router.
//                   Receives (req, state, session).
//                   Use for: POST actions tied to an identity.
//
//   Admin tier    — same handler shape; the router additionally consults
//                   the store-side admin predicate before dispatch.

type OpenHandler = Box<
    dyn Fn(
            Request<RequestBody>,
            AppState,
        ) -> Pin<Box<dyn Future<Output = Result<Response<ResponseBody>>> + Send>>
        + Send
        + Sync,
>;

type AuthedHandler = Box<
    dyn Fn(
            Request<RequestBody>,
            AppState,
            CurrentSession,
        ) -> Pin<Box<dyn Future<Output = Result<Response<ResponseBody>>> + Send>>
        + Send
        + Sync,
>;

// ---------------------------------------------------------------------------
// RouteKind
// ---------------------------------------------------------------------------

enum RouteKind {
    /// No authentication check.
    Open(OpenHandler),

    /// Requires a resolved session; anonymous callers are redirected to
    /// /login. Handler receives the `CurrentSession`.
    Authed(AuthedHandler),

    /// Requires a session AND a fresh, fail-closed admin predicate check.
    /// Non-admins are redirected home, indistinguishable from the page not
    /// existing.
    Admin(AuthedHandler),
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
    web_dir: Option<String>,
    icons_dir: Option<String>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .field("web_dir", &self.web_dir)
            .field("icons_dir", &self.icons_dir)
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            web_dir: None,
            icons_dir: None,
        }
    }

    pub fn with_web_dir(mut self, web_dir: String) -> Self {
        self.web_dir = Some(web_dir);
        self
    }

    pub fn with_icons_dir(mut self, icons_dir: String) -> Self {
        self.icons_dir = Some(icons_dir);
        self
    }

    // ── Open (no auth) ────────────────────────────────────────────────────────

    /// GET with no authentication — content reads and public pages.
    pub fn get<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    /// POST with no authentication — use only for the sign-in action.
    pub fn post<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::POST,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    // ── Authed (live session, resolved by the router) ─────────────────────────
    //
    // The router resolves the session before the handler is called. Handlers
    // receive the `CurrentSession` and must NOT repeat the lookup.

    /// POST guarded by a live session.
    pub fn post_authed<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState, CurrentSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::POST,
            path: path.to_string(),
            kind: RouteKind::Authed(Box::new(move |req, state, session| {
                Box::pin(handler(req, state, session))
            })),
        });
        self
    }

    // ── Admin (session + fail-closed predicate) ───────────────────────────────

    /// GET guarded by the admin predicate.
    pub fn get_admin<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState, CurrentSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            kind: RouteKind::Admin(Box::new(move |req, state, session| {
                Box::pin(handler(req, state, session))
            })),
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(
        &self,
        req: Request<RequestBody>,
        state: AppState,
    ) -> Result<Response<ResponseBody>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for route in &self.routes {
            if route.method != method || !Self::path_matches(&route.path, &path) {
                continue;
            }

            return match &route.kind {
                // ── Open ──────────────────────────────────────────────────────
                RouteKind::Open(h) => h(req, state).await,

                // ── Authed: live session required ─────────────────────────────
                //
                // The lookup carries a response writer: on allow-listed paths
                // the interceptor never ran, so a token rotated during the
                // fallback lookup must still reach the browser.
                RouteKind::Authed(h) => {
                    let mut rotated = rotation_writer(&state).await;
                    match session::resolve_session(&req, &state, &mut rotated).await {
                        Some(session) => {
                            let mut response = h(req, state, session).await?;
                            append_rotated_cookies(&mut response, rotated);
                            Ok(response)
                        }
                        None => {
                            debug!("Anonymous caller on {} {}, sending to login", method, path);
                            deliver_redirect("/login")
                        }
                    }
                }

                // ── Admin: session + fresh predicate check ────────────────────
                RouteKind::Admin(h) => {
                    let mut rotated = rotation_writer(&state).await;
                    match session::resolve_session(&req, &state, &mut rotated).await {
                        Some(session) => {
                            if get_is_admin(&state, Some(&session.tokens.access_token)).await {
                                let mut response = h(req, state, session).await?;
                                append_rotated_cookies(&mut response, rotated);
                                Ok(response)
                            } else {
                                warn!("Non-admin reached {} {}", method, path);
                                let mut response = deliver_redirect("/")?;
                                append_rotated_cookies(&mut response, rotated);
                                Ok(response)
                            }
                        }
                        None => deliver_redirect("/login"),
                    }
                }
            };
        }

        // No registered route matched — try static file fallback for GET.
        if method == Method::GET {
            if let Some(static_response) = self.try_serve_static(&path, &state).await {
                return Ok(static_response);
            }
        }

        deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
            .context("Failed to deliver 404 response")
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Strip query string from incoming request path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);

        // Exact match.
        if route_path == clean {
            return true;
        }

        // Segment-by-segment matching for `:param` wildcards.
        // e.g.  "/news/:slug"  matches  "/news/park-opening"
        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
    }

    // ── Static file fallback ──────────────────────────────────────────────────

    async fn try_serve_static(&self, path: &str, state: &AppState) -> Option<Response<ResponseBody>> {
        let cfg = state.config.read().await.clone();
        let web_dir = self
            .web_dir
            .as_ref()
            .unwrap_or(&cfg.paths.web_dir)
            .trim_end_matches('/')
            .to_string();
        let icons = self
            .icons_dir
            .as_ref()
            .unwrap_or(&cfg.paths.icons)
            .trim_start_matches('/')
            .trim_end_matches('/')
            .to_string();

        let result = match path {
            "/" | "/index.html" => deliver_html_file(format!("{}/index.html", web_dir)),

            path if path.starts_with("/static/") => {
                deliver_file(format!("{}{}", web_dir, path), true)
            }

            "/icon" => deliver_file(format!("{}/{}/icon.svg", web_dir, icons), true),

            "/favicon.ico" | "/favicon.png" | "/favicon.svg" | "/apple-touch-icon.png"
            | "/site.webmanifest" | "/robots.txt" | "/sitemap.xml" => {
                deliver_file(format!("{}/{}{}", web_dir, icons, path), true)
            }

            path if path.ends_with(".html") => deliver_html_file(format!("{}{}", web_dir, path)),

            // Extensionless paths map to pre-rendered pages: /login,
            // /feedback, /setup-username and friends.
            path if !path.contains('.') => {
                deliver_html_file(format!("{}{}.html", web_dir, path))
            }

            _ => return None,
        };

        match result {
            Ok(response) => Some(response),
            Err(e) => {
                debug!("Static fallback missed {}: {}", path, e);
                None
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Site router
//
// Auth tier is enforced here at the routing level — handlers MUST NOT repeat
// the session or predicate lookup.  The contract is:
//
//   .get(...)          → Open   — handler gets (req, state)
//   .post(...)         → Open   — sign-in only
//   .post_authed(...)  → Authed — handler gets (req, state, session)
//   .get_admin(...)    → Admin  — same, after the fail-closed predicate
// ---------------------------------------------------------------------------

pub fn build_site_router(web_dir: Option<String>, icons_dir: Option<String>) -> Router {
    let mut router = Router::new();
    if let Some(dir) = web_dir {
        router = router.with_web_dir(dir);
    }
    if let Some(dir) = icons_dir {
        router = router.with_icons_dir(dir);
    }

    router
        // ── Public: no auth ──────────────────────────────────────────────────
        .get("/health", |_req, _state| async move {
            deliver_success_json(Some(serde_json::json!({ "health": "ok" })))
        })
        .get("/news", |req, state| async move {
            news::handle_list_news(req, &state)
                .await
                .context("News listing failed")
        })
        .get("/news/:slug", |req, state| async move {
            let slug = path_segment(req.uri().path(), 2);
            news::handle_news_detail(req, &state, &slug)
                .await
                .context("News detail failed")
        })
        .get("/places", |req, state| async move {
            places::handle_list_places(req, &state)
                .await
                .context("Place listing failed")
        })
        .get("/places/:slug", |req, state| async move {
            let slug = path_segment(req.uri().path(), 2);
            places::handle_place_detail(req, &state, &slug)
                .await
                .context("Place detail failed")
        })
        .get("/auth/callback", |req, state| async move {
            auth::callback::handle_callback(req, &state)
                .await
                .context("Auth callback failed")
        })
        .post("/auth/login", |req, state| async move {
            auth::login::handle_login(req, &state)
                .await
                .context("Login failed")
        })
        // ── Authed: live session resolved by the router ──────────────────────
        .post_authed("/setup-username", |req, state, session| async move {
            setup_username::handle_setup_username(req, &state, &session)
                .await
                .context("Username setup failed")
        })
        .post_authed("/feedback", |req, state, session| async move {
            feedback::handle_submit_feedback(req, &state, &session)
                .await
                .context("Feedback submit failed")
        })
        .post_authed("/news/:slug/comments", |req, state, session| async move {
            let slug = path_segment(req.uri().path(), 2);
            comments::handle_post_comment(req, &state, &session, &slug)
                .await
                .context("Comment submit failed")
        })
        .post_authed("/auth/logout", |req, state, _session| async move {
            auth::login::handle_logout(req, &state)
                .await
                .context("Logout failed")
        })
        // ── Admin: fail-closed predicate checked by the router ───────────────
        .get_admin("/admin", |req, state, session| async move {
            crate::handlers::admin::handle_admin_home(req, &state, &session)
                .await
                .context("Admin home failed")
        })
        .get_admin("/admin/feedback", |req, state, session| async move {
            crate::handlers::admin::handle_admin_feedback(req, &state, &session)
                .await
                .context("Admin feedback failed")
        })
}

async fn rotation_writer(state: &AppState) -> ResponseCookies {
    let secure = state
        .config
        .read()
        .await
        .site
        .public_url
        .starts_with("https");
    ResponseCookies::new(secure)
}

fn append_rotated_cookies(res: &mut Response<ResponseBody>, rotated: ResponseCookies) {
    // Handler-issued session cookies (the callback install, the logout
    // clears) win over the rotation mirror.
    if has_session_set_cookie(res.headers()) {
        return;
    }
    for value in rotated.into_header_values() {
        res.headers_mut().append(SET_COOKIE, value);
    }
}

fn path_segment(path: &str, idx: usize) -> String {
    path.split('?')
        .next()
        .unwrap_or(path)
        .split('/')
        .nth(idx)
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// SiteService
//
// Tower entry point for the whole site. Infallible by contract: a handler
// error is logged and collapses to a generic 500 so hyper never sees it.
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SiteService {
    router: Arc<Router>,
    state: AppState,
}

impl SiteService {
    pub fn new(router: Arc<Router>, state: AppState) -> Self {
        Self { router, state }
    }
}

impl Service<Request<RequestBody>> for SiteService {
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<RequestBody>) -> Self::Future {
        let router = Arc::clone(&self.router);
        let state = self.state.clone();

        Box::pin(async move {
            match router.route(req, state).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    error!("Handler failed: {:#}", e);
                    Ok(internal_error_response())
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
