use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use hyper::header::{HeaderValue, LOCATION, SET_COOKIE};
use hyper::{Request, Response, StatusCode};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::handlers::utils::responses::full;
use crate::session::{
    CookieWriter, ForwardedRequestCookies, RequestCookies, ResponseCookies, SessionClient,
    has_session_set_cookie,
};
use crate::{AppState, ResponseBody};

use super::paths;

/// Tower layer for the request interceptor.
///
/// Runs before every page request: refreshes the session, injects the
/// `x-pathname` routing header, and enforces the profile-completion
/// redirect. It never produces a 5xx itself — every identity/profile error
/// degrades to the plain pass-through.
#[derive(Clone)]
pub struct InterceptorLayer {
    state: AppState,
}

impl InterceptorLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// The actual service performing the interception.
#[derive(Clone)]
pub struct InterceptorService<S> {
    inner: S,
    state: AppState,
}

impl<S, ReqBody> Service<Request<ReqBody>> for InterceptorService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResponseBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let state = self.state.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();

            // Static assets bypass the interceptor entirely.
            if !paths::is_intercepted(&path) {
                return inner.call(req).await;
            }

            // Public paths skip auth and profile checks; the path header is
            // still set.
            if paths::is_public(&path) {
                let mut res = inner.call(req).await?;
                set_pathname_header(&mut res, &path);
                return Ok(res);
            }

            // Bind a session client to this request's cookies. Refreshed
            // cookies are mirrored onto the forwarded request (handlers
            // must see the rotated token) and collected for the response
            // (the browser must receive it).
            let secure = state
                .config
                .read()
                .await
                .site
                .public_url
                .starts_with("https");
            let jar = RequestCookies::from_headers(req.headers());
            let mut response_cookies = ResponseCookies::new(secure);
            let session = {
                let mut request_cookies = ForwardedRequestCookies::new(req.headers_mut());
                SessionClient::new(state.identity.as_ref())
                    .refresh(&jar, &mut request_cookies, &mut response_cookies)
                    .await
            };

            if let Some(session) = session {
                // A store error (RLS denial included) and a missing row are
                // the same thing here: no usable profile.
                let has_username = match state
                    .store
                    .profile_by_id(Some(&session.tokens.access_token), session.identity.id)
                    .await
                {
                    Ok(Some(profile)) => profile.has_username(),
                    Ok(None) => false,
                    Err(e) => {
                        debug!("Profile read degraded to absence: {}", e);
                        false
                    }
                };

                if !has_username && path != paths::SETUP_PATH {
                    let mut res = redirect_to_setup();
                    set_pathname_header(&mut res, paths::SETUP_PATH);
                    apply_cookies(&mut res, response_cookies);
                    return Ok(res);
                }

                req.extensions_mut().insert(session);
            }

            let mut res = inner.call(req).await?;
            set_pathname_header(&mut res, &path);
            apply_cookies(&mut res, response_cookies);
            Ok(res)
        })
    }
}

fn redirect_to_setup() -> Response<ResponseBody> {
    let mut res = Response::new(full(Bytes::new()));
    *res.status_mut() = StatusCode::FOUND;
    res.headers_mut()
        .insert(LOCATION, HeaderValue::from_static(paths::SETUP_PATH));
    res
}

fn set_pathname_header(res: &mut Response<ResponseBody>, path: &str) {
    match HeaderValue::from_str(path) {
        Ok(value) => {
            res.headers_mut().insert(paths::PATHNAME_HEADER, value);
        }
        Err(e) => warn!("Path not representable as header value: {}", e),
    }
}

fn apply_cookies(res: &mut Response<ResponseBody>, cookies: ResponseCookies) {
    // The handler's own session cookies (the logout clears, the callback
    // install) take precedence over an in-request rotation: appending the
    // rotated pair after a Max-Age=0 clear would resurrect tokens the
    // provider has already invalidated.
    if has_session_set_cookie(res.headers()) {
        return;
    }
    for value in cookies.into_header_values() {
        res.headers_mut().append(SET_COOKIE, value);
    }
}
