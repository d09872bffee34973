use std::collections::HashMap;

use anyhow::{Context, Result};
use http_body_util::BodyExt;
use hyper::Request;

use crate::RequestBody;

/// Collect and parse an `application/x-www-form-urlencoded` request body.
///
/// Repeated fields keep the last value. Field names and values are
/// percent-decoded.
pub async fn parse_form(req: Request<RequestBody>) -> Result<HashMap<String, String>> {
    let body = req
        .collect()
        .await
        .context("Failed to read request body")?
        .to_bytes();

    Ok(form_urlencoded::parse(&body)
        .into_owned()
        .collect::<HashMap<String, String>>())
}

/// Extract a single query parameter from a request URI.
pub fn query_param<B>(req: &Request<B>, name: &str) -> Option<String> {
    let query = req.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
