//! Request composition. Pure data: nothing here touches the network.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, AUTHORIZATION, USER_AGENT};
use reqwest::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// A fully composed GET request, ready for a [`Transport`](super::Transport)
#[derive(Clone, Debug)]
pub struct Request {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Compose `<apiroot>/<path...>?<parameters>` with the credential and
/// encoding headers `config` calls for.
///
/// Anonymous configs get a trailing `client_id` parameter; authenticated
/// ones get a bearer `Authorization` header and their parameters untouched.
pub fn build_request(
    config: &Config,
    path: &[&str],
    parameters: &[(String, String)],
) -> Result<Request> {
    let mut headers = HeaderMap::new();
    let mut parameters = parameters.to_vec();

    if config.authenticated {
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.access_token))?,
        );
    } else {
        parameters.push(("client_id".to_string(), config.client_id.clone()));
    }

    headers.insert(
        USER_AGENT,
        header_value(&format!("{} (gzip)", config.user_agent))?,
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    let mut url = Url::parse(&config.apiroot)
        .map_err(|e| Error::InvalidRequest(format!("API root '{}': {}", config.apiroot, e)))?;
    url.path_segments_mut()
        .map_err(|_| {
            Error::InvalidRequest(format!("API root '{}' cannot be a base", config.apiroot))
        })?
        .pop_if_empty()
        .extend(path);
    if !parameters.is_empty() {
        url.query_pairs_mut().extend_pairs(&parameters);
    }

    Ok(Request { url, headers })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidRequest(format!("header value: {}", e)))
}
