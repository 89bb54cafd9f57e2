//! HTTP GET probing of freshly deployed endpoints.
//!
//! Uses the curl crate (libcurl). The retrying helpers are condition polls:
//! a transport error or an unexpected response both count as "not ready yet".
//! A malformed URL is rejected once, before the first request.

use std::time::Duration;

use crate::retry::{NotReady, Poller, Readiness, RetryObserver, RetryPolicy, RunOutcome, Sleeper};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} returned HTTP {status}, expected {expected}")]
    UnexpectedStatus {
        url: String,
        status: u32,
        expected: u32,
    },
    #[error("GET {url} body {body:?} does not contain {expected:?}")]
    UnexpectedBody {
        url: String,
        body: String,
        expected: String,
    },
    #[error("GET {url} returned HTTP {status}: response rejected by validation")]
    Rejected { url: String, status: u32 },
}

/// Performs a single GET and returns status and body.
///
/// Follows redirects. Runs in the current thread.
pub fn http_get(url: &str) -> Result<HttpResponse, HttpError> {
    parse_url(url)?;
    let transport = |source: curl::Error| HttpError::Transport {
        url: url.to_string(),
        source,
    };

    let mut body: Vec<u8> = Vec::new();
    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.connect_timeout(CONNECT_TIMEOUT).map_err(transport)?;
    easy.timeout(REQUEST_TIMEOUT).map_err(transport)?;
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer.perform().map_err(transport)?;
    }

    let status = easy.response_code().map_err(transport)?;
    Ok(HttpResponse {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn parse_url(url: &str) -> Result<url::Url, HttpError> {
    url::Url::parse(url).map_err(|source| HttpError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Check a response against an expected status and an expected body substring.
fn check_expected(
    url: &str,
    resp: &HttpResponse,
    expected_status: u32,
    expected_body: &str,
) -> Result<(), HttpError> {
    if resp.status != expected_status {
        return Err(HttpError::UnexpectedStatus {
            url: url.to_string(),
            status: resp.status,
            expected: expected_status,
        });
    }
    if !resp.body.contains(expected_body) {
        return Err(HttpError::UnexpectedBody {
            url: url.to_string(),
            body: resp.body.clone(),
            expected: expected_body.to_string(),
        });
    }
    Ok(())
}

/// GET `url` until it answers `expected_status` with a body containing
/// `expected_body`, or the policy's budget runs out.
///
/// Returns `Err` without polling when `url` does not parse.
pub fn http_get_with_retry(
    url: &str,
    expected_status: u32,
    expected_body: &str,
    policy: &RetryPolicy,
) -> Result<RunOutcome<HttpResponse, NotReady>, HttpError> {
    http_get_with_retry_using(&Poller::new(), url, expected_status, expected_body, policy)
}

/// Like [`http_get_with_retry`] with a caller-configured poller.
pub fn http_get_with_retry_using<O: RetryObserver, S: Sleeper>(
    poller: &Poller<O, S>,
    url: &str,
    expected_status: u32,
    expected_body: &str,
    policy: &RetryPolicy,
) -> Result<RunOutcome<HttpResponse, NotReady>, HttpError> {
    parse_url(url)?;
    Ok(poller.poll_until(policy, || {
        http_get(url)
            .and_then(|resp| {
                check_expected(url, &resp, expected_status, expected_body).map(|()| resp)
            })
            .into()
    }))
}

/// GET `url` until `validate(status, body)` accepts the response.
pub fn http_get_with_validation<F>(
    url: &str,
    policy: &RetryPolicy,
    validate: F,
) -> Result<RunOutcome<HttpResponse, NotReady>, HttpError>
where
    F: FnMut(u32, &str) -> bool,
{
    http_get_with_validation_using(&Poller::new(), url, policy, validate)
}

pub fn http_get_with_validation_using<O, S, F>(
    poller: &Poller<O, S>,
    url: &str,
    policy: &RetryPolicy,
    mut validate: F,
) -> Result<RunOutcome<HttpResponse, NotReady>, HttpError>
where
    O: RetryObserver,
    S: Sleeper,
    F: FnMut(u32, &str) -> bool,
{
    parse_url(url)?;
    Ok(poller.poll_until(policy, || match http_get(url) {
        Ok(resp) if validate(resp.status, &resp.body) => Readiness::Ready(resp),
        Ok(resp) => Readiness::pending_with(HttpError::Rejected {
            url: url.to_string(),
            status: resp.status,
        }),
        Err(e) => Readiness::pending_with(e),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{RecordingObserver, RecordingSleeper};

    fn resp(status: u32, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn expected_status_and_body() {
        assert!(check_expected("http://x", &resp(200, "Hello, abc!"), 200, "Hello, abc!").is_ok());
        assert!(check_expected("http://x", &resp(200, "anything"), 200, "").is_ok());
    }

    #[test]
    fn wrong_status_reported_with_text() {
        let err = check_expected("http://x", &resp(503, "busy"), 200, "").unwrap_err();
        assert_eq!(err.to_string(), "GET http://x returned HTTP 503, expected 200");
    }

    #[test]
    fn wrong_body_reported() {
        let err = check_expected("http://x", &resp(200, "nginx default"), 200, "Hello").unwrap_err();
        assert!(matches!(err, HttpError::UnexpectedBody { .. }));
    }

    #[test]
    fn malformed_url_is_rejected_before_request() {
        let err = http_get("not a url").unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }

    #[test]
    fn malformed_url_is_not_polled() {
        let sleeper = RecordingSleeper::new();
        let observer = RecordingObserver::new();
        let poller = Poller::new().with_sleeper(&sleeper).with_observer(&observer);
        let policy = RetryPolicy::new("HTTP GET", 3, Duration::from_secs(5));

        let err = http_get_with_retry_using(&poller, "not a url", 200, "", &policy).unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
        let err = http_get_with_validation_using(&poller, "::", &policy, |_, _| true).unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));

        assert!(sleeper.sleeps().is_empty());
        assert!(observer.reports().is_empty());
    }
}
