//! Built-in error catalogs for the tools and APIs infrastructure tests drive.
//!
//! Each catalog is built once on first use and never mutated afterwards, so
//! the returned `&'static ErrorCatalog` can be shared freely across threads.
//! All matchers are substring tests on the rendered error text.

use std::sync::LazyLock;
use std::time::Duration;

use serde::Serialize;

use crate::retry::{ErrorCatalog, Matcher, RetryPolicy};

/// Packer builds are retried this many times by default.
pub const DEFAULT_MAX_PACKER_RETRIES: u32 = 3;
/// Wait between Packer build attempts.
pub const DEFAULT_TIME_BETWEEN_PACKER_RETRIES: Duration = Duration::from_secs(15);

const PLUGIN_NETWORK: &str = "Failed to retrieve plugin due to transient network error.";

static TERRAFORM: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("terraform")
        .with_substring(
            "connection-reset",
            "read: connection reset by peer",
            "Failed to reach helm charts repository.",
        )
        .with_substring(
            "transport-closing",
            "transport is closing",
            "Failed to reach Kubernetes API.",
        )
        .with_substring("plugin-signature", "unable to verify signature", PLUGIN_NETWORK)
        .with_substring("plugin-checksum", "unable to verify checksum", PLUGIN_NETWORK)
        .with_substring(
            "no-provider",
            "no provider exists with the given name",
            PLUGIN_NETWORK,
        )
        .with_substring(
            "registry-unreachable",
            "registry service is unreachable",
            PLUGIN_NETWORK,
        )
        .with_substring("installing-provider", "Error installing provider", PLUGIN_NETWORK)
        .with_substring(
            "provider-packages",
            "Failed to query available provider packages",
            PLUGIN_NETWORK,
        )
        .with_substring(
            "plugin-start-timeout",
            "timeout while waiting for plugin to start",
            PLUGIN_NETWORK,
        )
        .with_substring(
            "plugin-handshake",
            "timed out waiting for server handshake",
            PLUGIN_NETWORK,
        )
        .with_substring(
            "provider-registry",
            "could not query provider registry for",
            PLUGIN_NETWORK,
        )
        .with_substring(
            "inconsistent-result",
            "Provider produced inconsistent result after apply",
            "Provider eventual consistency error.",
        )
        .with_substring(
            "state-lock",
            "Error acquiring the state lock",
            "Another run holds the state lock.",
        )
        .with_substring(
            "rate-limit",
            "Rate exceeded",
            "Provider API rate limit.",
        )
});

static PACKER: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("packer")
        .with_substring(
            "script-disconnected",
            "Script disconnected unexpectedly",
            "Packer lost connectivity to the build instance, likely a brief network outage.",
        )
        .with_substring(
            "apt-lock",
            "can not open /var/lib/apt/lists/lock",
            "apt-get on Ubuntu occasionally fails to update the cache.",
        )
});

static AWS: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("aws")
        .with_substring("request-limit", "RequestLimitExceeded", "EC2 API rate limit.")
        .with_substring("throttling", "Throttling", "API call was throttled.")
        .with_substring(
            "too-many-requests",
            "TooManyRequestsException",
            "API call was throttled.",
        )
        .with_substring("slow-down", "SlowDown", "S3 asked the client to reduce request rate.")
        .with_substring(
            "service-unavailable",
            "ServiceUnavailable",
            "Service temporarily unavailable.",
        )
        .with_substring("internal-error", "InternalError", "Transient server-side failure.")
        .with_substring("request-timeout", "RequestTimeout", "Request timed out in transit.")
        .with_substring(
            "conflicting-operation",
            "A conflicting conditional operation is currently in progress",
            "S3 bucket create/delete still settling.",
        )
        .with_substring(
            "no-such-tag-set",
            "NoSuchTagSet",
            "Freshly written tags not yet visible.",
        )
});

static GCP: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("gcp")
        .with_substring("rate-limit", "rateLimitExceeded", "Project rate limit.")
        .with_substring("user-rate-limit", "userRateLimitExceeded", "Per-user rate limit.")
        .with_substring("backend-error", "backendError", "Transient backend failure.")
        .with_substring("error-429", "googleapi: Error 429", "Too many requests.")
        .with_substring("error-503", "googleapi: Error 503", "Service unavailable.")
        .with_substring(
            "resource-not-ready",
            "resourceNotReady",
            "Freshly created resource still provisioning.",
        )
        .with_substring(
            "label-missing",
            "Expected the tag",
            "Freshly set labels not yet visible.",
        )
        .with_substring(
            "label-stale",
            "Expected GetLabelsForComputeInstanceE to return",
            "Label update not yet visible.",
        )
});

static SSH: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("ssh")
        .with_substring(
            "connection-refused",
            "connection refused",
            "Host booted but sshd not accepting yet.",
        )
        .with_substring("connection-reset", "connection reset by peer", "sshd restarting.")
        .with_substring("io-timeout", "i/o timeout", "Host not reachable yet.")
        .with_substring("no-route", "no route to host", "Network still converging.")
        .with_substring(
            "handshake-failed",
            "ssh: handshake failed",
            "Authorized key not yet propagated to the host.",
        )
        .with_substring(
            "unable-to-authenticate",
            "unable to authenticate",
            "Authorized key not yet propagated to the host.",
        )
});

static HTTP: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("http")
        .with_substring(
            "connect-failed",
            "Couldn't connect to server",
            "Endpoint not listening yet.",
        )
        .with_substring(
            "connection-refused",
            "Connection refused",
            "Endpoint not listening yet.",
        )
        .with_substring("timed-out", "Timeout was reached", "Endpoint slow to respond.")
        .with_substring("reset", "Connection reset by peer", "Endpoint restarting.")
        .with_substring(
            "empty-reply",
            "Server returned nothing",
            "Endpoint closed the connection early.",
        )
        .with_substring(
            "resolve-host",
            "Couldn't resolve host name",
            "DNS record not propagated yet.",
        )
        .with_predicate("status-5xx", is_5xx_status_text, "Server-side error.")
        .with_substring("status-429", "HTTP 429", "Too many requests.")
});

static RETRY_ALL: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::new("retry-all").with_entry(crate::retry::CatalogEntry::new(
        "any",
        Matcher::Any,
        "Every error is retried.",
    ))
});

/// "HTTP 5xx" anywhere in the text.
fn is_5xx_status_text(text: &str) -> bool {
    text.match_indices("HTTP 5").any(|(i, _)| {
        let rest = &text.as_bytes()[i + "HTTP 5".len()..];
        rest.len() >= 2
            && rest[0].is_ascii_digit()
            && rest[1].is_ascii_digit()
            && rest.get(2).map_or(true, |b| !b.is_ascii_digit())
    })
}

pub fn terraform() -> &'static ErrorCatalog {
    &TERRAFORM
}

pub fn packer() -> &'static ErrorCatalog {
    &PACKER
}

pub fn aws() -> &'static ErrorCatalog {
    &AWS
}

pub fn gcp() -> &'static ErrorCatalog {
    &GCP
}

pub fn ssh() -> &'static ErrorCatalog {
    &SSH
}

pub fn http() -> &'static ErrorCatalog {
    &HTTP
}

/// Retries every error. Use when any failure of the action is known to be
/// transient, e.g. waiting for a freshly booted host.
pub fn retry_all() -> &'static ErrorCatalog {
    &RETRY_ALL
}

/// Names accepted by [`by_name`], in listing order.
pub fn names() -> &'static [&'static str] {
    &["terraform", "packer", "aws", "gcp", "ssh", "http", "retry-all"]
}

pub fn by_name(name: &str) -> Option<&'static ErrorCatalog> {
    match name {
        "terraform" => Some(terraform()),
        "packer" => Some(packer()),
        "aws" => Some(aws()),
        "gcp" => Some(gcp()),
        "ssh" => Some(ssh()),
        "http" => Some(http()),
        "retry-all" => Some(retry_all()),
        _ => None,
    }
}

/// Default policy for Packer builds.
pub fn packer_policy(description: impl Into<String>) -> RetryPolicy {
    RetryPolicy::new(
        description,
        DEFAULT_MAX_PACKER_RETRIES,
        DEFAULT_TIME_BETWEEN_PACKER_RETRIES,
    )
}

/// Serializable view of a catalog for listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub name: String,
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub matcher: String,
    pub note: String,
}

impl From<&ErrorCatalog> for CatalogSummary {
    fn from(catalog: &ErrorCatalog) -> Self {
        Self {
            name: catalog.name().to_string(),
            entries: catalog
                .entries()
                .iter()
                .map(|e| EntrySummary {
                    id: e.id.clone(),
                    matcher: format!("{:?}", e.matcher),
                    note: e.note.clone(),
                })
                .collect(),
        }
    }
}

/// Summaries of every built-in catalog listed in [`names`].
pub fn summaries() -> Vec<CatalogSummary> {
    names()
        .iter()
        .filter_map(|n| by_name(n))
        .map(CatalogSummary::from)
        .collect()
}
