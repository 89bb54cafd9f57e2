//! `infratest wait-http` – poll an endpoint until it serves the expected response.

use anyhow::Result;
use infratest_core::config::InfratestConfig;
use infratest_core::http_probe;

use crate::cli::PolicyArgs;

pub fn run_wait_http(
    cfg: &InfratestConfig,
    url: &str,
    status: u32,
    body: &str,
    policy_args: &PolicyArgs,
) -> Result<()> {
    let policy = policy_args.policy(&format!("HTTP GET {}", url), cfg)?;
    let resp = http_probe::http_get_with_retry(url, status, body, &policy)?.into_result()?;
    println!("{} answered HTTP {}", url, resp.status);
    Ok(())
}
