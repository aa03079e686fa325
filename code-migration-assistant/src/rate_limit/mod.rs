//! Rate limiting utilities for the GitHub API.
//!
//! Pull request queries and creations go through the core API; before each
//! call the remaining quota is checked and, when nearly exhausted, the caller
//! sleeps until the window resets.

mod info;

pub use info::RateLimitInfo;

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Longest sleep before a call, even if the window resets later.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Calls left in the window below which the guard sleeps.
const LOW_QUOTA: u32 = 5;

/// Checks the current rate limit status for the core API.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        reset: core.reset,
        limit: u32::try_from(core.limit).unwrap_or(u32::MAX),
    })
}

/// How long to sleep before the next call, if at all.
///
/// `now` is in seconds since the Unix epoch. The wait is capped at one hour.
#[must_use]
pub fn required_wait(info: &RateLimitInfo, now: u64) -> Option<Duration> {
    if info.remaining >= LOW_QUOTA {
        return None;
    }
    match info.seconds_until_reset(now) {
        0 => None,
        secs => Some(Duration::from_secs(secs).min(MAX_WAIT)),
    }
}

/// Sleeps until the window resets when the quota is nearly used up.
/// Returns true if it slept.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(wait) = required_wait(info, now) else {
        debug!(remaining = info.remaining, limit = info.limit, "Rate limit ok");
        return false;
    };

    if wait == MAX_WAIT {
        warn!(reset = info.reset, "Rate limit reset is far away, capping wait");
    }
    info!(
        remaining = info.remaining,
        limit = info.limit,
        wait_secs = wait.as_secs(),
        "GitHub rate limit nearly exhausted, waiting for reset"
    );
    tokio::time::sleep(wait).await;
    true
}

/// Ensures sufficient rate limit before making core API calls.
///
/// A failing probe (some enterprise servers disable the endpoint) is logged
/// and does not block the call.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) {
    match check_core_rate_limit(octocrab).await {
        Ok(info) => {
            wait_if_needed(&info).await;
        }
        Err(e) => warn!(error = %e, "Unable to check GitHub rate limit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(remaining: u32, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            reset,
            limit: 5_000,
        }
    }

    #[test]
    fn enough_quota_needs_no_wait() {
        assert_eq!(required_wait(&quota(100, 2_000), 1_000), None);
    }

    #[test]
    fn low_quota_waits_until_reset() {
        assert_eq!(
            required_wait(&quota(1, 1_030), 1_000),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn wait_is_capped() {
        assert_eq!(required_wait(&quota(0, 100_000), 1_000), Some(MAX_WAIT));
    }

    #[tokio::test]
    async fn passed_reset_does_not_sleep() {
        assert!(!wait_if_needed(&quota(1, 0)).await);
    }
}
