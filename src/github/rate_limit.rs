//! Rate limit snapshot attached to rate-limited GitHub failures.

/// Core rate limit counters reported by GitHub's `/rate_limit` endpoint.
///
/// # Example
///
/// ```
/// use lanesync::github::RateLimitInfo;
///
/// let info = RateLimitInfo::new(0, 1_700_000_000);
/// assert!(info.is_exhausted());
/// assert_eq!(info.reset_at(), 1_700_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit snapshot.
    #[must_use]
    pub const fn new(remaining: u32, reset_at: u64) -> Self {
        Self {
            remaining,
            reset_at,
        }
    }

    /// Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if no requests remain in the window.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
