use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::domain::RateQuote;
use crate::rates::{RateError, RateProvider};

/// Upper bound on a single lookup when no timeout is configured.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterState {
    Idle,
    Updating,
}

/// Runs rate lookups one at a time.
///
/// While a lookup is in flight the updater reports [`UpdaterState::Updating`]
/// and any further `refresh` call is rejected with
/// [`RateError::AlreadyUpdating`] without reaching the provider. Each lookup
/// is bounded by a timeout; there is no retry.
pub struct RateUpdater<P> {
    provider: P,
    timeout: Duration,
    in_progress: AtomicBool,
}

impl<P: RateProvider> RateUpdater<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_REFRESH_TIMEOUT,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> UpdaterState {
        if self.is_updating() {
            UpdaterState::Updating
        } else {
            UpdaterState::Idle
        }
    }

    pub fn is_updating(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Perform a single lookup. Returns to Idle when the call completes,
    /// fails, times out, or the returned future is dropped.
    pub async fn refresh(&self) -> Result<RateQuote, RateError> {
        let _guard = UpdatingGuard::acquire(&self.in_progress).ok_or(RateError::AlreadyUpdating)?;
        debug!(provider = self.provider.name(), "rate refresh started");

        match tokio::time::timeout(self.timeout, self.provider.lookup()).await {
            Ok(result) => result,
            Err(_) => Err(RateError::Timeout(self.timeout)),
        }
    }
}

/// Holds the in-progress flag for the lifetime of one lookup.
struct UpdatingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UpdatingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
