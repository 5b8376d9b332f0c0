use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{RateError, RateProvider};
use crate::domain::RateQuote;

/// Provider that always answers with the same quote, optionally after a delay.
/// Useful offline and in tests.
#[derive(Debug, Default)]
pub struct FixedRateProvider {
    quote: RateQuote,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixedRateProvider {
    pub fn new(quote: RateQuote) -> Self {
        Self {
            quote,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn name(&self) -> &'static str {
        "FIXED"
    }

    async fn lookup(&self) -> Result<RateQuote, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.quote.clone())
    }
}
