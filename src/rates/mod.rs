//! Exchange rate lookup.
//!
//! A [`RateProvider`] is the external collaborator the rate updater calls.
//! It takes no request parameters and answers with a [`RateQuote`]: an
//! optional rate plus the sources it was derived from.

mod fixed;
mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RateQuote;

pub use fixed::FixedRateProvider;
pub use http::HttpRateProvider;

/// Errors that can occur while looking up a rate.
#[derive(Error, Debug)]
pub enum RateError {
    #[error("Rate lookup already in progress")]
    AlreadyUpdating,

    #[error("Rate lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid rate service response: {0}")]
    InvalidResponse(String),

    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source of exchange rate quotes.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Look up the current rate. A quote with `rate: None` means the
    /// service answered but could not determine a rate.
    async fn lookup(&self) -> Result<RateQuote, RateError>;
}
