//! Request pacing for upstream data sources.

use crate::domain::error::PivotError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use crate::ports::rate_limit_port::RateLimiter;
use chrono::NaiveDate;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Keeps at least `delay` between consecutive requests. The first request
/// goes through immediately.
#[derive(Debug)]
pub struct FixedDelayLimiter {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl FixedDelayLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl RateLimiter for FixedDelayLimiter {
    fn acquire(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let wait = self.delay.saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }
}

/// A [`DataPort`] that paces every series fetch through a [`RateLimiter`].
pub struct ThrottledDataPort<P, R> {
    inner: P,
    limiter: R,
}

impl<P: DataPort, R: RateLimiter> ThrottledDataPort<P, R> {
    pub fn new(inner: P, limiter: R) -> Self {
        Self { inner, limiter }
    }
}

impl<P: DataPort, R: RateLimiter> DataPort for ThrottledDataPort<P, R> {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, PivotError> {
        self.limiter.acquire();
        self.inner.fetch_series(symbol, start_date, end_date)
    }

    fn list_symbols(&self) -> Result<Vec<String>, PivotError> {
        self.inner.list_symbols()
    }
}
