//! Bounded retry with fixed delay and skip/suppress predicates.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, info};

use super::call_trace::{self, CallFrame};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Retry policy for a fallible operation.
///
/// - `skip(&fault)` aborts immediately with no result and no fault surfaced.
/// - `suppress(&fault)` swallows the fault after the final attempt.
///
/// A loop exit via skip or suppress yields `Ok(None)`; success yields
/// `Ok(Some(value))`; exhaustion re-raises the original fault.
pub struct RetryPolicy<E> {
    max_attempts: u32,
    delay: Duration,
    skip: Option<fn(&E) -> bool>,
    suppress: Option<fn(&E) -> bool>,
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl<E> RetryPolicy<E> {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            delay,
            skip: None,
            suppress: None,
        }
    }

    pub fn with_skip(mut self, skip: fn(&E) -> bool) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_suppress(mut self, suppress: fn(&E) -> bool) -> Self {
        self.suppress = Some(suppress);
        self
    }
}

impl<E: fmt::Display> RetryPolicy<E> {
    /// Runs `op` until it succeeds or the policy gives up. `name` labels the
    /// per-attempt log lines.
    pub async fn run<T, F, Fut>(&self, name: &str, mut op: F) -> Result<Option<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _frame = CallFrame::wrapper();
        let mut attempts: u32 = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(Some(value)),
                Err(fault) => {
                    call_trace::fault_handled();

                    // Checked before the attempt counter moves.
                    if self.skip.is_some_and(|skip| skip(&fault)) {
                        info!("Skip error: {}", fault);
                        return Ok(None);
                    }

                    attempts += 1;
                    debug!("{} > attempt {} failed", name, attempts);

                    if attempts >= self.max_attempts {
                        if self.suppress.is_some_and(|suppress| suppress(&fault)) {
                            info!("Suppress error: {}", fault);
                            return Ok(None);
                        }
                        call_trace::snapshot_frames();
                        return Err(fault);
                    }

                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
