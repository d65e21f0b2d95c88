//! Uniform retry policy for HTTP requests and remote SSH invocations

use std::thread;
use std::time::Duration;

use log::warn;

use crate::error::{InstallerError, Result};

/// How many times to attempt an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Build from the `--retry <N> <DELAY>` flag values
    pub fn from_flag(values: Option<&[u64]>) -> Self {
        match values {
            Some([attempts, delay]) => Self::new(
                u32::try_from(*attempts).unwrap_or(u32::MAX),
                Duration::from_secs(*delay),
            ),
            _ => Self::default(),
        }
    }

    /// Run `op` until it succeeds, fails with an error `retryable` rejects,
    /// or the attempts run out. The last error is returned.
    pub fn run<T>(
        &self,
        what: &str,
        retryable: impl Fn(&InstallerError) -> bool,
        mut op: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && retryable(&err) => {
                    warn!("{what} failed (attempt {attempt}/{attempts}): {err}; retrying");
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
