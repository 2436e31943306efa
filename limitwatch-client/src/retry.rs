use {
    crate::ClientError,
    derive_builder::Builder,
    log::{debug, warn},
    rand::RngExt,
    std::{
        thread::sleep,
        time::{Duration, Instant},
    },
};

const DEFAULT_MAX_ATTEMPTS: u32 = 8;
const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(600);
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Bounded retry with exponential backoff and jitter.
///
/// The wait before retry `n` (1-based) is drawn uniformly from `[d/2, d]` where `d = min(base_delay * 2^(n-1),
/// max_delay)`. A call is abandoned once `max_attempts` have been made or the next wait would take the call past
/// `max_elapsed`.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct RetryPolicy {
    max_attempts: u32,
    max_elapsed: Duration,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_elapsed: DEFAULT_MAX_ELAPSED,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicyBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

impl RetryPolicy {
    #[inline]
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound of the wait before retry `attempt`.
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// The jittered wait before retry `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(ceiling / 2..=ceiling))
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the policy is exhausted. `operation` names
    /// the call in log messages.
    pub fn run<T, F>(&self, operation: &str, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Result<T, ClientError>,
    {
        let start = Instant::now();
        let mut attempt = 1;

        loop {
            let error = match call() {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt >= self.max_attempts {
                warn!("{operation} failed after {attempt} attempts: {error}");
                return Err(error);
            }

            let delay = self.delay(attempt);
            if start.elapsed() + delay > self.max_elapsed {
                warn!("{operation} failed; retry budget of {:?} exhausted: {error}", self.max_elapsed);
                return Err(error);
            }

            debug!("{operation} attempt {attempt}/{} failed: {error}; retrying in {delay:?}", self.max_attempts);
            sleep(delay);
            attempt += 1;
        }
    }
}
