//! Waiter - Block until a remote object reaches a target state
//!
//! A [`StateChangeConf`] repeatedly invokes a status probe until the observed
//! state is one of the target states, the timeout elapses, or the probe fails.
//! Probes never retry on their own; the cadence lives here.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default number of consecutive "gone" observations tolerated while waiting
/// for a non-empty target set
pub const DEFAULT_NOT_FOUND_CHECKS: usize = 20;

/// First backoff step between probes
const INITIAL_WAIT: Duration = Duration::from_millis(100);

/// Upper bound of the backoff between probes
const MAX_WAIT: Duration = Duration::from_secs(10);

/// Result of a single status probe
#[derive(Debug, Clone, PartialEq)]
pub struct Observed<T> {
    pub object: Option<T>,
    pub state: String,
}

impl<T> Observed<T> {
    /// The object exists and is in `state`
    pub fn found(object: T, state: impl Into<String>) -> Self {
        Self {
            object: Some(object),
            state: state.into(),
        }
    }

    /// The object no longer exists
    pub fn gone() -> Self {
        Self {
            object: None,
            state: String::new(),
        }
    }

    /// No object, but the probe reports a sentinel state (e.g. "deleted")
    pub fn sentinel(state: impl Into<String>) -> Self {
        Self {
            object: None,
            state: state.into(),
        }
    }

    pub fn is_gone(&self) -> bool {
        self.object.is_none() && self.state.is_empty()
    }
}

/// Errors returned by [`StateChangeConf::wait`]
#[derive(Debug, thiserror::Error)]
pub enum WaitError<E> {
    #[error(
        "timeout while waiting for state to become '{}' (last state: '{last_state}', timeout: {timeout:?})",
        target.join(", ")
    )]
    Timeout {
        last_state: String,
        target: Vec<String>,
        timeout: Duration,
    },

    #[error("unexpected state '{state}', wanted target '{}'", target.join(", "))]
    UnexpectedState { state: String, target: Vec<String> },

    #[error("couldn't find resource ({retries} retries)")]
    NotFound { retries: usize },

    #[error(transparent)]
    Probe(E),
}

/// Parameters of a state-change wait
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    /// Transitional states; observing one keeps the waiter polling
    pub pending: Vec<String>,
    /// Terminal states; an empty set means "wait until the object is gone"
    pub target: Vec<String>,
    /// Overall deadline
    pub timeout: Duration,
    /// Sleep before the first probe
    pub delay: Duration,
    /// Lower bound for the sleep between probes
    pub min_timeout: Duration,
    /// Fixed interval between probes; disables backoff when set
    pub poll_interval: Option<Duration>,
    /// Gone observations tolerated before failing (non-empty target only)
    pub not_found_checks: usize,
    /// Target observations in a row required to succeed
    pub continuous_target_occurrence: usize,
}

impl StateChangeConf {
    pub fn new<P, T>(pending: &[P], target: &[T], timeout: Duration) -> Self
    where
        P: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            pending: pending.iter().map(|s| s.as_ref().to_string()).collect(),
            target: target.iter().map(|s| s.as_ref().to_string()).collect(),
            timeout,
            delay: Duration::ZERO,
            min_timeout: Duration::ZERO,
            poll_interval: None,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_not_found_checks(mut self, checks: usize) -> Self {
        self.not_found_checks = checks;
        self
    }

    /// Poll `refresh` until a target state is reached.
    ///
    /// Returns the last observed object (None when the wait ended because the
    /// object is gone or reported a sentinel state).
    pub async fn wait<T, E, F, Fut>(&self, mut refresh: F) -> Result<Option<T>, WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observed<T>, E>>,
    {
        let mut last_state = String::new();
        let outcome = tokio::time::timeout(self.timeout, self.poll(&mut refresh, &mut last_state))
            .await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(WaitError::Timeout {
                last_state,
                target: self.target.clone(),
                timeout: self.timeout,
            }),
        }
    }

    async fn poll<T, E, F, Fut>(
        &self,
        refresh: &mut F,
        last_state: &mut String,
    ) -> Result<Option<T>, WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observed<T>, E>>,
    {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut wait = INITIAL_WAIT;
        let mut not_found_ticks = 0;
        let mut target_occurrences = 0;

        loop {
            let observed = refresh().await.map_err(WaitError::Probe)?;

            if observed.is_gone() {
                target_occurrences = 0;
                if self.target.is_empty() {
                    return Ok(None);
                }
                not_found_ticks += 1;
                if not_found_ticks > self.not_found_checks {
                    return Err(WaitError::NotFound {
                        retries: not_found_ticks - 1,
                    });
                }
            } else {
                not_found_ticks = 0;
                if observed.state != *last_state {
                    log::debug!(
                        "state changed from '{}' to '{}'",
                        last_state,
                        observed.state
                    );
                }
                *last_state = observed.state.clone();

                if self.target.contains(&observed.state) {
                    target_occurrences += 1;
                    if target_occurrences >= self.continuous_target_occurrence {
                        return Ok(observed.object);
                    }
                } else if self.pending.contains(&observed.state) {
                    target_occurrences = 0;
                } else {
                    return Err(WaitError::UnexpectedState {
                        state: observed.state,
                        target: self.target.clone(),
                    });
                }
            }

            let sleep_for = match self.poll_interval {
                Some(interval) => interval,
                None => {
                    let current = wait.max(self.min_timeout);
                    wait = (wait * 2).min(MAX_WAIT);
                    current
                }
            };
            tokio::time::sleep(sleep_for).await;
        }
    }
}

impl fmt::Display for StateChangeConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] -> [{}] within {:?}",
            self.pending.join(", "),
            self.target.join(", "),
            self.timeout
        )
    }
}
