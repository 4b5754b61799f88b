use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests flow through to the dependency
    Closed,
    /// Dependency assumed down; requests fail fast
    Open,
    /// Cooldown elapsed; trial requests probe the dependency
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Failures within `failure_window` before the circuit opens
    pub failure_threshold: u32,
    /// Rolling window for counting failures
    pub failure_window: Duration,
    /// How long the circuit stays open before probing
    pub open_cooldown: Duration,
    /// Successes in half-open state before closing
    pub half_open_successes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(60),
            open_cooldown: Duration::from_secs(30),
            half_open_successes: 2,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failures: Vec<Instant>,
    half_open_successes: u32,
    state_changed_at: Instant,
}

/// Per-dependency circuit breaker. Owned by whoever guards the dependency,
/// never registered globally, so tests can run independent instances.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failures: Vec::new(),
                half_open_successes: 0,
                state_changed_at: Instant::now(),
            }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Run `operation` under the breaker. When the circuit is open the
    /// operation is never started and an error is returned immediately;
    /// otherwise the operation's outcome is recorded against the breaker.
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.try_acquire() {
            return Err(anyhow!(
                "circuit breaker '{}' is open (failing fast)",
                self.name
            ));
        }

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(err)
            }
        }
    }

    /// Routing decision: may a call proceed right now? Open circuits flip to
    /// half-open once the cooldown has elapsed.
    fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if inner.state_changed_at.elapsed() >= self.config.open_cooldown {
                    tracing::debug!(
                        breaker = %self.name,
                        "cooldown elapsed, transitioning from Open to HalfOpen"
                    );
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_successes = 0;
                    inner.state_changed_at = Instant::now();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.half_open_successes {
                    tracing::debug!(
                        breaker = %self.name,
                        successes = inner.half_open_successes,
                        "transitioning from HalfOpen to Closed"
                    );
                    inner.state = BreakerState::Closed;
                    inner.failures.clear();
                    inner.half_open_successes = 0;
                    inner.state_changed_at = Instant::now();
                }
            }
            BreakerState::Closed => {
                let now = Instant::now();
                let window = self.config.failure_window;
                inner.failures.retain(|&at| now.duration_since(at) < window);
            }
            // Unreachable in practice: open circuits reject before calling
            BreakerState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        match inner.state {
            BreakerState::HalfOpen => {
                tracing::warn!(
                    breaker = %self.name,
                    "probe failed in HalfOpen state, reopening circuit"
                );
                inner.state = BreakerState::Open;
                inner.half_open_successes = 0;
                inner.state_changed_at = now;
            }
            BreakerState::Closed => {
                let window = self.config.failure_window;
                inner.failures.push(now);
                inner.failures.retain(|&at| now.duration_since(at) < window);

                if inner.failures.len() as u32 >= self.config.failure_threshold {
                    tracing::error!(
                        breaker = %self.name,
                        failures = inner.failures.len(),
                        threshold = self.config.failure_threshold,
                        "failure threshold exceeded, opening circuit"
                    );
                    inner.state = BreakerState::Open;
                    inner.state_changed_at = now;
                }
            }
            BreakerState::Open => {}
        }
    }

    /// Reset to closed with all counters cleared.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        tracing::debug!(breaker = %self.name, "manually resetting circuit breaker");
        inner.state = BreakerState::Closed;
        inner.failures.clear();
        inner.half_open_successes = 0;
        inner.state_changed_at = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> BreakerConfig {
        BreakerConfig {
            failure_threshold: 3,
            failure_window: Duration::from_secs(60),
            open_cooldown: Duration::from_millis(50),
            half_open_successes: 2,
        }
    }

    #[tokio::test]
    async fn closed_to_open_on_threshold() {
        let cb = CircuitBreaker::new("test", fast_config());
        assert_eq!(cb.state(), BreakerState::Closed);

        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        }

        assert_eq!(cb.state(), BreakerState::Open);
    }

    #[tokio::test]
    async fn open_short_circuits_without_calling() {
        let cb = CircuitBreaker::new("test", fast_config());
        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        }
        assert_eq!(cb.state(), BreakerState::Open);

        let attempts = AtomicU32::new(0);
        let result = cb
            .call(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<(), _>(())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
        assert!(result.unwrap_err().to_string().contains("is open"));
    }

    #[tokio::test]
    async fn open_to_half_open_after_cooldown() {
        let cb = CircuitBreaker::new("test", fast_config());
        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        }
        assert_eq!(cb.state(), BreakerState::Open);

        tokio::time::sleep(Duration::from_millis(60)).await;

        let _ = cb.call(|| async { Ok::<(), anyhow::Error>(()) }).await;
        assert_eq!(cb.state(), BreakerState::HalfOpen);
    }

    #[tokio::test]
    async fn half_open_to_closed_on_successes() {
        let cb = CircuitBreaker::new("test", fast_config());
        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
        let _ = cb.call(|| async { Ok::<(), anyhow::Error>(()) }).await;
        let _ = cb.call(|| async { Ok::<(), anyhow::Error>(()) }).await;

        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens() {
        let cb = CircuitBreaker::new("test", fast_config());
        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
        let _ = cb.call(|| async { Ok::<(), anyhow::Error>(()) }).await;
        assert_eq!(cb.state(), BreakerState::HalfOpen);

        let _ = cb.call(|| async { Err::<(), _>(anyhow!("still down")) }).await;
        assert_eq!(cb.state(), BreakerState::Open);
    }

    #[tokio::test]
    async fn reset_closes_circuit() {
        let cb = CircuitBreaker::new(
            "test",
            BreakerConfig {
                failure_threshold: 1,
                ..fast_config()
            },
        );

        let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        assert_eq!(cb.state(), BreakerState::Open);

        cb.reset();
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn success_prunes_stale_failures() {
        let cb = CircuitBreaker::new(
            "test",
            BreakerConfig {
                failure_threshold: 3,
                failure_window: Duration::from_millis(30),
                open_cooldown: Duration::from_millis(50),
                half_open_successes: 1,
            },
        );

        let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        // Earlier failures fell out of the window, so a third does not open
        let _ = cb.call(|| async { Err::<(), _>(anyhow!("boom")) }).await;
        assert_eq!(cb.state(), BreakerState::Closed);
    }
}
