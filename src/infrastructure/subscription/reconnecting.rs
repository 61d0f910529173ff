//! Reconnecting wrapper for [`OrderEventStream`].
//!
//! Resubscribes any event stream after a disconnect, with exponential backoff
//! plus jitter, and opens a circuit breaker after too many consecutive
//! failures so a dead node is not hammered.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::{OrderEventStream, StreamEvent};

/// Circuit breaker state for resubscription attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    /// Attempts are allowed.
    Closed,
    /// Too many consecutive failures; attempts blocked until `until`.
    Open { until: Instant },
}

/// Wrapper that adds automatic resubscription to any [`OrderEventStream`].
///
/// `Disconnected` items and premature ends of the inner stream are absorbed:
/// the wrapper backs off, resubscribes and keeps reading. Consumers only see
/// `OrderCreated` events.
pub struct ReconnectingOrderStream<S: OrderEventStream> {
    inner: S,
    config: ReconnectionConfig,
    consecutive_failures: u32,
    current_delay_ms: u64,
    circuit_state: CircuitState,
    connected: bool,
}

impl<S: OrderEventStream> ReconnectingOrderStream<S> {
    /// Wrap `inner`. Call [`subscribe`](OrderEventStream::subscribe) before
    /// reading events.
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            inner,
            config,
            consecutive_failures: 0,
            current_delay_ms: initial_delay,
            circuit_state: CircuitState::Closed,
            connected: false,
        }
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
        self.circuit_state = CircuitState::Closed;
    }

    /// Current delay plus up to 20% jitter; advances the delay for next time.
    fn next_delay(&mut self) -> Duration {
        let base_ms = self.current_delay_ms;
        let jitter_ms = match base_ms / 5 {
            0 => 0,
            range => rand::thread_rng().gen_range(0..=range),
        };

        let next = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next.min(self.config.max_delay_ms);

        Duration::from_millis(base_ms + jitter_ms)
    }

    fn circuit_allows_attempt(&mut self) -> bool {
        match self.circuit_state {
            CircuitState::Closed => true,
            CircuitState::Open { until } if Instant::now() >= until => {
                info!("Circuit breaker cooldown expired, allowing resubscription");
                self.reset_backoff();
                true
            }
            CircuitState::Open { .. } => false,
        }
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.connected = false;

        if self.consecutive_failures >= self.config.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
            self.circuit_state = CircuitState::Open {
                until: Instant::now() + cooldown,
            };
            error!(
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing resubscription attempts"
            );
        }
    }

    async fn reconnect(&mut self) -> Result<(), Error> {
        if !self.circuit_allows_attempt() {
            if let CircuitState::Open { until } = self.circuit_state {
                let remaining = until.saturating_duration_since(Instant::now());
                warn!(
                    remaining_secs = remaining.as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                sleep(remaining).await;
                self.reset_backoff();
            }
        }

        let delay = self.next_delay();
        info!(
            source = self.inner.source_name(),
            delay_ms = delay.as_millis() as u64,
            attempt = self.consecutive_failures + 1,
            "Resubscribing after delay"
        );
        sleep(delay).await;

        match self.inner.subscribe().await {
            Ok(()) => {
                info!(source = self.inner.source_name(), "Resubscribed");
                self.connected = true;
                self.reset_backoff();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Resubscription failed");
                self.record_failure();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: OrderEventStream> OrderEventStream for ReconnectingOrderStream<S> {
    async fn subscribe(&mut self) -> Result<(), Error> {
        let result = self.inner.subscribe().await;
        if result.is_ok() {
            self.connected = true;
            self.reset_backoff();
        }
        result
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Resubscription attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_event().await {
                Some(StreamEvent::Disconnected { reason }) => {
                    warn!(reason = %reason, "Event feed lost, will resubscribe");
                    self.record_failure();
                }
                Some(event) => {
                    if self.consecutive_failures > 0 {
                        debug!("Event received after resubscription, resetting failure count");
                        self.reset_backoff();
                    }
                    return Some(event);
                }
                None => {
                    warn!("Event feed ended unexpectedly, will resubscribe");
                    self.record_failure();
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }
}
