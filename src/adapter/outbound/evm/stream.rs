//! `OrderCreated` log polling.
//!
//! Polls `eth_getLogs` over block ranges of at most `max_log_range` blocks,
//! so a keeper that fell far behind catches up in chunks instead of asking
//! for a span the node rejects. The cursor advances after each chunk has been
//! fetched completely, so a failed poll is simply repeated on the next
//! subscription. Logs that were fetched but not yet handed out stay buffered
//! across resubscriptions.

use std::collections::VecDeque;
use std::time::Duration;

use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::contract::{order_created_from_abi, ITwapOrders};
use super::error::from_rpc;
use crate::domain::OrderCreated;
use crate::error::{ChainError, Error, Result};
use crate::port::{OrderEventStream, StreamEvent};

/// Default cap on the blocks spanned by one `eth_getLogs` request.
pub const DEFAULT_MAX_LOG_RANGE: u64 = 2_000;

/// Polling source of `OrderCreated` events for one contract.
pub struct EvmOrderStream {
    provider: DynProvider,
    contract: Address,
    poll_interval: Duration,
    request_timeout: Duration,
    max_log_range: u64,
    /// First block not yet fetched. `None` until the first subscription.
    next_block: Option<u64>,
    buffered: VecDeque<OrderCreated>,
}

impl EvmOrderStream {
    pub fn new(
        provider: DynProvider,
        contract: Address,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            contract,
            poll_interval,
            request_timeout,
            max_log_range: DEFAULT_MAX_LOG_RANGE,
            next_block: None,
            buffered: VecDeque::new(),
        }
    }

    /// Cap the blocks spanned by one `eth_getLogs` request.
    #[must_use]
    pub fn with_max_log_range(mut self, blocks: u64) -> Self {
        self.max_log_range = blocks;
        self
    }

    /// Start from `block` instead of the chain head.
    #[must_use]
    pub fn from_block(mut self, block: u64) -> Self {
        self.next_block = Some(block);
        self
    }

    async fn head(&self) -> Result<u64> {
        match timeout(self.request_timeout, self.provider.get_block_number()).await {
            Ok(head) => head.map_err(|e| from_rpc("eth_blockNumber", &e).into()),
            Err(_) => Err(ChainError::timed_out("eth_blockNumber", self.request_timeout).into()),
        }
    }

    /// Fetch the next chunk of logs and buffer them.
    ///
    /// Returns `true` once the cursor has passed the current head.
    async fn poll(&mut self) -> Result<bool> {
        let head = self.head().await?;
        let from = match self.next_block {
            Some(from) => from,
            None => {
                self.next_block = Some(head);
                head
            }
        };
        if from > head {
            return Ok(true);
        }
        let to = range_end(from, head, self.max_log_range);

        let filter = Filter::new()
            .address(self.contract)
            .event_signature(ITwapOrders::OrderCreated::SIGNATURE_HASH)
            .from_block(from)
            .to_block(to);

        let logs = match timeout(self.request_timeout, self.provider.get_logs(&filter)).await {
            Ok(logs) => logs.map_err(|e| Error::from(from_rpc("eth_getLogs", &e)))?,
            Err(_) => return Err(ChainError::timed_out("eth_getLogs", self.request_timeout).into()),
        };

        debug!(from, to, head, logs = logs.len(), "Polled OrderCreated logs");

        for log in logs {
            let block_number = log.block_number;
            let transaction_hash = log.transaction_hash;
            let decoded = match log.log_decode::<ITwapOrders::OrderCreated>() {
                Ok(decoded) => decoded,
                Err(e) => {
                    error!(
                        block_number,
                        error = %e,
                        expected = ITwapOrders::OrderCreated::SIGNATURE,
                        "Skipping undecodable OrderCreated log, check the contract ABI"
                    );
                    continue;
                }
            };
            match order_created_from_abi(&decoded.inner.data, block_number, transaction_hash) {
                Ok(event) => self.buffered.push_back(event),
                Err(e) => warn!(block_number, error = %e, "Skipping OrderCreated log"),
            }
        }

        self.next_block = Some(to + 1);
        Ok(to >= head)
    }
}

/// Last block of the window starting at `from`, spanning at most `max_range`
/// blocks and never past `head`.
fn range_end(from: u64, head: u64, max_range: u64) -> u64 {
    from.saturating_add(max_range.max(1) - 1).min(head)
}

#[async_trait]
impl OrderEventStream for EvmOrderStream {
    async fn subscribe(&mut self) -> Result<()> {
        let head = self.head().await?;
        let from = *self.next_block.get_or_insert(head);
        info!(
            contract = %self.contract,
            from_block = from,
            head,
            "Subscribed to OrderCreated logs"
        );
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                return Some(StreamEvent::OrderCreated(event));
            }

            let caught_up = match self.poll().await {
                Ok(caught_up) => caught_up,
                Err(e) => {
                    return Some(StreamEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            };

            if caught_up && self.buffered.is_empty() {
                sleep(self.poll_interval).await;
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "evm-logs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_capped_at_the_range() {
        assert_eq!(range_end(100, 10_000, 2_000), 2_099);
        assert_eq!(range_end(2_100, 10_000, 2_000), 4_099);
    }

    #[test]
    fn last_window_stops_at_head() {
        assert_eq!(range_end(9_000, 10_000, 2_000), 10_000);
        assert_eq!(range_end(8_001, 10_000, 2_000), 10_000);
        assert_eq!(range_end(10_000, 10_000, 2_000), 10_000);
    }

    #[test]
    fn single_block_windows() {
        assert_eq!(range_end(7, 10, 1), 7);
        assert_eq!(range_end(7, 10, 0), 7);
    }

    #[test]
    fn window_end_saturates() {
        assert_eq!(range_end(u64::MAX - 1, u64::MAX, 2_000), u64::MAX);
    }
}
