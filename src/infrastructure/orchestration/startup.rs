//! Startup connectivity check.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ChainError, Result};
use crate::port::{ChainGateway, Clock, NodeStatus};

/// Seconds between the head block's timestamp and `now`.
#[must_use]
pub fn block_age(status: &NodeStatus, now: u64) -> u64 {
    now.saturating_sub(status.latest_block_timestamp)
}

/// Query the node and decide whether the keeper may start.
///
/// Warns, without failing, when the head block is older than
/// `stale_after` or the node reports block 0.
///
/// # Errors
///
/// Fails when the node stays unreachable past the gateway's retry budget or
/// reports a chain id other than `expected_chain_id`.
pub async fn verify_node(
    gateway: &dyn ChainGateway,
    clock: &dyn Clock,
    expected_chain_id: Option<u64>,
    stale_after: Duration,
) -> Result<NodeStatus> {
    let status = gateway.node_status().await?;

    if let Some(configured) = expected_chain_id {
        if configured != status.chain_id {
            return Err(ChainError::ChainIdMismatch {
                configured,
                actual: status.chain_id,
            }
            .into());
        }
    }

    let age = block_age(&status, clock.now());
    info!(
        chain = gateway.chain_name(),
        chain_id = status.chain_id,
        latest_block = status.latest_block,
        block_age_secs = age,
        "Connected to node"
    );

    if status.latest_block == 0 {
        warn!("Node reports block 0, it may still be syncing");
    }
    if age > stale_after.as_secs() {
        warn!(
            block_age_secs = age,
            threshold_secs = stale_after.as_secs(),
            "Latest block is stale, node may be out of sync"
        );
    }

    match gateway.signer_address() {
        Some(address) => info!(signer = %address, "Signing slices as"),
        None => warn!("No signer configured, slices cannot be submitted"),
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::chain::{ManualClock, MockChain};

    const STALE: Duration = Duration::from_secs(900);

    fn status(chain_id: u64, timestamp: u64) -> NodeStatus {
        NodeStatus {
            chain_id,
            latest_block: 42,
            latest_block_timestamp: timestamp,
        }
    }

    #[tokio::test]
    async fn accepts_matching_chain_id() {
        let chain = MockChain::new();
        chain.set_node_status(status(31_337, 10_000));
        let clock = ManualClock::new(10_005);

        let reported = verify_node(&chain, &clock, Some(31_337), STALE).await.unwrap();
        assert_eq!(reported.latest_block, 42);
    }

    #[tokio::test]
    async fn rejects_chain_id_mismatch() {
        let chain = MockChain::new();
        chain.set_node_status(status(1, 10_000));
        let clock = ManualClock::new(10_000);

        let result = verify_node(&chain, &clock, Some(31_337), STALE).await;
        assert!(matches!(
            result,
            Err(Error::Chain(ChainError::ChainIdMismatch {
                configured: 31_337,
                actual: 1
            }))
        ));
    }

    #[tokio::test]
    async fn stale_head_only_warns() {
        let chain = MockChain::new();
        chain.set_node_status(status(31_337, 1_000));
        let clock = ManualClock::new(100_000);

        assert!(verify_node(&chain, &clock, None, STALE).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_node_fails_startup() {
        let chain = MockChain::new();
        chain.set_offline(true);
        let clock = ManualClock::new(0);

        let result = verify_node(&chain, &clock, None, STALE).await;
        assert!(matches!(
            result,
            Err(Error::Chain(ChainError::Unavailable { .. }))
        ));
    }

    #[test]
    fn block_age_saturates_for_future_timestamps() {
        assert_eq!(block_age(&status(1, 2_000), 1_000), 0);
        assert_eq!(block_age(&status(1, 1_000), 1_900), 900);
    }
}
