//! Order contract ABI and conversions into domain types.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;

use crate::domain::{Order, OrderCreated, OrderId};
use crate::error::ChainError;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract ITwapOrders {
        struct OrderData {
            uint256 orderId;
            address creator;
            address tokenIn;
            address tokenOut;
            uint256 totalAmount;
            uint256 interval;
            uint256 duration;
            uint256 sliceSize;
            uint256 maxSlippageBps;
            uint256 poolFee;
            uint256 startTime;
            uint256 slicesExecuted;
            uint256 nextExecutionTime;
            uint256 totalOut;
            bool cancelled;
        }

        event OrderCreated(
            uint256 indexed orderId,
            address indexed creator,
            address tokenIn,
            address tokenOut,
            uint256 totalAmount,
            uint256 duration,
            uint256 interval,
            uint256 sliceSize
        );

        function getOrder(uint256 orderId) external view returns (OrderData memory);
        function nextOrderId() external view returns (uint256);
        function executeSlice(uint256 orderId) external;
    }
}

/// Narrow a `uint256` field that the keeper treats as a 64-bit quantity.
fn narrow(what: &'static str, value: U256) -> Result<u64, ChainError> {
    u64::try_from(value).map_err(|_| ChainError::Decode {
        what,
        reason: format!("{value} does not fit in 64 bits"),
    })
}

/// Decode a `getOrder` result for the requested id.
///
/// The contract returns a zeroed struct for ids it never issued; a zero
/// creator is therefore reported as [`ChainError::OrderNotFound`].
pub fn order_from_abi(id: OrderId, raw: ITwapOrders::OrderData) -> Result<Order, ChainError> {
    if raw.creator == Address::ZERO {
        return Err(ChainError::OrderNotFound(id));
    }

    Ok(Order {
        id,
        creator: raw.creator,
        token_in: raw.tokenIn,
        token_out: raw.tokenOut,
        total_amount: raw.totalAmount,
        interval: narrow("interval", raw.interval)?,
        duration: narrow("duration", raw.duration)?,
        slice_size: raw.sliceSize,
        max_slippage_bps: raw.maxSlippageBps,
        pool_fee: raw.poolFee,
        start_time: narrow("startTime", raw.startTime)?,
        slices_executed: narrow("slicesExecuted", raw.slicesExecuted)?,
        next_execution_time: narrow("nextExecutionTime", raw.nextExecutionTime)?,
        total_out: raw.totalOut,
        cancelled: raw.cancelled,
    })
}

/// Decode an `OrderCreated` log payload.
pub fn order_created_from_abi(
    event: &ITwapOrders::OrderCreated,
    block_number: Option<u64>,
    transaction_hash: Option<B256>,
) -> Result<OrderCreated, ChainError> {
    let order_id = OrderId::from_u256(event.orderId).ok_or_else(|| ChainError::Decode {
        what: "OrderCreated.orderId",
        reason: format!("{} does not fit in 64 bits", event.orderId),
    })?;

    Ok(OrderCreated {
        order_id,
        creator: event.creator,
        token_in: event.tokenIn,
        token_out: event.tokenOut,
        total_amount: event.totalAmount,
        duration: narrow("OrderCreated.duration", event.duration)?,
        interval: narrow("OrderCreated.interval", event.interval)?,
        slice_size: event.sliceSize,
        block_number,
        transaction_hash,
    })
}
