//! Handler for `order <ID>`.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::domain::{Order, OrderId};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::{build_gateway, SignerRequirement};
use crate::port::{ChainGateway, Clock, SystemClock};

/// Fetch one order and print it with its derived phase.
pub async fn execute(id: u64, path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let gateway = build_gateway(&config, SignerRequirement::Optional).await?;
    let order = gateway.fetch_order(OrderId::new(id)).await?;
    let now = SystemClock.now();

    if output::is_json() {
        output::json_output(order_json(&order, now));
        return Ok(());
    }

    print_order(&order, now);
    Ok(())
}

fn order_json(order: &Order, now: u64) -> serde_json::Value {
    json!({
        "order": order,
        "total_slices": order.total_slices(),
        "remaining_slices": order.remaining_slices(),
        "end_time": order.end_time(),
        "phase": order.phase(now),
        "due": order.is_due(now),
    })
}

fn print_order(order: &Order, now: u64) {
    output::section(&format!("Order {}", order.id));
    output::field("Phase", output::highlight(order.phase(now)));
    output::field("Creator", order.creator);
    output::field("Token in", order.token_in);
    output::field("Token out", order.token_out);
    output::field("Total amount", order.total_amount);
    output::field("Slice size", order.slice_size);
    output::field(
        "Slices",
        format!("{} / {}", order.slices_executed, order.total_slices()),
    );
    output::field("Interval", format!("{}s", order.interval));
    output::field("Start", output::timestamp(order.start_time));
    output::field("End", output::timestamp(order.end_time()));
    output::field("Next slice", output::timestamp(order.next_execution_time));
    output::field("Total out", order.total_out);
    output::field("Cancelled", order.cancelled);

    if order.is_due(now) && !order.phase(now).is_terminal() {
        output::hint("a slice is due now");
    }
}
