//! Handler for `scan`: the startup scan without starting the keeper.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::application::{Bootstrapper, SeedReport};
use crate::domain::Order;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::{build_gateway, SignerRequirement};
use crate::port::{Clock, SystemClock};

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "Id")]
    id: u64,
    #[tabled(rename = "Phase")]
    phase: &'static str,
    #[tabled(rename = "Slices")]
    slices: String,
    #[tabled(rename = "Next Slice")]
    next_slice: String,
    #[tabled(rename = "Due In")]
    due_in: String,
}

impl OrderRow {
    fn new(order: &Order, now: u64) -> Self {
        let due_in = match order.due_in(now) {
            0 => "now".to_string(),
            secs => format!("{secs}s"),
        };
        Self {
            id: order.id.value(),
            phase: order.phase(now).as_str(),
            slices: format!("{}/{}", order.slices_executed, order.total_slices()),
            next_slice: output::timestamp(order.next_execution_time),
            due_in,
        }
    }
}

/// Scan the contract and list the orders the keeper would track.
pub async fn execute(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let gateway = build_gateway(&config, SignerRequirement::Optional).await?;
    let clock = Arc::new(SystemClock);
    let now = clock.now();

    let report = Bootstrapper::new(Arc::new(gateway), clock).scan().await?;

    if output::is_json() {
        output::json_output(report_json(&report, now));
        return Ok(());
    }

    output::section("Order Scan");
    output::field("Orders", report.scanned);
    output::field("Trackable", report.eligible.len());

    if !report.failed.is_empty() {
        let ids: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
        output::warning(&format!("Could not fetch orders {}", ids.join(", ")));
    }

    if report.eligible.is_empty() {
        output::success("No orders need a keeper right now");
        return Ok(());
    }

    let rows: Vec<OrderRow> = report
        .eligible
        .iter()
        .map(|order| OrderRow::new(order, now))
        .collect();
    output::table(&Table::new(rows).to_string());

    Ok(())
}

fn report_json(report: &SeedReport, now: u64) -> serde_json::Value {
    let orders: Vec<serde_json::Value> = report
        .eligible
        .iter()
        .map(|order| {
            json!({
                "id": order.id,
                "phase": order.phase(now),
                "slices_executed": order.slices_executed,
                "total_slices": order.total_slices(),
                "next_execution_time": order.next_execution_time,
                "due_in_secs": order.due_in(now),
            })
        })
        .collect();

    json!({
        "command": "scan",
        "scanned": report.scanned,
        "failed": report.failed,
        "orders": orders,
    })
}
