//! Mock [`OrderEventStream`] implementations for testing.
//!
//! - [`ScriptedStream`] - Pre-loaded subscribe results and events.
//!   Best for: error handling, resubscription logic, retry behavior.
//!
//! - [`ChannelStream`] - Channel-backed stream with external control handle.
//!   Best for: integration tests needing precise, on-demand event delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::port::{OrderEventStream, StreamEvent};

// ---------------------------------------------------------------------------
// ScriptedStream
// ---------------------------------------------------------------------------

/// A mock stream with scripted subscribe results and a fixed event queue.
///
/// Each call to `subscribe()` pops the next result from the queue (defaults
/// to `Ok(())` when exhausted). Once the event queue is empty, `next_event`
/// returns `None`.
pub struct ScriptedStream {
    subscribe_results: VecDeque<Result<()>>,
    events: VecDeque<Option<StreamEvent>>,
    subscribe_count: Arc<AtomicU32>,
    subscribe_delay: Duration,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            subscribe_results: VecDeque::new(),
            events: VecDeque::new(),
            subscribe_count: Arc::new(AtomicU32::new(0)),
            subscribe_delay: Duration::ZERO,
        }
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Option<StreamEvent>>) -> Self {
        self.events = events.into();
        self
    }

    /// Make every `subscribe()` take `delay` before it resolves.
    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = delay;
        self
    }

    /// Shared counter of finished subscribe calls, readable after the stream
    /// is moved.
    pub fn subscribe_counter(&self) -> Arc<AtomicU32> {
        self.subscribe_count.clone()
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderEventStream for ScriptedStream {
    async fn subscribe(&mut self) -> Result<()> {
        if !self.subscribe_delay.is_zero() {
            tokio::time::sleep(self.subscribe_delay).await;
        }
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.pop_front().flatten()
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// ChannelStream
// ---------------------------------------------------------------------------

/// A mock stream controlled externally via a [`ChannelStreamHandle`].
pub struct ChannelStream {
    event_rx: mpsc::Receiver<Option<StreamEvent>>,
    subscribe_count: Arc<AtomicU32>,
}

/// Control handle for a [`ChannelStream`].
pub struct ChannelStreamHandle {
    event_tx: mpsc::Sender<Option<StreamEvent>>,
    subscribe_count: Arc<AtomicU32>,
}

impl ChannelStreamHandle {
    /// Send an event to the stream.
    pub async fn send(&self, event: StreamEvent) {
        let _ = self.event_tx.send(Some(event)).await;
    }

    /// Signal end-of-stream (causes `next_event` to return `None`).
    pub async fn close(&self) {
        let _ = self.event_tx.send(None).await;
    }

    /// How many times `subscribe()` was called.
    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

/// Create a [`ChannelStream`] and its control [`ChannelStreamHandle`].
pub fn channel_stream(buffer: usize) -> (ChannelStream, ChannelStreamHandle) {
    let (tx, rx) = mpsc::channel(buffer);
    let count = Arc::new(AtomicU32::new(0));
    (
        ChannelStream {
            event_rx: rx,
            subscribe_count: count.clone(),
        },
        ChannelStreamHandle {
            event_tx: tx,
            subscribe_count: count,
        },
    )
}

#[async_trait]
impl OrderEventStream for ChannelStream {
    async fn subscribe(&mut self) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        match self.event_rx.recv().await {
            Some(Some(event)) => Some(event),
            Some(None) | None => None,
        }
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}
