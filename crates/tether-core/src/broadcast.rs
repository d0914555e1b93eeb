//! Hot multicast stream for process output.
//!
//! One writer (the listener task), any number of dynamically attaching
//! readers. Delivery is live-only by contract: a subscriber attached after a
//! line went out never receives that line, and nothing is buffered for
//! replay. Closing the broadcaster ends every open subscription cleanly.

use std::sync::Mutex;
use tether_proto::OutputLine;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Fan-out hub for [`OutputLine`]s.
pub struct OutputBroadcaster {
    // Taken on close; a taken sender is what ends all subscriptions.
    tx: Mutex<Option<broadcast::Sender<OutputLine>>>,
}

impl OutputBroadcaster {
    /// Creates a broadcaster whose ring retains up to `capacity` undelivered
    /// lines per subscriber before the subscriber is forced to skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Attaches a new subscriber.
    ///
    /// Only lines published after this call are delivered. Subscribing to a
    /// closed broadcaster yields a stream that ends immediately.
    pub fn subscribe(&self) -> OutputStream {
        if let Ok(guard) = self.tx.lock()
            && let Some(tx) = guard.as_ref()
        {
            return OutputStream { rx: tx.subscribe() };
        }

        // Closed (or poisoned): hand out a stream that is already finished.
        let (tx, rx) = broadcast::channel(1);
        drop(tx);
        OutputStream { rx }
    }

    /// Publishes one line to every currently attached subscriber.
    ///
    /// Lines published with no subscribers attached, or after close, are
    /// dropped silently; that is the hot-stream contract.
    pub fn publish(&self, line: OutputLine) {
        if let Ok(guard) = self.tx.lock()
            && let Some(tx) = guard.as_ref()
        {
            let _ = tx.send(line);
        }
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        if let Ok(guard) = self.tx.lock()
            && let Some(tx) = guard.as_ref()
        {
            return tx.receiver_count();
        }
        0
    }

    /// Closes the stream, ending every subscription. Idempotent.
    pub fn close(&self) {
        if let Ok(mut guard) = self.tx.lock()
            && guard.take().is_some()
        {
            debug!("Output broadcaster closed");
        }
    }
}

/// A live subscription to the output stream.
pub struct OutputStream {
    rx: broadcast::Receiver<OutputLine>,
}

impl OutputStream {
    /// Receives the next line, or `None` once the broadcaster has closed.
    ///
    /// A subscriber that fell behind the ring skips ahead to the oldest
    /// retained line rather than erroring; the skip is logged.
    pub async fn recv(&mut self) -> Option<OutputLine> {
        loop {
            match self.rx.recv().await {
                Ok(line) => return Some(line),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Output subscriber lagged, skipping ahead");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_two_subscribers_see_same_lines_in_order() {
        let hub = OutputBroadcaster::new(16);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(OutputLine::stdout("one"));
        hub.publish(OutputLine::stderr("two"));
        hub.close();

        let mut seen_a = Vec::new();
        while let Some(line) = a.recv().await {
            seen_a.push((line.text, line.is_stdout));
        }
        let mut seen_b = Vec::new();
        while let Some(line) = b.recv().await {
            seen_b.push((line.text, line.is_stdout));
        }

        let expected = vec![("one".to_string(), true), ("two".to_string(), false)];
        assert_eq!(seen_a, expected);
        assert_eq!(seen_b, expected);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let hub = OutputBroadcaster::new(16);
        // Nobody is listening yet; this line is gone for good.
        hub.publish(OutputLine::stdout("missed"));

        let mut sub = hub.subscribe();
        hub.publish(OutputLine::stdout("caught"));
        hub.close();

        assert_eq!(sub.recv().await.map(|l| l.text), Some("caught".to_string()));
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_close_ends_open_subscriptions() {
        let hub = OutputBroadcaster::new(4);
        let mut sub = hub.subscribe();
        hub.close();
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_publish_after_close_is_silent() {
        let hub = OutputBroadcaster::new(4);
        hub.close();
        hub.close();
        hub.publish(OutputLine::stdout("into the void"));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_after_close_yields_finished_stream() {
        let hub = OutputBroadcaster::new(4);
        hub.close();
        let mut sub = hub.subscribe();
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_attach_and_drop() {
        let hub = OutputBroadcaster::new(4);
        assert_eq!(hub.subscriber_count(), 0);
        let a = hub.subscribe();
        let b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
