use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One ordered status event for the run's single subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub status: String,
    pub message: String,
    /// 0..=100, non-decreasing within a run.
    pub percent: u8,
}

/// One-way event channel from the orchestrator to one subscriber.
///
/// `emit` must never fail: transport problems are the sink's to swallow.
/// Ordering is guaranteed per run, not across runs.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, update: ProgressUpdate);
}

/// Sink that discards every update.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _update: ProgressUpdate) {}
}

/// Sink backed by an unbounded channel. A dropped receiver is not an error;
/// the subscriber simply stops listening.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, update: ProgressUpdate) {
        let _ = self.tx.send(update);
    }
}

/// Guards the per-run progress invariants on top of any sink: percent never
/// decreases, and 100 is emitted at most once.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    last_percent: u8,
    finished: bool,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            last_percent: 0,
            finished: false,
        }
    }

    pub fn emit(&mut self, status: &str, message: impl Into<String>, percent: u8) {
        if self.finished {
            return;
        }
        let percent = percent.min(100).max(self.last_percent);
        self.last_percent = percent;
        if percent == 100 {
            self.finished = true;
        }
        self.sink.emit(ProgressUpdate {
            status: status.to_string(),
            message: message.into(),
            percent,
        });
    }

    /// Percent for `completed` out of `total` units, scaled into the span
    /// reserved for analyzer work (synthesis takes the final stretch).
    pub fn unit_percent(completed: usize, total: usize, ceiling: u8) -> u8 {
        if total == 0 {
            return ceiling;
        }
        ((completed * ceiling as usize) / total) as u8
    }
}
