//! Checkpoint-based operation timing

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde_json::Value;

use super::Logger;

/// Records named checkpoints for one operation and logs a summary on stop.
///
/// Each checkpoint stores the time elapsed since the previous mark. Dropping
/// an unstopped tracker stops it.
pub struct PerformanceTracker {
    logger: Logger,
    operation: String,
    start: Instant,
    last_mark: Instant,
    checkpoints: IndexMap<String, Duration>,
    total: Option<Duration>,
    _thread_bound: PhantomData<*const ()>,
}

impl PerformanceTracker {
    pub fn new(logger: Logger, operation: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            logger,
            operation: operation.into(),
            start: now,
            last_mark: now,
            checkpoints: IndexMap::new(),
            total: None,
            _thread_bound: PhantomData,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// No-op once stopped.
    pub fn checkpoint(&mut self, name: impl Into<String>) {
        if self.total.is_some() {
            return;
        }
        let now = Instant::now();
        self.checkpoints.insert(name.into(), now - self.last_mark);
        self.last_mark = now;
    }

    pub fn checkpoints(&self) -> &IndexMap<String, Duration> {
        &self.checkpoints
    }

    pub fn is_stopped(&self) -> bool {
        self.total.is_some()
    }

    /// Stops the clock and logs the summary once; later calls return the same total.
    pub fn stop(&mut self) -> Duration {
        if let Some(total) = self.total {
            return total;
        }
        let total = self.start.elapsed();
        self.total = Some(total);

        let mut summary = self
            .logger
            .structured()
            .field("operation", self.operation.as_str())
            .field("totalDurationMs", duration_ms(total));
        for (name, elapsed) in &self.checkpoints {
            summary = summary.field(format!("checkpoint.{}.ms", name), duration_ms(*elapsed));
        }
        summary.info(format!(
            "Performance tracking completed for operation: {}",
            self.operation
        ));

        total
    }
}

impl Drop for PerformanceTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn duration_ms(d: Duration) -> Value {
    Value::from(d.as_millis() as u64)
}
