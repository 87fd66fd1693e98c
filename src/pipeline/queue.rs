use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use tracing::trace;

use super::error::PipelineError;
use super::status::CancelToken;
use crate::config::QueueConfig;
use crate::Record;

/// Create a bounded, FIFO hand-off between one producer and one consumer.
#[must_use]
pub fn resolution_queue(config: &QueueConfig) -> (Publisher, Drain) {
    let (tx, rx) = crossbeam_channel::bounded(config.capacity.max(1));
    (
        Publisher {
            tx,
            wait: config.publish_wait(),
            max_attempts: config.max_publish_attempts.max(1),
        },
        Drain { rx },
    )
}

/// Producer side of the queue.
#[derive(Debug)]
pub struct Publisher {
    tx: Sender<Record>,
    wait: Duration,
    max_attempts: u32,
}

impl Publisher {
    /// Enqueue `record`, retrying short bounded waits while the queue is full.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Cancelled`] if `cancel` fires between attempts.
    /// - [`PipelineError::ConsumerGone`] if the consumer side was dropped.
    /// - [`PipelineError::QueueStalled`] once every attempt has timed out.
    pub fn publish(&self, record: Record, cancel: &CancelToken) -> Result<(), PipelineError> {
        let mut record = record;
        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            match self.tx.send_timeout(record, self.wait) {
                Ok(()) => {
                    if attempt > 1 {
                        trace!(attempt, "published after backoff");
                    }
                    return Ok(());
                }
                Err(SendTimeoutError::Timeout(returned)) => record = returned,
                Err(SendTimeoutError::Disconnected(_)) => return Err(PipelineError::ConsumerGone),
            }
        }
        Err(PipelineError::QueueStalled {
            name: record.name().to_owned(),
            attempts: self.max_attempts,
        })
    }
}

/// Result of one consumer poll.
#[derive(Debug)]
pub enum Poll {
    Ready(Record),
    /// Nothing arrived within the wait; the producer may still be running.
    Empty,
    /// The producer side is gone and the queue is empty.
    Closed,
}

/// Consumer side of the queue.
#[derive(Debug)]
pub struct Drain {
    rx: Receiver<Record>,
}

impl Drain {
    pub fn poll(&self, wait: Duration) -> Poll {
        match self.rx.recv_timeout(wait) {
            Ok(record) => Poll::Ready(record),
            Err(RecvTimeoutError::Timeout) => Poll::Empty,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Drop everything currently queued, returning how many records were
    /// discarded.
    pub fn discard(&self) -> usize {
        self.rx.try_iter().count()
    }
}
