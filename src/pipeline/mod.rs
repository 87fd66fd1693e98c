//! Concurrent extraction and resolution.
//!
//! A run uses exactly two threads: `parsing` walks the document and publishes
//! records into a bounded queue, `filtering` drains the queue into a
//! [`Resolver`]. The producer signals completion through
//! [`PipelineStatus`]; the consumer polls the queue with a short timeout and
//! stops once the producer is done and the queue is empty, or immediately if
//! the producer failed. Both threads are joined before a run returns.

mod error;
mod queue;
mod status;

use std::fmt;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

pub use error::PipelineError;
pub use queue::{resolution_queue, Drain, Poll, Publisher};
pub use status::{CancelToken, PipelineStatus};

use crate::config::{QueueConfig, SieveConfig};
use crate::parse::{self, ParseError, XmlEvent};
use crate::produce::{ProducerReport, StreamProducer};
use crate::resolve::{Resolver, ResolverStats};
use crate::validate::PathPattern;
use crate::WinnersTable;

const PRODUCER_TASK: &str = "parsing";
const CONSUMER_TASK: &str = "filtering";

/// Lifecycle of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The result of a completed run.
#[derive(Debug, Clone)]
#[must_use]
pub struct RunReport {
    winners: WinnersTable,
    producer: ProducerReport,
    resolver: ResolverStats,
    duration: Duration,
}

impl RunReport {
    pub fn winners(&self) -> &WinnersTable {
        &self.winners
    }

    pub fn into_winners(self) -> WinnersTable {
        self.winners
    }

    #[must_use]
    pub fn producer(&self) -> ProducerReport {
        self.producer
    }

    #[must_use]
    pub fn resolver(&self) -> ResolverStats {
        self.resolver
    }

    /// Wall-clock time from start to both tasks joined.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Winners: {}", self.winners.len())?;
        writeln!(f, "Parsed: {}", self.producer)?;
        writeln!(f, "Resolved: {}", self.resolver)?;
        write!(f, "Duration: {:?}", self.duration)
    }
}

enum Drained {
    Completed(Resolver),
    Aborted { discarded: usize },
}

/// Runs one producer and one consumer over a document and returns the
/// winning record per name.
#[derive(Debug)]
pub struct Pipeline {
    queue: QueueConfig,
    pattern: PathPattern,
    cancel: CancelToken,
    state: PipelineState,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&SieveConfig::default())
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &SieveConfig) -> Self {
        Self {
            queue: config.queue.clone(),
            pattern: config.path.pattern(),
            cancel: CancelToken::new(),
            state: PipelineState::Idle,
        }
    }

    /// Share an externally owned cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Read and resolve the document at `path`. The file is read on the
    /// producer thread; an I/O failure there fails the run like a parse fault.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on any fatal fault.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<RunReport, PipelineError> {
        let path = path.as_ref();
        self.run_with(move |producer| {
            let document = std::fs::read_to_string(path)?;
            producer.run(parse::events(&document))
        })
    }

    /// Resolve an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on any fatal fault.
    pub fn run_str(&mut self, document: &str) -> Result<RunReport, PipelineError> {
        self.run_with(move |producer| producer.run(parse::events(document)))
    }

    /// Resolve an already-tokenized event stream.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on any fatal fault.
    pub fn run_events<'i, I>(&mut self, events: I) -> Result<RunReport, PipelineError>
    where
        I: IntoIterator<Item = Result<XmlEvent<'i>, ParseError>> + Send,
    {
        self.run_with(move |producer| producer.run(events))
    }

    fn run_with<F>(&mut self, produce: F) -> Result<RunReport, PipelineError>
    where
        F: FnOnce(&mut StreamProducer<'_>) -> Result<ProducerReport, PipelineError> + Send,
    {
        let started = Instant::now();
        self.state = PipelineState::Running;
        info!(capacity = self.queue.capacity, "pipeline started");

        match self.coordinate(produce) {
            Ok((producer, resolver)) => {
                self.state = PipelineState::Completed;
                let stats = resolver.stats();
                let report = RunReport {
                    winners: resolver.finish(),
                    producer,
                    resolver: stats,
                    duration: started.elapsed(),
                };
                info!(
                    winners = report.winners.len(),
                    parsed = %report.producer,
                    resolved = %report.resolver,
                    "pipeline completed"
                );
                Ok(report)
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                error!(error = %err, "pipeline failed");
                Err(err)
            }
        }
    }

    /// Spawn both tasks, join both, and pick the error to report.
    fn coordinate<F>(&self, produce: F) -> Result<(ProducerReport, Resolver), PipelineError>
    where
        F: FnOnce(&mut StreamProducer<'_>) -> Result<ProducerReport, PipelineError> + Send,
    {
        let (publisher, drain) = resolution_queue(&self.queue);
        let status = PipelineStatus::new();
        let status = &status;
        let cancel = &self.cancel;
        let pattern = &self.pattern;
        let poll_interval = self.queue.poll_interval();

        let (produced, drained) = thread::scope(|scope| {
            let producer = thread::Builder::new()
                .name(PRODUCER_TASK.to_owned())
                .spawn_scoped(scope, move || {
                    let mut producer = StreamProducer::new(pattern, publisher, cancel);
                    let result = produce(&mut producer);
                    match &result {
                        Ok(_) => status.mark_done(),
                        Err(err) => {
                            error!(error = %err, "parsing stopped");
                            status.mark_failed();
                        }
                    }
                    result
                })
                .map_err(|source| PipelineError::Spawn {
                    task: PRODUCER_TASK,
                    source,
                })?;

            let consumed = thread::Builder::new()
                .name(CONSUMER_TASK.to_owned())
                .spawn_scoped(scope, move || consume(&drain, status, cancel, poll_interval))
                .map_err(|source| PipelineError::Spawn {
                    task: CONSUMER_TASK,
                    source,
                })
                .and_then(|handle| join(handle, CONSUMER_TASK));

            let produced = join(producer, PRODUCER_TASK);
            Ok::<_, PipelineError>((produced, consumed))
        })?;

        match (produced, drained) {
            (Ok(report), Ok(Drained::Completed(resolver))) => Ok((report, resolver)),
            (Ok(_), Ok(Drained::Aborted { .. })) => Err(PipelineError::ProducerGone),
            (Err(PipelineError::ConsumerGone), Err(consumer)) => Err(consumer),
            (Err(producer), Ok(Drained::Aborted { discarded })) => {
                if discarded > 0 {
                    warn!(discarded, "queued rules discarded after producer failure");
                }
                Err(producer)
            }
            (Err(producer), _) => Err(producer),
            (Ok(_), Err(consumer)) => Err(consumer),
        }
    }
}

fn join<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, PipelineError>>,
    task: &'static str,
) -> Result<T, PipelineError> {
    handle
        .join()
        .map_err(|_| PipelineError::Panicked { task })
        .and_then(|result| result)
}

/// Consumer loop: resolve records until the producer is done and the queue is
/// empty, or stop early if the producer failed.
fn consume(
    drain: &Drain,
    status: &PipelineStatus,
    cancel: &CancelToken,
    poll_interval: Duration,
) -> Result<Drained, PipelineError> {
    info!("rule filtering started");
    let mut resolver = Resolver::new();
    loop {
        if status.has_failed() {
            let discarded = drain.discard();
            return Ok(Drained::Aborted { discarded });
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        match drain.poll(poll_interval) {
            Poll::Ready(record) => {
                resolver.resolve(record);
            }
            Poll::Empty | Poll::Closed if status.is_done() => {
                if !status.has_failed() && drain.is_empty() {
                    break;
                }
            }
            Poll::Empty => {}
            Poll::Closed => return Err(PipelineError::ProducerGone),
        }
    }
    info!(stats = %resolver.stats(), "rule filtering completed");
    Ok(Drained::Completed(resolver))
}

/// Run the pipeline with default settings over an in-memory document.
///
/// # Errors
///
/// Returns [`PipelineError`] on any fatal fault.
pub fn resolve_document(document: &str) -> Result<WinnersTable, PipelineError> {
    Pipeline::default()
        .run_str(document)
        .map(RunReport::into_winners)
}
