use std::fmt;

use tracing::{debug, trace};

use crate::parse::{ParseError, StartElement, XmlEvent};
use crate::pipeline::{CancelToken, PipelineError, Publisher};
use crate::validate::{validate_record, PathPattern, PathStack};

/// Counters for one producer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    /// Every element entered.
    pub elements: usize,
    /// Elements not on the `container/item` path.
    pub off_path: usize,
    /// Elements on the path whose attributes failed validation.
    pub rejected: usize,
    /// Records handed to the queue.
    pub published: usize,
}

impl fmt::Display for ProducerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} elements: {} published, {} rejected, {} off path",
            self.elements, self.published, self.rejected, self.off_path
        )
    }
}

/// Walks a document's event stream and publishes every well-formed record
/// found at a `container/item` position.
#[derive(Debug)]
pub struct StreamProducer<'a> {
    pattern: &'a PathPattern,
    publisher: Publisher,
    cancel: &'a CancelToken,
    path: PathStack,
    report: ProducerReport,
}

impl<'a> StreamProducer<'a> {
    #[must_use]
    pub fn new(pattern: &'a PathPattern, publisher: Publisher, cancel: &'a CancelToken) -> Self {
        Self {
            pattern,
            publisher,
            cancel,
            path: PathStack::new(),
            report: ProducerReport::default(),
        }
    }

    /// Consume `events` until they run out or a fault occurs.
    ///
    /// Records published before a fault stay in the queue.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] from the event stream, or a queue fault
    /// from publishing.
    pub fn run<'i, I>(&mut self, events: I) -> Result<ProducerReport, PipelineError>
    where
        I: IntoIterator<Item = Result<XmlEvent<'i>, ParseError>>,
    {
        debug!("document is being parsed");
        for event in events {
            match event? {
                XmlEvent::Start(element) => self.enter(&element)?,
                XmlEvent::End(_) => {
                    self.path.pop();
                }
            }
        }
        debug!(report = %self.report, "document was parsed");
        Ok(self.report)
    }

    #[must_use]
    pub fn report(&self) -> ProducerReport {
        self.report
    }

    fn enter(&mut self, element: &StartElement<'_>) -> Result<(), PipelineError> {
        self.report.elements += 1;
        self.path.push(element.qualified_name());

        if !self.pattern.matches_stack(&self.path) {
            self.report.off_path += 1;
            trace!(path = %self.path.to_path_string(), "element path is not a rule position");
            return Ok(());
        }

        match validate_record(element.attributes()) {
            Ok(record) => {
                trace!(rule = %record, "publishing");
                self.publisher.publish(record, self.cancel)?;
                self.report.published += 1;
            }
            Err(rejection) => {
                self.report.rejected += 1;
                debug!(
                    path = %self.path.to_path_string(),
                    %rejection,
                    "skipped invalid rule element"
                );
            }
        }
        Ok(())
    }
}
