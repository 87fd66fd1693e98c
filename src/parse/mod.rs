//! Structural reading of rule documents.
//!
//! The reader turns a document into a depth-first stream of element-enter and
//! element-exit events. It checks well-formedness (matching tags, a single
//! root, quoted attribute values, known entities) but knows nothing about
//! rules; recognizing rule records is the producer's job.

mod error;
mod grammar;
mod reader;

pub use error::{ParseError, Position};
pub use reader::{Attributes, EventReader, StartElement, XmlEvent};

pub(crate) use reader::local_name;

/// Start reading `input` lazily.
#[must_use]
pub fn events(input: &str) -> EventReader<'_> {
    EventReader::new(input)
}

/// Read the whole of `input` into a vector of events.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a well-formed document.
pub fn parse(input: &str) -> Result<Vec<XmlEvent<'_>>, ParseError> {
    events(input).collect()
}
