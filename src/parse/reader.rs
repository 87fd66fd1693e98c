use std::borrow::Cow;

use winnow::Parser;

use super::error::{ParseError, Position};
use super::grammar::{self, RawAttribute, Token};

/// Attributes of one element, in document order, with entities expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes<'i> {
    entries: Vec<(&'i str, Cow<'i, str>)>,
}

impl<'i> Attributes<'i> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute. Intended for building synthetic event streams.
    #[must_use]
    pub fn with(mut self, name: &'i str, value: impl Into<Cow<'i, str>>) -> Self {
        self.entries.push((name, value.into()));
        self
    }

    /// Look up an attribute value by its qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (*n, v.as_ref()))
    }

    fn from_raw(raw: Vec<RawAttribute<'i>>) -> Result<Self, String> {
        let mut entries: Vec<(&'i str, Cow<'i, str>)> = Vec::with_capacity(raw.len());
        for attr in raw {
            if entries.iter().any(|(n, _)| *n == attr.name) {
                return Err(format!("duplicate attribute '{}'", attr.name));
            }
            entries.push((attr.name, grammar::unescape(attr.value)?));
        }
        Ok(Self { entries })
    }
}

/// An element-enter event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement<'i> {
    name: &'i str,
    attributes: Attributes<'i>,
}

impl<'i> StartElement<'i> {
    #[must_use]
    pub fn new(name: &'i str, attributes: Attributes<'i>) -> Self {
        Self { name, attributes }
    }

    /// The name as written, including any namespace prefix.
    #[must_use]
    pub fn qualified_name(&self) -> &'i str {
        self.name
    }

    /// The name with any `prefix:` removed.
    #[must_use]
    pub fn local_name(&self) -> &'i str {
        local_name(self.name)
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes<'i> {
        &self.attributes
    }
}

pub(crate) fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map_or(qualified, |(_, local)| local)
}

/// One structural event of a depth-first traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent<'i> {
    Start(StartElement<'i>),
    /// Element exit, carrying the qualified name of the element being closed.
    End(&'i str),
}

/// Lazily tokenizes a document into [`XmlEvent`]s.
///
/// Reading stops at the first structural fault; the fault is yielded once as
/// an `Err` and the iterator is fused afterwards. Events yielded before the
/// fault are still valid, so a consumer can act on a prefix of a broken
/// document.
#[derive(Debug)]
pub struct EventReader<'i> {
    source: &'i str,
    rest: &'i str,
    open: Vec<&'i str>,
    pending_end: Option<&'i str>,
    seen_root: bool,
    finished: bool,
}

impl<'i> EventReader<'i> {
    #[must_use]
    pub fn new(source: &'i str) -> Self {
        Self {
            source,
            rest: source.strip_prefix('\u{feff}').unwrap_or(source),
            open: Vec::new(),
            pending_end: None,
            seen_root: false,
            finished: false,
        }
    }

    /// Current nesting depth (number of open elements).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn fail(&mut self, message: impl Into<String>) -> Option<Result<XmlEvent<'i>, ParseError>> {
        self.finished = true;
        let offset = self.source.len() - self.rest.len();
        Some(Err(ParseError::at(
            message,
            Position::locate(self.source, offset),
        )))
    }

    fn close(&mut self, name: &'i str) -> Option<Result<XmlEvent<'i>, ParseError>> {
        match self.open.pop() {
            Some(open) if open == name => Some(Ok(XmlEvent::End(name))),
            Some(open) => self.fail(format!(
                "mismatched end tag </{name}>, expected </{open}>"
            )),
            None => self.fail(format!("unexpected end tag </{name}>")),
        }
    }
}

impl<'i> Iterator for EventReader<'i> {
    type Item = Result<XmlEvent<'i>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(name) = self.pending_end.take() {
            return self.close(name);
        }
        loop {
            if self.rest.is_empty() {
                if let Some(open) = self.open.last() {
                    let message = format!("unexpected end of document, <{open}> is not closed");
                    return self.fail(message);
                }
                if !self.seen_root {
                    return self.fail("document has no root element");
                }
                self.finished = true;
                return None;
            }

            let token = match grammar::token.parse_next(&mut self.rest) {
                Ok(token) => token,
                Err(err) => return self.fail(grammar::describe(err)),
            };

            match token {
                Token::Comment | Token::Instruction => {}
                Token::Doctype => {
                    if self.seen_root {
                        return self.fail("document type declaration after root element");
                    }
                }
                Token::Text(text) => {
                    if self.open.is_empty() && !text.trim().is_empty() {
                        return self.fail("text outside the root element");
                    }
                }
                Token::CData(_) => {
                    if self.open.is_empty() {
                        return self.fail("CDATA section outside the root element");
                    }
                }
                Token::Start {
                    name,
                    attributes,
                    empty,
                } => {
                    if self.open.is_empty() && self.seen_root {
                        return self.fail(format!("second root element <{name}>"));
                    }
                    let attributes = match Attributes::from_raw(attributes) {
                        Ok(attributes) => attributes,
                        Err(message) => return self.fail(message),
                    };
                    self.seen_root = true;
                    self.open.push(name);
                    if empty {
                        self.pending_end = Some(name);
                    }
                    return Some(Ok(XmlEvent::Start(StartElement::new(name, attributes))));
                }
                Token::End { name } => return self.close(name),
            }
        }
    }
}

impl std::iter::FusedIterator for EventReader<'_> {}
