//! Result documents: the flat `<rules>` XML file, its HTML rendering, and
//! best-effort display of that rendering.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::parse::{self, ParseError, XmlEvent};
use crate::validate::{NAME_ATTR, TYPE_ATTR, WEIGHT_ATTR};
use crate::{PriorityClass, Record, WinnersTable};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("result document entry '{name}' is invalid: {reason}")]
    InvalidEntry { name: String, reason: String },
}

/// One `<rule>` entry of a result document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub name: String,
    pub class: PriorityClass,
    pub weight: u32,
}

impl From<&Record> for RuleEntry {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name().to_owned(),
            class: record.class(),
            weight: record.weight(),
        }
    }
}

/// The structured form of a result document: a flat list of rules under a
/// root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDocument {
    root: String,
    item: String,
    entries: Vec<RuleEntry>,
}

impl RuleDocument {
    /// Build a document from the winners, ordered by name.
    #[must_use]
    pub fn from_winners(winners: &WinnersTable) -> Self {
        Self::with_names("rules", "rule", winners)
    }

    /// Build a document with custom root and entry element names.
    #[must_use]
    pub fn with_names(root: &str, item: &str, winners: &WinnersTable) -> Self {
        Self {
            root: root.to_owned(),
            item: item.to_owned(),
            entries: winners.iter().map(RuleEntry::from).collect(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Read a result document back. Every direct child of the root becomes an
    /// entry; entries must carry all three attributes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Parse`] for malformed markup and
    /// [`RenderError::InvalidEntry`] for entries that fail validation.
    pub fn parse(input: &str) -> Result<Self, RenderError> {
        let mut root = String::new();
        let mut item = String::new();
        let mut entries = Vec::new();
        let mut depth = 0usize;

        for event in parse::events(input) {
            match event? {
                XmlEvent::Start(element) => {
                    depth += 1;
                    match depth {
                        1 => root = element.local_name().to_owned(),
                        2 => {
                            item = element.local_name().to_owned();
                            let record =
                                crate::validate_record(element.attributes()).map_err(|reason| {
                                    RenderError::InvalidEntry {
                                        name: element
                                            .attributes()
                                            .get(NAME_ATTR)
                                            .unwrap_or_default()
                                            .to_owned(),
                                        reason: reason.to_string(),
                                    }
                                })?;
                            entries.push(RuleEntry::from(&record));
                        }
                        _ => {}
                    }
                }
                XmlEvent::End(_) => depth -= 1,
            }
        }

        if item.is_empty() {
            item = "rule".to_owned();
        }
        Ok(Self {
            root,
            item,
            entries,
        })
    }

    /// Serialize with an XML declaration and one entry per line.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        if self.entries.is_empty() {
            let _ = writeln!(out, "<{}/>", self.root);
            return out;
        }
        let _ = writeln!(out, "<{}>", self.root);
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "    <{} {NAME_ATTR}=\"{}\" {TYPE_ATTR}=\"{}\" {WEIGHT_ATTR}=\"{}\"/>",
                self.item,
                escape(&entry.name),
                entry.class,
                entry.weight
            );
        }
        let _ = writeln!(out, "</{}>", self.root);
        out
    }

    /// Apply the fixed HTML template.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut rows = String::new();
        for entry in &self.entries {
            let _ = writeln!(
                rows,
                "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&entry.name),
                entry.class,
                entry.weight
            );
        }
        HTML_TEMPLATE
            .replace("{{count}}", &self.entries.len().to_string())
            .replace("{{rows}}", rows.trim_end_matches('\n'))
    }
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>Resolved rules</title>
    <style>
      body { font-family: sans-serif; }
      table { border-collapse: collapse; }
      th, td { border: 1px solid #999; padding: 4px 12px; text-align: left; }
      th { background: #ddd; }
    </style>
  </head>
  <body>
    <h2>Resolved rules ({{count}})</h2>
    <table>
      <tr><th>Name</th><th>Type</th><th>Weight</th></tr>
{{rows}}
    </table>
  </body>
</html>
"#;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Write the result document to `path`.
///
/// # Errors
///
/// Returns [`RenderError::Write`] if the file cannot be written.
pub fn write_document(document: &RuleDocument, path: &Path) -> Result<(), RenderError> {
    std::fs::write(path, document.to_xml()).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rules = document.entries().len(), "result document saved");
    Ok(())
}

/// Where the HTML rendering of the result document at `destination` goes.
#[must_use]
pub fn html_path(destination: &Path) -> PathBuf {
    destination.with_extension("html")
}

/// Write the HTML rendering next to `destination` and return its path.
///
/// # Errors
///
/// Returns [`RenderError::Write`] if the file cannot be written.
pub fn write_html(document: &RuleDocument, destination: &Path) -> Result<PathBuf, RenderError> {
    let path = html_path(destination);
    std::fs::write(&path, document.to_html()).map_err(|source| RenderError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "HTML rendering saved");
    Ok(path)
}

/// Open `path` in the default browser. Failure is logged and otherwise
/// ignored; the return value says whether a browser was launched.
pub fn display(path: &Path) -> bool {
    if !path.is_file() {
        warn!(path = %path.display(), "HTML rendering not found, nothing to display");
        return false;
    }
    match webbrowser::open(&path.to_string_lossy()) {
        Ok(()) => {
            info!(path = %path.display(), "opened HTML rendering");
            true
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "HTML rendering can not be displayed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve_records;

    fn winners() -> WinnersTable {
        resolve_records([
            Record::new("b", PriorityClass::Sub, 2).unwrap(),
            Record::new("a&c", PriorityClass::Child, 7).unwrap(),
        ])
    }

    #[test]
    fn xml_is_ordered_and_escaped() {
        let xml = RuleDocument::from_winners(&winners()).to_xml();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n\
             <rules>\n\
             \x20   <rule name=\"a&amp;c\" type=\"child\" weight=\"7\"/>\n\
             \x20   <rule name=\"b\" type=\"sub\" weight=\"2\"/>\n\
             </rules>\n"
        );
    }

    #[test]
    fn empty_table_renders_empty_root() {
        let xml = RuleDocument::from_winners(&WinnersTable::default()).to_xml();
        assert!(xml.ends_with("<rules/>\n"));
    }

    #[test]
    fn parse_reads_back_written_document() {
        let doc = RuleDocument::from_winners(&winners());
        let back = RuleDocument::parse(&doc.to_xml()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn parse_rejects_invalid_entries() {
        let err = RuleDocument::parse(r#"<rules><rule name="x" type="bogus" weight="1"/></rules>"#)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidEntry { ref name, .. } if name == "x"));
    }

    #[test]
    fn html_contains_one_row_per_rule() {
        let html = RuleDocument::from_winners(&winners()).to_html();
        assert!(html.contains("Resolved rules (2)"));
        assert!(html.contains("<tr><td>a&amp;c</td><td>child</td><td>7</td></tr>"));
        assert!(html.contains("<tr><td>b</td><td>sub</td><td>2</td></tr>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn html_path_swaps_extension() {
        assert_eq!(
            html_path(Path::new("/tmp/out/result.xml")),
            PathBuf::from("/tmp/out/result.html")
        );
    }

    #[test]
    fn display_skips_missing_rendering() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!display(&dir.path().join("absent.html")));
        assert!(!display(dir.path()));
    }

    #[test]
    fn custom_element_names() {
        let doc = RuleDocument::with_names("policies", "policy", &winners());
        let xml = doc.to_xml();
        assert!(xml.contains("<policies>"));
        assert!(xml.contains("<policy name=\"b\""));
        assert_eq!(RuleDocument::parse(&xml).unwrap(), doc);
    }
}
