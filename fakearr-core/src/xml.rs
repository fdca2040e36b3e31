//! Thin element writer over `quick_xml` shared by the NZB and Newznab documents

use std::fmt::Display;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::synthesis::SynthesisError;

/// Indented XML writer; attribute values and text are escaped on write.
pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts a document with an XML declaration and an optional DOCTYPE body.
    pub(crate) fn new(doctype: Option<&str>) -> Result<Self, SynthesisError> {
        let mut xml = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        if let Some(doctype) = doctype {
            xml.event(Event::DocType(BytesText::from_escaped(doctype)))?;
        }
        Ok(xml)
    }

    pub(crate) fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SynthesisError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<(), SynthesisError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name attributes>text</name>` on one line.
    pub(crate) fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), SynthesisError> {
        self.open(name, attributes)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// Writes a self-closing `<name attributes/>`.
    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SynthesisError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Empty(start))
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        let mut body = self.writer.into_inner();
        body.push(b'\n');
        body
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), SynthesisError> {
        self.writer.write_event(event).map_err(encoding_error)
    }
}

fn encoding_error(err: impl Display) -> SynthesisError {
    SynthesisError::Encoding {
        reason: err.to_string(),
    }
}
