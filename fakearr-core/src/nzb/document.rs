//! NZB document model and XML serialization

use super::{NZB_DOCTYPE, NZB_NAMESPACE};
use crate::synthesis::SynthesisError;
use crate::xml::XmlWriter;

/// Complete NZB document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NzbDocument {
    /// `<head>` metadata as `(type, value)` pairs
    pub metadata: Vec<(String, String)>,
    pub files: Vec<NzbFile>,
}

/// One `<file>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NzbFile {
    pub poster: String,
    pub date: i64,
    pub subject: String,
    pub groups: Vec<String>,
    pub segments: Vec<NzbSegment>,
}

/// One article of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NzbSegment {
    /// 1-based position within the file
    pub number: u32,
    pub bytes: u64,
    /// Message reference without angle brackets
    pub message_id: String,
}

impl NzbFile {
    /// Sum of all segment sizes.
    pub fn total_bytes(&self) -> u64 {
        self.segments.iter().map(|s| s.bytes).sum()
    }
}

impl NzbDocument {
    /// Serializes the document as indented XML with the NZB 1.1 DOCTYPE.
    ///
    /// # Errors
    /// - `SynthesisError::Encoding` - The XML writer rejected an event
    pub fn to_xml(&self) -> Result<Vec<u8>, SynthesisError> {
        let mut xml = XmlWriter::new(Some(NZB_DOCTYPE))?;
        xml.open("nzb", &[("xmlns", NZB_NAMESPACE)])?;

        if !self.metadata.is_empty() {
            xml.open("head", &[])?;
            for (kind, value) in &self.metadata {
                xml.text_element("meta", &[("type", kind.as_str())], value)?;
            }
            xml.close("head")?;
        }

        for file in &self.files {
            let date = file.date.to_string();
            xml.open(
                "file",
                &[
                    ("poster", file.poster.as_str()),
                    ("date", date.as_str()),
                    ("subject", file.subject.as_str()),
                ],
            )?;

            xml.open("groups", &[])?;
            for group in &file.groups {
                xml.text_element("group", &[], group)?;
            }
            xml.close("groups")?;

            xml.open("segments", &[])?;
            for segment in &file.segments {
                let bytes = segment.bytes.to_string();
                let number = segment.number.to_string();
                xml.text_element(
                    "segment",
                    &[("bytes", bytes.as_str()), ("number", number.as_str())],
                    &segment.message_id,
                )?;
            }
            xml.close("segments")?;

            xml.close("file")?;
        }

        xml.close("nzb")?;
        Ok(xml.finish())
    }
}
