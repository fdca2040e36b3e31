//! NZB synthesis for names with no articles behind them
//!
//! One file entry per document. Segment references are derived from the base
//! name and segment number, so they are unique per name without any state.

use super::document::{NzbDocument, NzbFile, NzbSegment};
use crate::config::NzbConfig;
use crate::synthesis::SynthesisError;

/// Builds NZB documents from a base name.
pub struct NzbSynthesizer {
    config: NzbConfig,
}

impl NzbSynthesizer {
    pub fn new(config: NzbConfig) -> Self {
        Self { config }
    }

    /// Builds the document for `base_name`.
    pub fn build(&self, base_name: &str) -> NzbDocument {
        let segments = (1..=self.config.segment_count)
            .map(|number| NzbSegment {
                number,
                bytes: self.config.segment_size,
                message_id: format!("{base_name}.{number}@{}", self.config.reference_domain),
            })
            .collect();

        NzbDocument {
            metadata: vec![
                ("title".to_string(), base_name.to_string()),
                ("category".to_string(), self.config.category.clone()),
            ],
            files: vec![NzbFile {
                poster: self.config.poster.clone(),
                date: self
                    .config
                    .date
                    .unwrap_or_else(|| chrono::Utc::now().timestamp()),
                subject: format!("Sample NZB for {base_name}"),
                groups: self.config.groups.clone(),
                segments,
            }],
        }
    }

    /// Builds and serializes the document for `base_name`.
    ///
    /// # Errors
    /// - `SynthesisError::Encoding` - The XML writer failed
    pub fn synthesize(&self, base_name: &str) -> Result<Vec<u8>, SynthesisError> {
        self.build(base_name).to_xml()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    use super::*;

    /// Parsed view of the parts of an NZB the tests care about.
    #[derive(Default)]
    struct Parsed {
        namespace: Option<String>,
        meta: Vec<(String, String)>,
        subjects: Vec<String>,
        groups: Vec<String>,
        segment_numbers: Vec<u32>,
        segment_ids: Vec<String>,
    }

    fn parse(xml: &[u8]) -> Parsed {
        let text = std::str::from_utf8(xml).unwrap();
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut parsed = Parsed::default();
        let mut open: Vec<String> = Vec::new();
        let mut meta_type = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    let attribute = |key: &str| {
                        e.try_get_attribute(key)
                            .unwrap()
                            .map(|a| a.unescape_value().unwrap().into_owned())
                    };
                    match name.as_str() {
                        "nzb" => parsed.namespace = attribute("xmlns"),
                        "meta" => meta_type = attribute("type").unwrap(),
                        "file" => parsed.subjects.push(attribute("subject").unwrap()),
                        "segment" => parsed
                            .segment_numbers
                            .push(attribute("number").unwrap().parse().unwrap()),
                        _ => {}
                    }
                    open.push(name);
                }
                Event::Text(e) => {
                    let value = e.unescape().unwrap().into_owned();
                    match open.last().map(String::as_str) {
                        Some("meta") => parsed.meta.push((meta_type.clone(), value)),
                        Some("group") => parsed.groups.push(value),
                        Some("segment") => parsed.segment_ids.push(value),
                        _ => {}
                    }
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }
        assert!(open.is_empty(), "unclosed elements: {open:?}");
        parsed
    }

    fn synthesizer() -> NzbSynthesizer {
        NzbSynthesizer::new(NzbConfig::default())
    }

    #[test]
    fn test_default_document_content() {
        let parsed = parse(&synthesizer().synthesize("show").unwrap());

        assert_eq!(
            parsed.namespace.as_deref(),
            Some("http://www.newzbin.com/DTD/2003/nzb")
        );
        assert_eq!(
            parsed.meta,
            vec![
                ("title".to_string(), "show".to_string()),
                ("category".to_string(), "TV".to_string())
            ]
        );
        assert_eq!(parsed.subjects, vec!["Sample NZB for show".to_string()]);
        assert_eq!(parsed.groups, vec!["alt.binaries.tv".to_string()]);
        assert_eq!(parsed.segment_numbers, (1..=10).collect::<Vec<u32>>());
        assert_eq!(parsed.segment_ids[0], "show.1@example.com");
        assert_eq!(parsed.segment_ids[9], "show.10@example.com");
    }

    #[test]
    fn test_segment_sizes_and_date_follow_config() {
        let document = NzbSynthesizer::new(NzbConfig {
            segment_count: 3,
            segment_size: 4096,
            date: Some(42),
            ..NzbConfig::default()
        })
        .build("show");

        let file = &document.files[0];
        assert_eq!(file.date, 42);
        assert_eq!(file.segments.len(), 3);
        assert_eq!(file.total_bytes(), 3 * 4096);
    }

    #[test]
    fn test_ampersand_is_escaped_everywhere() {
        let xml = String::from_utf8(synthesizer().synthesize("a&b").unwrap()).unwrap();

        assert!(!xml.contains("a&b"));
        assert!(xml.contains("<meta type=\"title\">a&amp;b</meta>"));
        assert!(xml.contains("subject=\"Sample NZB for a&amp;b\""));
        assert!(xml.contains(">a&amp;b.1@example.com</segment>"));

        let parsed = parse(xml.as_bytes());
        assert_eq!(parsed.meta[0].1, "a&b");
        assert_eq!(parsed.segment_ids[0], "a&b.1@example.com");
    }

    #[test]
    fn test_same_name_same_document() {
        let synthesizer = synthesizer();
        assert_eq!(
            synthesizer.synthesize("show").unwrap(),
            synthesizer.synthesize("show").unwrap()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_routed_names_give_well_formed_documents(name in "(?s).{0,40}") {
            let path = format!("/{}.nzb", urlencoding::encode(&name));
            match crate::route(&path) {
                Ok(artifact) => {
                    prop_assert_eq!(&artifact.base_name, &name);
                    let parsed = parse(&synthesizer().synthesize(&artifact.base_name).unwrap());

                    prop_assert_eq!(parsed.segment_numbers, (1..=10).collect::<Vec<u32>>());
                    prop_assert_eq!(&parsed.subjects[0], &format!("Sample NZB for {name}"));
                }
                Err(_) => prop_assert!(
                    name.is_empty()
                        || name.chars().any(char::is_control)
                        || name.contains(['\u{FFFE}', '\u{FFFF}']),
                    "rejected name should be empty, contain control chars, or noncharacters"
                ),
            }
        }
    }
}
