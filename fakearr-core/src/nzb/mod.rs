//! NZB document synthesis

pub mod creation;
pub mod document;

pub use creation::NzbSynthesizer;
pub use document::{NzbDocument, NzbFile, NzbSegment};

/// Content type served for `.nzb` payloads.
pub const NZB_CONTENT_TYPE: &str = "application/x-nzb";

/// Default namespace of NZB documents.
pub const NZB_NAMESPACE: &str = "http://www.newzbin.com/DTD/2003/nzb";

/// DOCTYPE declaration body for NZB 1.1.
pub const NZB_DOCTYPE: &str =
    r#"nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd""#;
