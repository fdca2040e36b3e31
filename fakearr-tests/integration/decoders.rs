//! Registry decoders for synthesized files, sharing no code with the writers

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use sha1::{Digest, Sha1};

#[derive(Debug, Deserialize)]
pub struct MetaInfo {
    pub announce: String,
    #[serde(rename = "created by")]
    pub created_by: String,
    #[serde(rename = "creation date")]
    pub creation_date: i64,
    pub info: Info,
    #[serde(rename = "info-hash", default)]
    pub legacy_info_hash: Option<ByteBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Info {
    pub length: i64,
    pub name: String,
    #[serde(rename = "piece length")]
    pub piece_length: i64,
    pub pieces: ByteBuf,
    pub private: i64,
}

pub fn decode_torrent(bytes: &[u8]) -> MetaInfo {
    serde_bencode::from_bytes(bytes).unwrap()
}

/// SHA-1 of the info dictionary as serde_bencode re-encodes it.
pub fn info_hash_hex(info: &Info) -> String {
    let encoded = serde_bencode::to_bytes(info).unwrap();
    Sha1::digest(&encoded)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Parses with a conforming XML 1.0 parser; NZBs carry a DOCTYPE.
pub fn parse_xml(text: &str) -> roxmltree::Document<'_> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options).unwrap()
}

/// Text of every element named `name`, in document order.
pub fn element_texts(document: &roxmltree::Document<'_>, name: &str) -> Vec<String> {
    document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == name)
        .map(|node| node.text().unwrap_or_default().to_string())
        .collect()
}
