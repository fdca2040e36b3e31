//! Properties of synthesized files across arbitrary names

use fakearr_core::{ArtifactKind, ArtifactSynthesizer, FakearrConfig, route};
use proptest::prelude::*;

use crate::decoders::{decode_torrent, element_texts, parse_xml};

/// Routes `/<name>.<kind>` and synthesizes the result, or `None` when the
/// router turns the name away.
fn request(name: &str, kind: ArtifactKind) -> Option<Vec<u8>> {
    let path = format!("/{}.{}", urlencoding::encode(name), kind.extension());
    let artifact = route(&path).ok()?;
    assert_eq!(artifact.base_name, name);

    let synthesizer = ArtifactSynthesizer::from_config(&FakearrConfig::for_testing()).unwrap();
    Some(synthesizer.synthesize(&artifact).unwrap().body.to_vec())
}

fn is_rejected_name(name: &str) -> bool {
    name.is_empty()
        || name.chars().any(char::is_control)
        || name.contains(['\u{FFFE}', '\u{FFFF}'])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_torrent_round_trips_name(name in "(?s).{1,48}") {
        match request(&name, ArtifactKind::Torrent) {
            Some(bytes) => {
                let torrent = decode_torrent(&bytes);
                let info = &torrent.info;
                let expected_pieces = (info.length + info.piece_length - 1) / info.piece_length;

                prop_assert_eq!(&info.name, &name);
                prop_assert_eq!(info.pieces.len() as i64, expected_pieces * 20);
            }
            None => prop_assert!(is_rejected_name(&name)),
        }
    }

    #[test]
    fn prop_distinct_names_distinct_torrents(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(
            request(&a, ArtifactKind::Torrent),
            request(&b, ArtifactKind::Torrent)
        );
    }

    #[test]
    fn prop_nzb_is_well_formed(name in "(?s).{1,48}") {
        match request(&name, ArtifactKind::Nzb) {
            Some(bytes) => {
                let text = String::from_utf8(bytes).unwrap();
                let document = parse_xml(&text);

                let numbers: Vec<u32> = document
                    .descendants()
                    .filter(|node| node.is_element() && node.tag_name().name() == "segment")
                    .map(|node| node.attribute("number").unwrap().parse().unwrap())
                    .collect();
                prop_assert_eq!(numbers, (1..=10).collect::<Vec<u32>>());
                prop_assert_eq!(&element_texts(&document, "meta")[0], &name);
            }
            None => prop_assert!(is_rejected_name(&name)),
        }
    }
}
