//! Torrent descriptor model and its mapping to and from bencode

use super::TorrentError;
use super::bencode::{self, DictBuilder, Value};
use crate::hash::{HASH_WIDTH, HashValue};

/// Complete single-file torrent descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentDescriptor {
    pub announce: String,
    pub created_by: String,
    pub creation_date: i64,
    pub info: InfoDictionary,
    /// Top-level `info-hash` entry: SHA-1 over `pieces` followed by the name
    pub legacy_info_hash: Option<HashValue>,
}

/// The `info` dictionary of a single-file torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoDictionary {
    pub name: String,
    pub piece_length: u32,
    pub length: u64,
    pub pieces: Vec<HashValue>,
    pub private: bool,
}

impl InfoDictionary {
    /// Number of pieces a file of `length` bytes needs.
    pub fn expected_piece_count(&self) -> u64 {
        if self.piece_length == 0 {
            return 0;
        }
        self.length.div_ceil(u64::from(self.piece_length))
    }

    /// Concatenated piece hashes as stored under `pieces`.
    pub fn pieces_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pieces.len() * HASH_WIDTH);
        for piece in &self.pieces {
            bytes.extend_from_slice(piece.as_bytes());
        }
        bytes
    }

    /// Builds the `info` dictionary value.
    ///
    /// # Errors
    /// - `TorrentError::IntegerOverflow` - `length` exceeds the signed 64-bit range
    pub fn to_value(&self) -> Result<Value, TorrentError> {
        let length =
            i64::try_from(self.length).map_err(|_| TorrentError::IntegerOverflow { field: "length" })?;

        Ok(DictBuilder::new()
            .insert("length", length)
            .insert("name", self.name.as_str())
            .insert("piece length", i64::from(self.piece_length))
            .insert("pieces", Value::bytes(&self.pieces_bytes()))
            .insert("private", i64::from(self.private))
            .build())
    }

    fn from_value(value: &Value) -> Result<Self, TorrentError> {
        let name = required(value, "name")?
            .as_str()
            .ok_or_else(|| invalid("'name' must be a UTF-8 string"))?
            .to_string();
        let piece_length = integer(value, "piece length")
            .and_then(|n| u32::try_from(n).map_err(|_| invalid("'piece length' out of range")))?;
        let length = integer(value, "length")
            .and_then(|n| u64::try_from(n).map_err(|_| invalid("'length' must not be negative")))?;
        let private = match value.get("private") {
            Some(flag) => flag.as_integer() == Some(1),
            None => false,
        };

        let pieces_bytes = required(value, "pieces")?
            .as_bytes()
            .ok_or_else(|| invalid("'pieces' must be a byte string"))?;
        if pieces_bytes.len() % HASH_WIDTH != 0 {
            return Err(invalid("'pieces' length is not a multiple of 20"));
        }
        let pieces = pieces_bytes
            .chunks_exact(HASH_WIDTH)
            .map(|chunk| {
                let mut hash = [0u8; HASH_WIDTH];
                hash.copy_from_slice(chunk);
                HashValue::new(hash)
            })
            .collect();

        let info = Self {
            name,
            piece_length,
            length,
            pieces,
            private,
        };
        if info.pieces.len() as u64 != info.expected_piece_count() {
            return Err(invalid(&format!(
                "expected {} piece hashes, found {}",
                info.expected_piece_count(),
                info.pieces.len()
            )));
        }
        Ok(info)
    }
}

impl TorrentDescriptor {
    /// Builds the root dictionary value.
    ///
    /// # Errors
    /// - `TorrentError::IntegerOverflow` - A size does not fit a bencode integer
    pub fn to_value(&self) -> Result<Value, TorrentError> {
        let mut root = DictBuilder::new()
            .insert("announce", self.announce.as_str())
            .insert("created by", self.created_by.as_str())
            .insert("creation date", self.creation_date)
            .insert("info", self.info.to_value()?);
        if let Some(hash) = &self.legacy_info_hash {
            root = root.insert("info-hash", Value::bytes(hash.as_bytes()));
        }
        Ok(root.build())
    }

    /// Serializes the descriptor as a `.torrent` file body.
    ///
    /// # Errors
    /// - `TorrentError::IntegerOverflow` - A size does not fit a bencode integer
    pub fn to_bytes(&self) -> Result<Vec<u8>, TorrentError> {
        Ok(bencode::encode(&self.to_value()?))
    }

    /// BitTorrent info-hash: SHA-1 of the encoded `info` dictionary.
    ///
    /// # Errors
    /// - `TorrentError::IntegerOverflow` - A size does not fit a bencode integer
    pub fn info_hash(&self) -> Result<HashValue, TorrentError> {
        let info = bencode::encode(&self.info.to_value()?);
        Ok(HashValue::digest(&[info.as_slice()]))
    }

    /// Parses and validates a `.torrent` file body.
    ///
    /// # Errors
    /// - `TorrentError::Bencode` - Body is not strict bencode
    /// - `TorrentError::InvalidTorrentFile` - Required keys are missing or inconsistent
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TorrentError> {
        let root = bencode::decode(bytes)?;
        if root.as_dict().is_none() {
            return Err(invalid("root element must be a dictionary"));
        }

        let announce = text(&root, "announce")?;
        let created_by = text(&root, "created by")?;
        let creation_date = integer(&root, "creation date")?;
        let info = InfoDictionary::from_value(required(&root, "info")?)?;
        let legacy_info_hash = match root.get("info-hash") {
            Some(value) => {
                let bytes = value
                    .as_bytes()
                    .filter(|b| b.len() == HASH_WIDTH)
                    .ok_or_else(|| invalid("'info-hash' must be 20 bytes"))?;
                let mut hash = [0u8; HASH_WIDTH];
                hash.copy_from_slice(bytes);
                Some(HashValue::new(hash))
            }
            None => None,
        };

        Ok(Self {
            announce,
            created_by,
            creation_date,
            info,
            legacy_info_hash,
        })
    }
}

fn invalid(reason: &str) -> TorrentError {
    TorrentError::InvalidTorrentFile {
        reason: reason.to_string(),
    }
}

fn required<'a>(dict: &'a Value, key: &str) -> Result<&'a Value, TorrentError> {
    dict.get(key)
        .ok_or_else(|| invalid(&format!("missing '{key}' field")))
}

fn integer(dict: &Value, key: &str) -> Result<i64, TorrentError> {
    required(dict, key)?
        .as_integer()
        .ok_or_else(|| invalid(&format!("'{key}' must be an integer")))
}

fn text(dict: &Value, key: &str) -> Result<String, TorrentError> {
    required(dict, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(&format!("'{key}' must be a UTF-8 string")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TorrentDescriptor {
        TorrentDescriptor {
            announce: "http://tracker.example.com/announce".to_string(),
            created_by: "Fakearr".to_string(),
            creation_date: 1_711_584_000,
            info: InfoDictionary {
                name: "show".to_string(),
                piece_length: 16,
                length: 40,
                pieces: (0..3u8).map(|i| HashValue::new([i; HASH_WIDTH])).collect(),
                private: false,
            },
            legacy_info_hash: Some(HashValue::new([9; HASH_WIDTH])),
        }
    }

    #[test]
    fn test_key_order_in_encoded_descriptor() {
        let bytes = sample().to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);

        let order = ["8:announce", "10:created by", "13:creation date", "4:info", "9:info-hash"];
        let positions: Vec<usize> = order.iter().map(|key| text.find(key).unwrap()).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        let info_keys = ["6:length", "4:name", "12:piece length", "6:pieces", "7:private"];
        let positions: Vec<usize> = info_keys.iter().map(|key| text.find(key).unwrap()).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_parse_what_was_written() {
        let descriptor = sample();
        let parsed = TorrentDescriptor::from_bytes(&descriptor.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_info_hash_covers_only_info_dictionary() {
        let descriptor = sample();
        let mut renamed_tracker = descriptor.clone();
        renamed_tracker.announce = "http://elsewhere.example.com/announce".to_string();
        let mut renamed_file = descriptor.clone();
        renamed_file.info.name = "other".to_string();

        let hash = descriptor.info_hash().unwrap();
        assert_eq!(hash, renamed_tracker.info_hash().unwrap());
        assert_ne!(hash, renamed_file.info_hash().unwrap());
    }

    #[test]
    fn test_rejects_inconsistent_piece_count() {
        let mut descriptor = sample();
        descriptor.info.pieces.pop();
        let bytes = descriptor.to_bytes().unwrap();

        assert!(matches!(
            TorrentDescriptor::from_bytes(&bytes),
            Err(TorrentError::InvalidTorrentFile { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_info() {
        let bytes = bencode::encode(&DictBuilder::new().insert("announce", "x").build());
        assert!(matches!(
            TorrentDescriptor::from_bytes(&bytes),
            Err(TorrentError::InvalidTorrentFile { .. })
        ));
    }

    #[test]
    fn test_length_overflow_is_reported() {
        let mut descriptor = sample();
        descriptor.info.length = u64::MAX;
        assert!(matches!(
            descriptor.to_bytes(),
            Err(TorrentError::IntegerOverflow { field: "length" })
        ));
    }
}
