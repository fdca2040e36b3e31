//! Bencode value model, canonical writer and strict reader
//!
//! Dictionaries are stored in a `BTreeMap` keyed by raw bytes, so iteration
//! order is already the lexicographic byte order the format requires and the
//! writer never has to sort. The reader rejects anything a strict torrent
//! client would: unsorted or duplicate keys, leading zeros, trailing bytes.

use std::collections::BTreeMap;

use bytes::Bytes;

/// Deepest list/dictionary nesting the reader accepts.
const MAX_DEPTH: usize = 64;

/// A bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Bytes(Bytes),
    List(Vec<Value>),
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from UTF-8 text.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Creates a byte string value from raw bytes.
    pub fn bytes(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the byte string as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a dictionary.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key.as_bytes()))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// Builder for dictionary values with text keys.
#[derive(Debug, Default)]
pub struct DictBuilder {
    entries: BTreeMap<Bytes, Value>,
}

impl DictBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous value under `key`.
    pub fn insert(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries
            .insert(Bytes::copy_from_slice(key.as_bytes()), value.into());
        self
    }

    pub fn build(self) -> Value {
        Value::Dict(self.entries)
    }
}

/// Errors raised while reading bencode input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BencodeError {
    #[error("Unexpected end of input at byte {position}")]
    UnexpectedEnd { position: usize },

    #[error("Unexpected byte 0x{byte:02x} at byte {position}")]
    InvalidByte { byte: u8, position: usize },

    #[error("Invalid integer at byte {position}")]
    InvalidInteger { position: usize },

    #[error("Invalid string length at byte {position}")]
    InvalidLength { position: usize },

    #[error("Dictionary key out of order at byte {position}")]
    UnsortedKeys { position: usize },

    #[error("Trailing data at byte {position}")]
    TrailingData { position: usize },

    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Encodes a value in canonical form.
///
/// Integers as `i<digits>e`, byte strings as `<length>:<bytes>`, lists as
/// `l...e` and dictionaries as `d...e` with keys in byte order. String
/// lengths count bytes, not characters.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            out.push(b'i');
            out.extend_from_slice(i.to_string().as_bytes());
            out.push(b'e');
        }
        Value::Bytes(b) => encode_bytes(b, out),
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(entries) => {
            out.push(b'd');
            for (key, item) in entries {
                encode_bytes(key, out);
                encode_into(item, out);
            }
            out.push(b'e');
        }
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

/// Decodes exactly one value spanning all of `input`.
///
/// # Errors
/// - `BencodeError` - Input is truncated, non-canonical or has trailing bytes
pub fn decode(input: &[u8]) -> Result<Value, BencodeError> {
    let mut reader = Reader { input, pos: 0 };
    let value = reader.value(0)?;
    if reader.pos != input.len() {
        return Err(BencodeError::TrailingData { position: reader.pos });
    }
    Ok(value)
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEnd { position: self.pos })
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep { limit: MAX_DEPTH });
        }

        match self.peek()? {
            b'i' => self.integer().map(Value::Integer),
            b'0'..=b'9' => self.byte_string().map(Value::Bytes),
            b'l' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::List(items))
            }
            b'd' => {
                self.pos += 1;
                let mut entries = BTreeMap::new();
                let mut previous: Option<Bytes> = None;
                while self.peek()? != b'e' {
                    let key_position = self.pos;
                    let key = match self.peek()? {
                        b'0'..=b'9' => self.byte_string()?,
                        byte => {
                            return Err(BencodeError::InvalidByte {
                                byte,
                                position: self.pos,
                            });
                        }
                    };
                    if previous.as_ref().is_some_and(|p| *p >= key) {
                        return Err(BencodeError::UnsortedKeys {
                            position: key_position,
                        });
                    }
                    let item = self.value(depth + 1)?;
                    previous = Some(key.clone());
                    entries.insert(key, item);
                }
                self.pos += 1;
                Ok(Value::Dict(entries))
            }
            byte => Err(BencodeError::InvalidByte {
                byte,
                position: self.pos,
            }),
        }
    }

    /// Reads ASCII digits up to `terminator`, leaving `pos` past it.
    fn digits_until(&mut self, terminator: u8) -> Result<&'a [u8], BencodeError> {
        let input = self.input;
        let start = self.pos;
        let end = input[start..]
            .iter()
            .position(|&b| b == terminator)
            .map(|offset| start + offset)
            .ok_or(BencodeError::UnexpectedEnd {
                position: input.len(),
            })?;
        self.pos = end + 1;
        Ok(&input[start..end])
    }

    fn integer(&mut self) -> Result<i64, BencodeError> {
        let position = self.pos;
        self.pos += 1; // 'i'
        let digits = self.digits_until(b'e')?;

        let unsigned = digits.strip_prefix(b"-").unwrap_or(digits);
        let canonical = !unsigned.is_empty()
            && unsigned.iter().all(u8::is_ascii_digit)
            && !(unsigned.len() > 1 && unsigned[0] == b'0')
            && digits != b"-0";
        if !canonical {
            return Err(BencodeError::InvalidInteger { position });
        }

        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(BencodeError::InvalidInteger { position })
    }

    fn byte_string(&mut self) -> Result<Bytes, BencodeError> {
        let position = self.pos;
        let digits = self.digits_until(b':')?;

        let canonical = !digits.is_empty()
            && digits.iter().all(u8::is_ascii_digit)
            && !(digits.len() > 1 && digits[0] == b'0');
        let length = std::str::from_utf8(digits)
            .ok()
            .filter(|_| canonical)
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or(BencodeError::InvalidLength { position })?;

        let end = self
            .pos
            .checked_add(length)
            .filter(|&end| end <= self.input.len())
            .ok_or(BencodeError::UnexpectedEnd {
                position: self.input.len(),
            })?;
        let bytes = Bytes::copy_from_slice(&self.input[self.pos..end]);
        self.pos = end;
        Ok(bytes)
    }
}
