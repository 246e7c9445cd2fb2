use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

/// A decoded bencode value.
///
/// Dictionaries are kept in a `BTreeMap` keyed by the raw key bytes, so
/// iteration is always in lexicographic byte order no matter how the keys were
/// ordered in the input.
///
/// ```
/// use bittorrent_decode::{decode, Value};
///
/// let value = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
/// let keys: Vec<_> = value.as_dict().unwrap().keys().cloned().collect();
/// assert_eq!(keys, vec!["cow", "spam"]);
/// assert_eq!(value.get(b"cow").and_then(Value::as_str), Some("moo"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A byte string. Not necessarily valid UTF-8.
    Bytes(Bytes),
    Integer(i64),
    List(Vec<Value>),
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from text.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the byte string as text, if it is one and is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up `key` if this is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
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

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}

/// Text byte strings serialize as strings, anything else as a sequence of
/// byte values so no content is lost.
///
/// Dictionary keys must be strings in most formats. A non-UTF-8 key is written
/// as `0x` followed by its hex bytes; if that text equals another key in the
/// same dictionary, serialization fails rather than dropping an entry.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => serializer.serialize_str(s),
                Err(_) => {
                    let mut seq = serializer.serialize_seq(Some(b.len()))?;
                    for byte in b.iter() {
                        seq.serialize_element(byte)?;
                    }
                    seq.end()
                }
            },
            Value::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for item in l {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(d) => {
                let keys: Vec<Cow<'_, str>> = d.keys().map(|k| key_text(k)).collect();
                let mut seen = BTreeSet::new();
                for key in &keys {
                    if !seen.insert(key.as_ref()) {
                        return Err(S::Error::custom(format!(
                            "dictionary key {key:?} collides with another key once rendered as text"
                        )));
                    }
                }

                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (key, val) in keys.iter().zip(d.values()) {
                    map.serialize_entry(key.as_ref(), val)?;
                }
                map.end()
            }
        }
    }
}

fn key_text(key: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(key) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(format!("0x{}", hex::encode(key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        let value = Value::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert!(value.as_bytes().is_none());

        let value = Value::string("test");
        assert_eq!(value.as_str(), Some("test"));
        assert!(value.as_integer().is_none());

        let value = Value::List(vec![]);
        assert!(value.as_list().is_some());
        assert!(value.as_dict().is_none());
    }

    #[test]
    fn as_str_rejects_invalid_utf8() {
        let value = Value::from(&b"\xff\xfe"[..]);
        assert!(value.as_bytes().is_some());
        assert_eq!(value.as_str(), None);
    }

    #[test]
    fn get_looks_up_raw_key() {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"k"), Value::Integer(1));
        let value = Value::from(dict);
        assert_eq!(value.get(b"k"), Some(&Value::Integer(1)));
        assert_eq!(value.get(b"missing"), None);
        assert_eq!(Value::Integer(1).get(b"k"), None);
    }

    #[test]
    fn serializes_binary_bytes_losslessly() {
        let value = Value::List(vec![Value::from(&b"\x00\xff"[..]), Value::string("ok")]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[[0,255],"ok"]"#);
    }

    #[test]
    fn non_utf8_keys_render_as_hex() {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"\xfe"), Value::Integer(1));
        dict.insert(Bytes::from_static(b"\xff"), Value::Integer(2));
        dict.insert(Bytes::from_static(b"a"), Value::string("x"));
        assert_eq!(
            serde_json::to_string(&Value::Dict(dict)).unwrap(),
            r#"{"a":"x","0xfe":1,"0xff":2}"#
        );
    }

    #[test]
    fn colliding_rendered_keys_fail_instead_of_merging() {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"0xfe"), Value::Integer(1));
        dict.insert(Bytes::from_static(b"\xfe"), Value::Integer(2));
        let err = serde_json::to_string(&Value::Dict(dict)).unwrap_err();
        assert!(err.to_string().contains("collides"), "{err}");
    }
}
