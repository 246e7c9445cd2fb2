use std::io::{self, Write};

use crate::value::Value;

/// Encodes a value back into bencode.
///
/// Dictionaries are written in key order, so the output is canonical and
/// `decode(&encode(v)) == v` for every value.
///
/// ```
/// use bittorrent_decode::{decode, encode};
///
/// let value = decode(b"d4:spaml1:ai1ee3:cow3:mooe").unwrap();
/// assert_eq!(encode(&value), b"d3:cow3:moo4:spaml1:ai1eee");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = encode_value(value, &mut buf);
    buf
}

/// Streams the encoding of `value` into `writer`.
pub fn encode_to<W: Write>(value: &Value, writer: &mut W) -> io::Result<()> {
    encode_value(value, writer)
}

fn encode_value<W: Write>(value: &Value, writer: &mut W) -> io::Result<()> {
    match value {
        Value::Integer(i) => {
            write!(writer, "i{}e", i)?;
        }
        Value::Bytes(b) => encode_bytes(b, writer)?,
        Value::List(l) => {
            writer.write_all(b"l")?;
            for item in l {
                encode_value(item, writer)?;
            }
            writer.write_all(b"e")?;
        }
        Value::Dict(d) => {
            writer.write_all(b"d")?;
            for (key, val) in d {
                encode_bytes(key, writer)?;
                encode_value(val, writer)?;
            }
            writer.write_all(b"e")?;
        }
    }
    Ok(())
}

fn encode_bytes<W: Write>(bytes: &[u8], writer: &mut W) -> io::Result<()> {
    write!(writer, "{}:", bytes.len())?;
    writer.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bytes::Bytes;

    use super::*;
    use crate::parse::decode;

    #[test]
    fn encodes_integers() {
        assert_eq!(encode(&Value::Integer(42)), b"i42e");
        assert_eq!(encode(&Value::Integer(-42)), b"i-42e");
        assert_eq!(encode(&Value::Integer(0)), b"i0e");
        assert_eq!(encode(&Value::Integer(i64::MIN)), b"i-9223372036854775808e");
    }

    #[test]
    fn encodes_byte_strings() {
        assert_eq!(encode(&Value::string("spam")), b"4:spam");
        assert_eq!(encode(&Value::string("")), b"0:");
        assert_eq!(encode(&Value::from(&b"\xff\x00"[..])), b"2:\xff\x00");
    }

    #[test]
    fn encodes_containers() {
        let list = Value::List(vec![Value::string("spam"), Value::Integer(42)]);
        assert_eq!(encode(&list), b"l4:spami42ee");

        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"spam"), Value::string("eggs"));
        dict.insert(Bytes::from_static(b"cow"), Value::string("moo"));
        assert_eq!(encode(&Value::Dict(dict)), b"d3:cow3:moo4:spam4:eggse");
    }

    #[test]
    fn canonical_input_roundtrips_byte_for_byte() {
        let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
        assert_eq!(encode(&decode(original).unwrap()), original);

        let nested = b"d4:listl4:spami42eee";
        assert_eq!(encode(&decode(nested).unwrap()), nested);
    }

    #[test]
    fn encode_to_streams_into_writer() {
        let value = decode(b"d1:ali1ei2ee1:b3:xyze").unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        encode_to(&value, &mut out).unwrap();
        assert_eq!(out.into_inner(), b"d1:ali1ei2ee1:b3:xyze");
    }

    #[test]
    fn encode_to_reports_writer_errors() {
        let value = Value::string("does not fit");
        let mut small = [0u8; 4];
        let mut out = &mut small[..];
        assert!(encode_to(&value, &mut out).is_err());
    }

    #[test]
    fn encode_to_writes_same_bytes() {
        let value = Value::List(vec![Value::Integer(1), Value::string("a")]);
        let mut out = Vec::new();
        encode_to(&value, &mut out).unwrap();
        assert_eq!(out, encode(&value));
    }
}
