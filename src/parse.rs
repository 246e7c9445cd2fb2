//! Recursive-descent bencode decoder.
//!
//! Every production is a free function from a start offset in the input to
//! the decoded value and the offset one past its terminator. Lists and
//! dictionaries call back into [`parse_value`] and continue from whatever
//! offset it reports, so nothing is ever re-scanned.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{MalformedInput, Reason};
use crate::options::{DecodeOptions, DuplicateKeys, KeyOrder};
use crate::value::Value;

/// A decoded value together with the number of input bytes it spanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: Value,
    pub consumed: usize,
}

type Step<T> = Result<(T, usize), MalformedInput>;

/// Decodes exactly one value spanning the whole input.
///
/// ```
/// use bittorrent_decode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(input: &[u8]) -> Result<Value, MalformedInput> {
    decode_with(input, &DecodeOptions::default())
}

pub fn decode_with(input: &[u8], options: &DecodeOptions) -> Result<Value, MalformedInput> {
    let Decoded { value, consumed } = decode_prefix_with(input, options)?;
    if consumed != input.len() {
        return Err(MalformedInput::new(Reason::TrailingData, consumed));
    }
    Ok(value)
}

/// Decodes the first value in `input` and reports how many bytes it used.
/// Anything after it is left alone.
///
/// ```
/// use bittorrent_decode::decode_prefix;
///
/// let decoded = decode_prefix(b"4:spamgarbage").unwrap();
/// assert_eq!(decoded.consumed, 6);
/// ```
pub fn decode_prefix(input: &[u8]) -> Result<Decoded, MalformedInput> {
    decode_prefix_with(input, &DecodeOptions::default())
}

pub fn decode_prefix_with(input: &[u8], options: &DecodeOptions) -> Result<Decoded, MalformedInput> {
    if input.len() > options.max_input_len {
        return Err(MalformedInput::new(Reason::InputTooLarge, 0));
    }
    let (value, next) = parse_value(input, 0, 0, options)?;
    Ok(Decoded {
        value,
        consumed: next,
    })
}

/// Dispatches on the lead byte at `start`. `depth` is the number of
/// containers already open around this value.
fn parse_value(input: &[u8], start: usize, depth: usize, options: &DecodeOptions) -> Step<Value> {
    let Some(&lead) = input.get(start) else {
        return Err(MalformedInput::new(Reason::UnexpectedEof, start));
    };

    match lead {
        b'0'..=b'9' => {
            let (bytes, next) = parse_bytes(input, start, options)?;
            Ok((Value::Bytes(bytes), next))
        }
        b'i' => parse_integer(input, start),
        b'l' => parse_list(input, start, depth, options),
        b'd' => parse_dict(input, start, depth, options),
        other => Err(MalformedInput::new(Reason::UnexpectedByte(other), start)),
    }
}

/// `<len>:<bytes>`, starting at the first length digit.
fn parse_bytes(input: &[u8], start: usize, options: &DecodeOptions) -> Step<Bytes> {
    let colon = find(input, start, b':')
        .ok_or_else(|| MalformedInput::new(Reason::MissingColon, input.len()))?;
    let digits = &input[start..colon];

    if let Some(offset) = digits.iter().position(|b| !b.is_ascii_digit()) {
        return Err(MalformedInput::new(Reason::InvalidLength, start + offset));
    }
    if digits.is_empty() {
        return Err(MalformedInput::new(Reason::InvalidLength, start));
    }
    if options.canonical_lengths && digits.len() > 1 && digits[0] == b'0' {
        return Err(MalformedInput::new(Reason::LeadingZeroLength, start));
    }

    let len = digits
        .iter()
        .try_fold(0usize, |acc, &d| {
            acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
        })
        .ok_or_else(|| MalformedInput::new(Reason::InvalidLength, start))?;

    if len > options.max_bytes_len {
        return Err(MalformedInput::new(Reason::BytesTooLong, start));
    }

    let body = colon + 1;
    let end = body
        .checked_add(len)
        .filter(|&end| end <= input.len())
        .ok_or_else(|| MalformedInput::new(Reason::LengthOutOfRange, input.len()))?;

    Ok((Bytes::copy_from_slice(&input[body..end]), end))
}

/// `i<digits>e`, starting at the `i`.
fn parse_integer(input: &[u8], start: usize) -> Step<Value> {
    let body = start + 1;
    let end = find(input, body, b'e')
        .ok_or_else(|| MalformedInput::new(Reason::UnterminatedInteger, input.len()))?;
    let digits = &input[body..end];

    if digits.starts_with(b"-0") {
        return Err(MalformedInput::new(Reason::NegativeZero, body));
    }
    if digits.starts_with(b"0") && digits.len() > 1 {
        return Err(MalformedInput::new(Reason::LeadingZero, body));
    }

    let (negative, magnitude) = match digits.strip_prefix(b"-") {
        Some(rest) => (true, rest),
        None => (false, digits),
    };
    let magnitude_start = end - magnitude.len();
    if magnitude.is_empty() {
        return Err(MalformedInput::new(Reason::InvalidInteger, end));
    }
    if let Some(offset) = magnitude.iter().position(|b| !b.is_ascii_digit()) {
        return Err(MalformedInput::new(
            Reason::InvalidInteger,
            magnitude_start + offset,
        ));
    }

    // Accumulate towards the sign so that i64::MIN is reachable.
    let number = magnitude
        .iter()
        .try_fold(0i64, |acc, &d| {
            let d = i64::from(d - b'0');
            let acc = acc.checked_mul(10)?;
            if negative {
                acc.checked_sub(d)
            } else {
                acc.checked_add(d)
            }
        })
        .ok_or_else(|| MalformedInput::new(Reason::IntegerOverflow, body))?;

    Ok((Value::Integer(number), end + 1))
}

/// `l<value>*e`, starting at the `l`.
fn parse_list(input: &[u8], start: usize, depth: usize, options: &DecodeOptions) -> Step<Value> {
    let depth = enter(depth, start, options)?;
    let mut items = Vec::new();
    let mut pos = start + 1;

    loop {
        match input.get(pos) {
            None => return Err(MalformedInput::new(Reason::UnterminatedList, pos)),
            Some(b'e') => return Ok((Value::List(items), pos + 1)),
            Some(_) => {
                let (item, next) = parse_value(input, pos, depth, options)?;
                items.push(item);
                pos = next;
            }
        }
    }
}

/// Where a dictionary parse is within the current entry.
enum Entry {
    AwaitingKey,
    AwaitingValue(Bytes),
}

/// `d(<bytes><value>)*e`, starting at the `d`.
///
/// The returned map is ordered by key bytes whatever the wire order was.
fn parse_dict(input: &[u8], start: usize, depth: usize, options: &DecodeOptions) -> Step<Value> {
    let depth = enter(depth, start, options)?;
    let mut dict = BTreeMap::new();
    let mut entry = Entry::AwaitingKey;
    let mut pos = start + 1;

    loop {
        entry = match entry {
            Entry::AwaitingKey => match input.get(pos) {
                None => return Err(MalformedInput::new(Reason::UnterminatedDict, pos)),
                Some(b'e') => return Ok((Value::Dict(dict), pos + 1)),
                Some(b) if b.is_ascii_digit() => {
                    let (key, next) = parse_bytes(input, pos, options)?;
                    check_key(&dict, &key, pos, options)?;
                    pos = next;
                    Entry::AwaitingValue(key)
                }
                Some(_) => return Err(MalformedInput::new(Reason::KeyNotByteString, pos)),
            },
            Entry::AwaitingValue(key) => {
                if pos >= input.len() {
                    return Err(MalformedInput::new(Reason::UnterminatedDict, pos));
                }
                let (value, next) = parse_value(input, pos, depth, options)?;
                dict.insert(key, value);
                pos = next;
                Entry::AwaitingKey
            }
        };
    }
}

/// Applies the duplicate and ordering policies to a freshly read key.
fn check_key(
    dict: &BTreeMap<Bytes, Value>,
    key: &Bytes,
    pos: usize,
    options: &DecodeOptions,
) -> Result<(), MalformedInput> {
    if options.duplicate_keys == DuplicateKeys::Reject && dict.contains_key(key) {
        return Err(MalformedInput::new(Reason::DuplicateKey, pos));
    }
    // Under `Require` every earlier key was ascending, so the largest key is
    // also the previous one.
    if options.key_order == KeyOrder::Require
        && dict.last_key_value().is_some_and(|(prev, _)| key <= prev)
    {
        return Err(MalformedInput::new(Reason::UnsortedKey, pos));
    }
    Ok(())
}

fn enter(depth: usize, start: usize, options: &DecodeOptions) -> Result<usize, MalformedInput> {
    let depth = depth + 1;
    if depth > options.max_depth {
        return Err(MalformedInput::new(Reason::NestingTooDeep, start));
    }
    Ok(depth)
}

fn find(input: &[u8], from: usize, needle: u8) -> Option<usize> {
    input
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}
