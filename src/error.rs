use thiserror::Error;

/// What was wrong with the input. Carried by [`MalformedInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected byte {}", printable(.0))]
    UnexpectedByte(u8),

    #[error("byte string length is not followed by ':'")]
    MissingColon,

    #[error("byte string length is not a non-negative decimal")]
    InvalidLength,

    #[error("byte string length has a leading zero")]
    LeadingZeroLength,

    #[error("byte string is shorter than its declared length")]
    LengthOutOfRange,

    #[error("byte string is longer than the configured limit")]
    BytesTooLong,

    #[error("integer is missing its terminating 'e'")]
    UnterminatedInteger,

    #[error("negative zero is not a valid integer")]
    NegativeZero,

    #[error("integer has a leading zero")]
    LeadingZero,

    #[error("integer payload is not a decimal number")]
    InvalidInteger,

    #[error("integer does not fit in 64 bits")]
    IntegerOverflow,

    #[error("list is missing its terminating 'e'")]
    UnterminatedList,

    #[error("dictionary is missing its terminating 'e'")]
    UnterminatedDict,

    #[error("dictionary key is not a byte string")]
    KeyNotByteString,

    #[error("duplicate dictionary key")]
    DuplicateKey,

    #[error("dictionary keys are not in ascending order")]
    UnsortedKey,

    #[error("nesting too deep")]
    NestingTooDeep,

    #[error("trailing data after value")]
    TrailingData,

    #[error("input is larger than the configured limit")]
    InputTooLarge,
}

/// The single error the decoder produces.
///
/// `position` is the byte offset into the input at which the violation was
/// detected. Decoding never recovers: the first violation aborts the whole
/// top-level call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed input at byte {position}: {reason}")]
pub struct MalformedInput {
    pub reason: Reason,
    pub position: usize,
}

impl MalformedInput {
    pub fn new(reason: Reason, position: usize) -> Self {
        Self { reason, position }
    }
}

/// Errors raised while reading torrent fields out of a decoded value.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The input is not valid bencode.
    #[error(transparent)]
    Decode(#[from] MalformedInput),

    /// A required field is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or an invalid value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

/// Errors from decoding a value and rendering it as JSON.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error(transparent)]
    Decode(#[from] MalformedInput),

    /// The value has no faithful JSON form, e.g. two dictionary keys render
    /// to the same text.
    #[error("cannot render value as JSON: {0}")]
    Render(#[from] serde_json::Error),
}

/// Renders a byte as a quoted character when printable, hex otherwise.
fn printable(byte: &u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", *byte as char)
    } else {
        format!("0x{:02x}", byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_reason() {
        let err = MalformedInput::new(Reason::LeadingZero, 1);
        assert_eq!(
            err.to_string(),
            "malformed input at byte 1: integer has a leading zero"
        );
    }

    #[test]
    fn unexpected_byte_is_printable() {
        assert_eq!(
            Reason::UnexpectedByte(b'x').to_string(),
            "unexpected byte 'x'"
        );
        assert_eq!(
            Reason::UnexpectedByte(0x00).to_string(),
            "unexpected byte 0x00"
        );
    }

    #[test]
    fn metainfo_error_wraps_decode_error() {
        let err = MetainfoError::from(MalformedInput::new(Reason::UnexpectedEof, 0));
        assert!(matches!(err, MetainfoError::Decode(_)));
        assert_eq!(
            err.to_string(),
            "malformed input at byte 0: unexpected end of input"
        );
        assert_eq!(
            MetainfoError::MissingField("announce").to_string(),
            "missing field: announce"
        );
    }
}
