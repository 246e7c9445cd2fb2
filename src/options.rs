//! Limits and strictness knobs for the decoder.
//!
//! The grammar itself is fixed; these only decide how much input the decoder
//! is willing to look at and which non-canonical encodings it tolerates.

/// What to do when a dictionary repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// The later occurrence overwrites the earlier one.
    #[default]
    LastWins,
    /// Reject the input with [`Reason::DuplicateKey`](crate::Reason::DuplicateKey).
    Reject,
}

/// What to do when dictionary keys arrive out of order on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// Accept any wire order; the decoded dictionary is sorted either way.
    #[default]
    Normalize,
    /// Reject the input with [`Reason::UnsortedKey`](crate::Reason::UnsortedKey).
    Require,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of lists and dictionaries open at once.
    pub max_depth: usize,
    /// Maximum total input size in bytes.
    pub max_input_len: usize,
    /// Maximum length of a single byte string.
    pub max_bytes_len: usize,
    pub duplicate_keys: DuplicateKeys,
    pub key_order: KeyOrder,
    /// Reject byte string lengths written with leading zeros (`03:abc`).
    pub canonical_lengths: bool,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024 * 1024;

    /// Accepts everything the grammar allows.
    pub const fn lenient() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_input_len: Self::DEFAULT_MAX_INPUT_LEN,
            max_bytes_len: Self::DEFAULT_MAX_INPUT_LEN,
            duplicate_keys: DuplicateKeys::LastWins,
            key_order: KeyOrder::Normalize,
            canonical_lengths: false,
        }
    }

    /// Accepts only canonical encodings: sorted unique keys, no padded lengths.
    pub const fn strict() -> Self {
        Self {
            duplicate_keys: DuplicateKeys::Reject,
            key_order: KeyOrder::Require,
            canonical_lengths: true,
            ..Self::lenient()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Also caps `max_bytes_len`, since no byte string can outgrow the input.
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self.max_bytes_len = self.max_bytes_len.min(max_input_len);
        self
    }

    pub fn with_max_bytes_len(mut self, max_bytes_len: usize) -> Self {
        self.max_bytes_len = max_bytes_len;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_lenient() {
        let options = DecodeOptions::default();
        assert_eq!(options, DecodeOptions::lenient());
        assert_eq!(options.duplicate_keys, DuplicateKeys::LastWins);
        assert_eq!(options.key_order, KeyOrder::Normalize);
        assert!(!options.canonical_lengths);
    }

    #[test]
    fn strict_keeps_lenient_limits() {
        let strict = DecodeOptions::strict();
        assert_eq!(strict.max_depth, DecodeOptions::DEFAULT_MAX_DEPTH);
        assert_eq!(strict.max_input_len, DecodeOptions::DEFAULT_MAX_INPUT_LEN);
        assert_eq!(strict.duplicate_keys, DuplicateKeys::Reject);
        assert_eq!(strict.key_order, KeyOrder::Require);
        assert!(strict.canonical_lengths);
    }

    #[test]
    fn shrinking_input_limit_caps_bytes_limit() {
        let options = DecodeOptions::lenient().with_max_input_len(1024);
        assert_eq!(options.max_input_len, 1024);
        assert_eq!(options.max_bytes_len, 1024);

        let options = options.with_max_bytes_len(16).with_max_input_len(4096);
        assert_eq!(options.max_bytes_len, 16);
    }
}
