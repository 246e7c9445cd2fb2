use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::MetainfoError;

/// Length of one SHA-1 piece hash.
pub const HASH_LEN: usize = 20;

/// The `pieces` field of an info dictionary, split into one SHA-1 hash per
/// piece of the download.
///
/// With a piece length of 20 bytes, a 44-byte file has three pieces and
/// `pieces` is 60 bytes long: the hash of bytes 0..20, then 20..40, then the
/// short trailing piece 40..44.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hashes(pub Vec<[u8; HASH_LEN]>);

impl Hashes {
    /// Splits a `pieces` byte string into individual hashes.
    pub fn from_bytes(v: &[u8]) -> Result<Self, MetainfoError> {
        if v.len() % HASH_LEN != 0 {
            return Err(MetainfoError::InvalidField("pieces"));
        }
        let mut hashes = Vec::with_capacity(v.len() / HASH_LEN);
        for chunk in v.chunks_exact(HASH_LEN) {
            let mut hash = [0u8; HASH_LEN];
            hash.copy_from_slice(chunk);
            hashes.push(hash);
        }
        Ok(Hashes(hashes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex of each hash, in piece order.
    pub fn hex(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(hex::encode)
    }
}

impl Serialize for Hashes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for hash in self.hex() {
            seq.serialize_element(&hash)?;
        }
        seq.end()
    }
}
