//! Typed view of a decoded `.torrent` file.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::encode::encode;
use crate::error::MetainfoError;
use crate::hashes::Hashes;
use crate::options::DecodeOptions;
use crate::parse::decode_with;
use crate::value::Value;

type Dict = BTreeMap<Bytes, Value>;

/// Metainfo files (also known as .torrent files)
#[derive(Debug, Clone, Serialize)]
pub struct Torrent {
    /// URL to a "tracker", which is a central server that keeps
    /// track of peers participating in the sharing of a torrent
    pub announce: String,
    /// Describes the file(s) of the torrent.
    pub info: Info,
    /// SHA-1 of the bencoded `info` dictionary.
    #[serde(serialize_with = "hex::serialize")]
    pub info_hash: [u8; 20],
}

/// The `info` dictionary of a torrent.
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    /// UTF-8 name suggested for saving the file, or the directory in the
    /// multi-file case. Purely advisory.
    pub name: String,

    /// Number of bytes in each piece. The download is cut into pieces of this
    /// size, all the same length except possibly the last one.
    #[serde(rename = "piece length")]
    pub plength: u64,

    /// One SHA-1 hash per piece, in piece order. On the wire this is a single
    /// byte string whose length is a multiple of 20.
    pub pieces: Hashes,

    /// Whether the torrent holds one file or a directory of them.
    #[serde(flatten)]
    pub keys: Keys,
}

/// There is a key `length` or a key `files`, but not both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Keys {
    /// When `length` is present the download is a single file.
    SingleFile {
        /// The length of the file in bytes.
        length: u64,
    },
    /// Otherwise it is a set of files laid out in a directory tree.
    ///
    /// For piece layout and the other `Info` fields the files are treated as
    /// one stream, concatenated in the order they appear in `files`.
    MultiFile {
        /// The files, in the order they are concatenated.
        files: Vec<File>,
    },
}

/// One entry of a multi-file torrent's `files` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// The length of the file in bytes.
    pub length: u64,
    /// Subdirectory names, the last of which is the file name itself. An
    /// empty list is rejected when reading.
    pub path: Vec<String>,
}

impl Torrent {
    /// Decodes `data` and reads the torrent fields out of it.
    pub fn from_bytes(data: &[u8], options: &DecodeOptions) -> Result<Self, MetainfoError> {
        let value = decode_with(data, options)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        let root = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let announce = required_str(root, "announce")?;

        let info_value = required(root, "info")?;
        let info_dict = info_value
            .as_dict()
            .ok_or(MetainfoError::InvalidField("info"))?;
        let info = Info::from_dict(info_dict)?;

        let info_hash: [u8; 20] = Sha1::digest(encode(info_value)).into();
        tracing::debug!(
            name = %info.name,
            pieces = info.pieces.len(),
            info_hash = %hex::encode(info_hash),
            "read torrent metainfo"
        );

        Ok(Torrent {
            announce,
            info,
            info_hash,
        })
    }

    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash)
    }
}

impl Info {
    fn from_dict(dict: &Dict) -> Result<Self, MetainfoError> {
        let name = required_str(dict, "name")?;

        let plength = required_u64(dict, "piece length")?;
        if plength == 0 {
            return Err(MetainfoError::InvalidField("piece length"));
        }

        let pieces = required(dict, "pieces")?
            .as_bytes()
            .ok_or(MetainfoError::InvalidField("pieces"))
            .and_then(|raw| Hashes::from_bytes(raw))?;

        let keys = match (dict.get(b"length".as_slice()), dict.get(b"files".as_slice())) {
            (Some(_), None) => Keys::SingleFile {
                length: required_u64(dict, "length")?,
            },
            (None, Some(files)) => {
                let files = parse_files(files)?;
                files
                    .iter()
                    .try_fold(0u64, |total, f| total.checked_add(f.length))
                    .ok_or(MetainfoError::InvalidField("files"))?;
                Keys::MultiFile { files }
            }
            (Some(_), Some(_)) => return Err(MetainfoError::InvalidField("length")),
            (None, None) => return Err(MetainfoError::MissingField("length")),
        };

        Ok(Info {
            name,
            plength,
            pieces,
            keys,
        })
    }

    /// Total size of the download: the single file's length, or the sum over
    /// all files.
    ///
    /// Reading an `Info` rejects file lists whose sum does not fit in a `u64`;
    /// one built by hand saturates at `u64::MAX`.
    pub fn total_length(&self) -> u64 {
        match &self.keys {
            Keys::SingleFile { length } => *length,
            Keys::MultiFile { files } => files
                .iter()
                .fold(0u64, |total, f| total.saturating_add(f.length)),
        }
    }
}

fn parse_files(value: &Value) -> Result<Vec<File>, MetainfoError> {
    let list = value.as_list().ok_or(MetainfoError::InvalidField("files"))?;
    list.iter()
        .map(|entry| {
            let dict = entry.as_dict().ok_or(MetainfoError::InvalidField("files"))?;
            let length = required_u64(dict, "length")?;
            let path = required(dict, "path")?
                .as_list()
                .ok_or(MetainfoError::InvalidField("path"))?
                .iter()
                .map(|segment| {
                    segment
                        .as_str()
                        .map(String::from)
                        .ok_or(MetainfoError::InvalidField("path"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if path.is_empty() {
                return Err(MetainfoError::InvalidField("path"));
            }
            Ok(File { length, path })
        })
        .collect()
}

fn required<'a>(dict: &'a Dict, key: &'static str) -> Result<&'a Value, MetainfoError> {
    dict.get(key.as_bytes())
        .ok_or(MetainfoError::MissingField(key))
}

fn required_str(dict: &Dict, key: &'static str) -> Result<String, MetainfoError> {
    required(dict, key)?
        .as_str()
        .map(String::from)
        .ok_or(MetainfoError::InvalidField(key))
}

fn required_u64(dict: &Dict, key: &'static str) -> Result<u64, MetainfoError> {
    required(dict, key)?
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or(MetainfoError::InvalidField(key))
}
