//! Bencode decoding for BitTorrent metainfo.
//!
//! [`decode`] turns bencoded bytes into a [`Value`] tree; [`Torrent`] reads
//! the usual `.torrent` fields out of one.

pub mod encode;
pub mod error;
pub mod hashes;
pub mod options;
pub mod parse;
pub mod present;
pub mod torrent;
pub mod value;

pub use encode::{encode, encode_to};
pub use error::{MalformedInput, MetainfoError, PresentError, Reason};
pub use options::{DecodeOptions, DuplicateKeys, KeyOrder};
pub use parse::{decode, decode_prefix, decode_prefix_with, decode_with, Decoded};
pub use present::to_json;
pub use torrent::Torrent;
pub use value::Value;
