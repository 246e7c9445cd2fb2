use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use bittorrent_decode::{present, DecodeOptions, Torrent};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Only accept canonical bencode: sorted unique keys, no zero-padded lengths
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum number of nested lists and dictionaries
    #[arg(long, global = true, default_value_t = DecodeOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum input size in bytes
    #[arg(long, global = true, default_value_t = DecodeOptions::DEFAULT_MAX_INPUT_LEN)]
    max_input: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode one bencoded value and print it as JSON
    Decode { value: String },
    /// Print the tracker URL, length, info hash and piece hashes of a .torrent file
    Info {
        torrent: PathBuf,
        /// Print the whole summary as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Print the piece hashes of a .torrent file, one per line
    Hashes { torrent: PathBuf },
}

impl Args {
    fn decode_options(&self) -> DecodeOptions {
        let base = if self.strict {
            DecodeOptions::strict()
        } else {
            DecodeOptions::lenient()
        };
        base.with_max_depth(self.max_depth)
            .with_max_input_len(self.max_input)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let options = args.decode_options();
    tracing::debug!(?options, "decoder options");

    match args.command {
        Command::Decode { value } => {
            let json = present::decode_bencoded_value(&value, &options).context("decode value")?;
            println!("{json}");
        }
        Command::Info { torrent, json } => {
            let t = read_torrent(&torrent, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&t)?);
            } else {
                println!("Tracker URL: {}", t.announce);
                println!("Length: {}", t.info.total_length());
                println!("Info Hash: {}", t.info_hash_hex());
                println!("Piece Length: {}", t.info.plength);
                println!("Piece Hashes:");
                for hash in t.info.pieces.hex() {
                    println!("{hash}");
                }
            }
        }
        Command::Hashes { torrent } => {
            let t = read_torrent(&torrent, &options)?;
            for hash in t.info.pieces.hex() {
                println!("{hash}");
            }
        }
    }
    Ok(())
}

fn read_torrent(path: &Path, options: &DecodeOptions) -> anyhow::Result<Torrent> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("open torrent file {}", path.display()))?
        .len();
    if size > options.max_input_len as u64 {
        bail!(
            "torrent file {} is {size} bytes, over the {} byte limit",
            path.display(),
            options.max_input_len
        );
    }

    let dot_torrent = std::fs::read(path).context("read torrent file")?;
    tracing::debug!(path = %path.display(), bytes = dot_torrent.len(), "read torrent file");

    Torrent::from_bytes(&dot_torrent, options).context("parse torrent file")
}
