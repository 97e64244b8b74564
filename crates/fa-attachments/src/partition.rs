//! Identifier partitioning and remote path construction
//!
//! Remote directories would otherwise accumulate one file per record.
//! Partitioning splits an identifier-derived string into fixed-width
//! segments so the file count in any single directory stays bounded no
//! matter how many records exist. The mapping is deterministic: the same
//! identifier always lands in the same directory.

use std::fmt;

use fa_core::{Identifier, Partitioning};
use sha2::{Digest, Sha512};

/// Partition segments for an identifier.
///
/// - Integer keys: zero-padded to 8 digits, split into 4-character
///   segments (`1` → `["0000", "0001"]`). Wider integers keep the
///   remainder as a final short segment rather than dropping digits.
/// - 128-bit tokens: the 32-hex rendering split into two 16-character
///   segments.
/// - String keys: SHA-512 of the key, 128 hex characters split into four
///   32-character segments.
pub fn partition_segments(mode: Partitioning, id: &Identifier) -> Vec<String> {
    match mode {
        Partitioning::Flat => Vec::new(),
        Partitioning::Split => match id {
            Identifier::Id(n) => fixed_chunks(&format!("{:08}", n), 4),
            Identifier::Token(token) => fixed_chunks(&token.simple().to_string(), 16),
            Identifier::Key(key) => {
                let digest = hex::encode(Sha512::digest(key.as_bytes()));
                fixed_chunks(&digest, 32)
            }
        },
    }
}

/// Partition segments followed by the trailing path arguments.
///
/// With `Partitioning::Flat` the tail comes back unchanged with nothing
/// prepended.
pub fn partitioned_path(mode: Partitioning, id: &Identifier, tail: &[&str]) -> Vec<String> {
    let mut segments = partition_segments(mode, id);
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
}

fn fixed_chunks(s: &str, width: usize) -> Vec<String> {
    s.as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// An ordered sequence of remote path segments.
///
/// Built from the configured base upload path plus the record's prefix,
/// partition segments, and filename. `Display` renders the slash-joined
/// form the FTP commands are issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    segments: Vec<String>,
    absolute: bool,
}

impl RemotePath {
    /// Split a base path on `/`, keeping track of whether it was absolute.
    pub fn from_base(base: &str) -> Self {
        Self {
            segments: base
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            absolute: base.starts_with('/'),
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.push(segment);
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// The final segment, conventionally the filename.
    pub fn filename(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The containing directory, or `None` for an empty or single-segment
    /// relative path.
    pub fn parent(&self) -> Option<RemotePath> {
        if self.segments.len() < 2 && !self.absolute {
            return None;
        }
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            absolute: self.absolute,
        })
    }

    /// Every directory prefix from shortest to longest, excluding the
    /// full path itself. Used for best-effort recursive directory
    /// creation before an upload.
    pub fn ancestors(&self) -> Vec<RemotePath> {
        (1..self.segments.len())
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
                absolute: self.absolute,
            })
            .collect()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        write!(f, "{}", self.segments.join("/"))
    }
}
