//! Binary snapshots of whole populations.
//!
//! A file holds a 4-byte magic tag, a little-endian `u32`
//! format version, and a bincode payload.
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"NEVO";
const HEADER_LEN: usize = MAGIC.len() + 4;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors produced while saving or loading a population.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no saved population at {}", .0.display())]
    NotFound(PathBuf),
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a valid population file: {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },
    #[error("{} has format version {found}, expected {expected}", path.display())]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("failed to encode population: {0}")]
    Encode(#[source] bincode::Error),
}

pub(crate) fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let payload = bincode::serialize(value).map_err(PersistenceError::Encode)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    fs::write(path, bytes).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn load<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound(path.to_path_buf()),
        _ => PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(PersistenceError::Corrupted {
            path: path.to_path_buf(),
            reason: "missing file header".to_string(),
        });
    }

    let mut version = [0; 4];
    version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(PersistenceError::VersionMismatch {
            path: path.to_path_buf(),
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| PersistenceError::Corrupted {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
