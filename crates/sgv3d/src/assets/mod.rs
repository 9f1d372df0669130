//! Asset storage

pub mod mesh_io;

pub use mesh_io::{decode_vmesh, encode_vmesh, read_vmesh, write_vmesh};

use thiserror::Error;

/// Errors reading or writing asset files
#[derive(Error, Debug)]
pub enum AssetError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Header could not be parsed
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Fewer records than the header announced
    #[error("Expected {expected} vertices but file holds {found}")]
    Truncated {
        /// Vertices announced
        expected: usize,
        /// Complete vertices present
        found: usize,
    },
}
