use std::io;
use std::path::PathBuf;

use crate::world::region::CompressionScheme;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong between a world coordinate and a block id.
///
/// Only the "not found" variants describe data that is simply absent; see [`Error::is_absent`].
/// The rest indicate a truncated or corrupt world, or a failure in one of the decoders.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum Error {
    #[display("region file not found: {}", path.display())]
    RegionNotFound { path: PathBuf },
    #[display("column <x={x} z={z}> has not been generated")]
    ColumnNotFound { x: u32, z: u32 },
    #[display("no chunk at vertical index {y}")]
    ChunkNotFound { y: i32 },

    #[display("region header truncated: {length} of {expected} bytes")]
    HeaderTruncated { length: usize, expected: usize },
    #[display("column coordinates out of range: <x={x} z={z}>")]
    InvalidColumnCoords { x: u32, z: u32 },
    #[display("column location offset {offset} is outside the region header")]
    OffsetOutOfBounds { offset: usize },
    #[display("column byte range {start}..{end} exceeds limit of {limit}")]
    ColumnOutOfBounds {
        start: usize,
        end: usize,
        limit: usize,
    },
    #[display("column size {exact} is invalid for {maximum} allocated bytes")]
    InvalidColumnSize { exact: u32, maximum: usize },
    #[display("unsupported compression scheme: {scheme}")]
    UnsupportedCompression { scheme: u8 },
    #[display("failed to decompress column ({scheme:?}): {source}")]
    Decompress {
        scheme: CompressionScheme,
        source: io::Error,
    },
    #[display("column record has neither a Level compound nor sections")]
    MissingLevel,

    #[display("block index out of range: <x={x} z={z} y={y}>")]
    InvalidBlockIndex { x: u32, z: u32, y: u32 },
    #[display("block states word {word} out of bounds (length {length})")]
    BlockStatesOutOfBounds { word: usize, length: usize },
    #[display("palette index {index} out of range (palette length {length})")]
    PaletteIndexOutOfRange { index: u64, length: usize },

    #[display("i/o error: {_0}")]
    #[from]
    Io(#[error(source)] io::Error),
    #[display("nbt error: {_0}")]
    #[from]
    Nbt(#[error(source)] fastnbt::error::Error),
}

impl Error {
    /// Whether this error means "there is no data here" rather than "the data is broken".
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Error::RegionNotFound { .. } | Error::ColumnNotFound { .. } | Error::ChunkNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_absence_classification() {
        assert!(Error::RegionNotFound { path: "r.0.0.mca".into() }.is_absent());
        assert!(Error::ColumnNotFound { x: 1, z: 2 }.is_absent());
        assert!(Error::ChunkNotFound { y: -4 }.is_absent());
        assert!(!Error::InvalidColumnSize { exact: 5000, maximum: 4096 }.is_absent());
        assert!(!Error::MissingLevel.is_absent());
    }

    #[test]
    fn test_display_and_source() {
        let err = Error::InvalidColumnSize { exact: 5000, maximum: 4096 };
        assert_eq!(
            err.to_string(),
            "column size 5000 is invalid for 4096 allocated bytes"
        );

        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, Error::Io(_)));
        assert!(err.source().is_some());
    }
}
