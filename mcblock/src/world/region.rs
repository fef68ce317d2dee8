use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder};
use bytes::Buf;

use crate::world::column::Column;
use crate::world::error::{Error, Result};
use crate::world::{CIndex, RCoords, REGION_SIZE};

pub const SECTOR_SIZE: usize = 4096;
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;
const REGION_COLUMN_COUNT: usize = (REGION_SIZE * REGION_SIZE) as usize;
const LOCATION_SIZE: usize = 4;
/// Locations occupy the first sector of the header, last-modified timestamps the second.
const TIMESTAMPS_OFFSET: usize = REGION_COLUMN_COUNT * LOCATION_SIZE;
/// Column payloads start with a 4-byte length and a 1-byte compression scheme.
const COLUMN_PREFIX_SIZE: usize = 5;

/// Where a column's data lives: a 3-byte sector offset from the start of the file, then a
/// 1-byte count of allocated sectors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ColumnLocation([u8; LOCATION_SIZE]);

impl ColumnLocation {
    pub const fn new(sector_offset: u32, sector_count: u8) -> Self {
        let [_, a, b, c] = sector_offset.to_be_bytes();
        Self([a, b, c, sector_count])
    }

    pub fn sector_offset(self) -> u32 {
        BigEndian::read_u24(&self.0[..3])
    }

    pub fn sector_count(self) -> u8 {
        self.0[3]
    }

    /// Offset of the column data in bytes, counted from the start of the region file.
    pub fn byte_offset(self) -> usize {
        self.sector_offset() as usize * SECTOR_SIZE
    }

    /// Number of bytes allocated to the column.
    pub fn max_size(self) -> usize {
        self.sector_count() as usize * SECTOR_SIZE
    }

    /// An all-zero location means the column has not been generated.
    pub fn is_empty(self) -> bool {
        self.0 == [0; LOCATION_SIZE]
    }
}

/// The fixed 8 KiB header of a region file.
#[derive(Clone, derive_more::Debug)]
#[debug("RegionHeader {{ .. }}")]
pub struct RegionHeader(Box<[u8]>);

impl RegionHeader {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != REGION_HEADER_SIZE {
            return Err(Error::HeaderTruncated {
                length: bytes.len(),
                expected: REGION_HEADER_SIZE,
            });
        }
        Ok(Self(bytes.into_boxed_slice()))
    }

    fn slot(&self, base: usize, x: u32, z: u32) -> Result<&[u8]> {
        if x >= REGION_SIZE || z >= REGION_SIZE {
            return Err(Error::InvalidColumnCoords { x, z });
        }
        let offset = base + LOCATION_SIZE * CIndex((x, z).into()).to_flat_index();
        self.0
            .get(offset..offset + LOCATION_SIZE)
            .ok_or(Error::OffsetOutOfBounds { offset })
    }

    /// Get the location entry for the column at `x`, `z` within the region.
    pub fn location_of(&self, x: u32, z: u32) -> Result<ColumnLocation> {
        let slot = self.slot(0, x, z)?;
        Ok(ColumnLocation([slot[0], slot[1], slot[2], slot[3]]))
    }

    /// Get the last-modified time of the column at `x`, `z`, in seconds since the Unix epoch.
    pub fn timestamp_of(&self, x: u32, z: u32) -> Result<u32> {
        Ok(self.slot(TIMESTAMPS_OFFSET, x, z)?.get_u32())
    }

    /// Iterate over the locations of all generated columns.
    pub fn locations(&self) -> impl Iterator<Item = (CIndex, ColumnLocation)> {
        self.0[..TIMESTAMPS_OFFSET]
            .chunks_exact(LOCATION_SIZE)
            .enumerate()
            .map(|(i, slot)| {
                (
                    CIndex::from_flat_index(i),
                    ColumnLocation([slot[0], slot[1], slot[2], slot[3]]),
                )
            })
            .filter(|(_, location)| !location.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CompressionScheme {
    Gzip,
    Zlib,
    Uncompressed,
}

impl CompressionScheme {
    pub fn id(self) -> u8 {
        match self {
            CompressionScheme::Gzip => 1,
            CompressionScheme::Zlib => 2,
            CompressionScheme::Uncompressed => 3,
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let decompressed = match self {
            CompressionScheme::Gzip => {
                let mut decoder = flate2::read::GzDecoder::new(data);
                let mut buffer = Vec::new();
                decoder.read_to_end(&mut buffer).map(|_| buffer)
            }
            CompressionScheme::Zlib => {
                let mut decoder = flate2::write::ZlibDecoder::new(vec![]);
                io::copy(&mut &data[..], &mut decoder).and_then(|_| decoder.finish())
            }
            CompressionScheme::Uncompressed => Ok(data.to_vec()),
        };
        decompressed.map_err(|source| Error::Decompress {
            scheme: self,
            source,
        })
    }
}

impl TryFrom<u8> for CompressionScheme {
    type Error = Error;

    fn try_from(scheme: u8) -> Result<Self> {
        match scheme {
            1 => Ok(CompressionScheme::Gzip),
            2 => Ok(CompressionScheme::Zlib),
            3 => Ok(CompressionScheme::Uncompressed),
            _ => Err(Error::UnsupportedCompression { scheme }),
        }
    }
}

/// A 32x32 grid of columns, decoded on demand from the bytes of a region file.
#[derive(derive_more::Debug)]
pub struct Region {
    pub coords: RCoords,
    header: RegionHeader,
    /// Everything after the header.
    #[debug(ignore)]
    data: Vec<u8>,
}

impl Region {
    pub fn parse<R: Read>(coords: RCoords, mut reader: R) -> Result<Self> {
        let mut header = Vec::with_capacity(REGION_HEADER_SIZE);
        (&mut reader)
            .take(REGION_HEADER_SIZE as u64)
            .read_to_end(&mut header)?;
        let header = RegionHeader::new(header)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        log::trace!("Region::parse: {} ({} data bytes)", coords, data.len());
        Ok(Self {
            coords,
            header,
            data,
        })
    }

    pub fn from_bytes(coords: RCoords, bytes: &[u8]) -> Result<Self> {
        Self::parse(coords, bytes)
    }

    pub fn header(&self) -> &RegionHeader {
        &self.header
    }

    /// Get the still-compressed payload of the column at `x`, `z` and the scheme it was
    /// compressed with.
    pub fn column_payload(&self, x: u32, z: u32) -> Result<(CompressionScheme, &[u8])> {
        let location = self.header.location_of(x, z)?;
        if location.is_empty() {
            return Err(Error::ColumnNotFound { x, z });
        }

        // Offsets count from the start of the file, but the header isn't part of `data`
        let start = location.byte_offset();
        let limit = start + location.max_size();
        let file_len = REGION_HEADER_SIZE + self.data.len();
        let column = start
            .checked_sub(REGION_HEADER_SIZE)
            .and_then(|offset| self.data.get(offset..offset + location.max_size()))
            .ok_or(Error::ColumnOutOfBounds {
                start,
                end: limit,
                limit: file_len,
            })?;
        if column.len() < COLUMN_PREFIX_SIZE {
            return Err(Error::ColumnOutOfBounds {
                start,
                end: start + COLUMN_PREFIX_SIZE,
                limit,
            });
        }

        let mut prefix = column;
        let exact_size = prefix.get_u32();
        if exact_size == 0 || exact_size as usize > location.max_size() {
            return Err(Error::InvalidColumnSize {
                exact: exact_size,
                maximum: location.max_size(),
            });
        }
        // The exact size covers the scheme byte as well as the compressed data
        let end = 4 + exact_size as usize;
        if end > column.len() {
            return Err(Error::ColumnOutOfBounds {
                start,
                end: start + end,
                limit,
            });
        }
        let scheme = CompressionScheme::try_from(prefix.get_u8())?;
        Ok((scheme, &column[COLUMN_PREFIX_SIZE..end]))
    }

    /// Decompress and decode the column at `x`, `z` within the region.
    #[tracing::instrument(level = "debug", skip(self), fields(region = %self.coords))]
    pub fn column(&self, x: u32, z: u32) -> Result<Column> {
        let (scheme, payload) = self.column_payload(x, z)?;
        let data = scheme.decompress(payload)?;
        log::trace!(
            "Region::column: {} <x={} z={}> {:?} {} -> {} bytes",
            self.coords,
            x,
            z,
            scheme,
            payload.len(),
            data.len()
        );
        Column::from_nbt(&data)
    }

    /// Indices of all generated columns, in header order.
    pub fn populated(&self) -> impl Iterator<Item = CIndex> {
        self.header.locations().map(|(index, _)| index)
    }

    /// Decode every generated column in header order.
    pub fn columns(&self) -> impl Iterator<Item = Result<Column>> {
        self.populated().map(move |index| self.column(index.x(), index.z()))
    }
}
