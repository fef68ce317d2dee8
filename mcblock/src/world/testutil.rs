//! Builders for synthetic column records and region files used by tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::world::nbt;
use crate::world::packed::{self, Packing};
use crate::world::region::{CompressionScheme, REGION_HEADER_SIZE, SECTOR_SIZE};
use crate::world::{REGION_SIZE, SECTION_BLOCK_COUNT};

/// Block states for a chunk that is air everywhere except stone at `flat_index`.
pub fn stone_at(flat_index: usize, packing: Packing) -> Vec<i64> {
    let mut values = vec![0u64; SECTION_BLOCK_COUNT];
    values[flat_index] = 1;
    packed::pack(&values, 4, packing)
}

fn palette_entry(name: &str) -> nbt::PaletteEntry {
    nbt::PaletteEntry {
        name: name.to_owned(),
        properties: None,
    }
}

/// Pre-flattening section with an `[air, stone]` palette.
pub fn legacy_section(y: i8, block_states: Vec<i64>) -> nbt::LegacySection {
    nbt::LegacySection {
        y,
        palette: vec![palette_entry("minecraft:air"), palette_entry("minecraft:stone")],
        block_states: (!block_states.is_empty()).then(|| fastnbt::LongArray::new(block_states)),
        block_light: Some(fastnbt::ByteArray::new(vec![0; SECTION_BLOCK_COUNT / 2])),
        sky_light: None,
    }
}

pub fn legacy_column_nbt(x: i32, z: i32, data_version: i32, sections: Vec<nbt::LegacySection>) -> Vec<u8> {
    let record = nbt::ColumnRecord {
        data_version,
        level: Some(nbt::LegacyLevel {
            x_pos: x,
            z_pos: z,
            sections,
        }),
        ..Default::default()
    };
    fastnbt::to_bytes(&record).unwrap()
}

/// Column record in the flat layout, from `(y, palette names, block states)` per section.
pub fn flat_column_nbt(x: i32, z: i32, data_version: i32, sections: Vec<(i8, Vec<&str>, Vec<i64>)>) -> Vec<u8> {
    let sections = sections
        .into_iter()
        .map(|(y, palette, data)| nbt::FlatSection {
            y,
            block_states: Some(nbt::FlatBlockStates {
                palette: palette.into_iter().map(palette_entry).collect(),
                data: (!data.is_empty()).then(|| fastnbt::LongArray::new(data)),
            }),
            block_light: None,
            sky_light: None,
        })
        .collect();
    let record = nbt::ColumnRecord {
        data_version,
        x_pos: Some(x),
        z_pos: Some(z),
        sections: Some(sections),
        ..Default::default()
    };
    fastnbt::to_bytes(&record).unwrap()
}

pub fn compress(scheme: CompressionScheme, data: &[u8]) -> Vec<u8> {
    match scheme {
        CompressionScheme::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        CompressionScheme::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        CompressionScheme::Uncompressed => data.to_vec(),
    }
}

/// Assembles a region file, laying out columns in sectors after the header.
#[derive(Default)]
pub struct RegionBuilder {
    columns: Vec<(u32, u32, CompressionScheme, Vec<u8>)>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column from its uncompressed NBT record.
    pub fn column(self, x: u32, z: u32, scheme: CompressionScheme, nbt: &[u8]) -> Self {
        let payload = compress(scheme, nbt);
        self.raw_column(x, z, scheme, &payload)
    }

    /// Add a column whose payload is stored as given.
    pub fn raw_column(mut self, x: u32, z: u32, scheme: CompressionScheme, payload: &[u8]) -> Self {
        self.columns.push((x, z, scheme, payload.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = vec![0u8; REGION_HEADER_SIZE];
        for (x, z, scheme, payload) in self.columns {
            let sector_offset = (bytes.len() / SECTOR_SIZE) as u32;
            bytes.extend_from_slice(&(payload.len() as u32 + 1).to_be_bytes());
            bytes.push(scheme.id());
            bytes.extend_from_slice(&payload);
            let padded = bytes.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
            bytes.resize(padded, 0);
            let sector_count = (padded / SECTOR_SIZE) as u32 - sector_offset;

            let slot = 4 * (x + z * REGION_SIZE) as usize;
            bytes[slot..slot + 3].copy_from_slice(&sector_offset.to_be_bytes()[1..]);
            bytes[slot + 3] = sector_count as u8;
        }
        bytes
    }
}
