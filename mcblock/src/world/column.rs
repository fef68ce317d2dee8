use crate::world::chunk::{BlockState, Chunk};
use crate::world::error::{Error, Result};
use crate::world::nbt;
use crate::world::packed::Packing;
use crate::world::{BIndex, CCoords, CHUNK_SIZE};

/// A 16-block wide vertical stack of chunks.
#[derive(Clone, Debug)]
pub struct Column {
    pub coords: CCoords,
    pub data_version: i32,
    /// Chunks in the order they were stored, which need not follow their vertical index.
    pub chunks: Vec<Chunk>,
}

impl Column {
    /// Decode a column from its uncompressed NBT record.
    pub fn from_nbt(data: &[u8]) -> Result<Column> {
        let record: nbt::ColumnRecord = fastnbt::from_bytes(data)?;
        let data_version = record.data_version;
        let packing = Packing::for_data_version(data_version);

        if let Some(level) = record.level {
            let chunks = level
                .sections
                .into_iter()
                .map(|section| Chunk {
                    y: section.y,
                    palette: section.palette.into_iter().map(BlockState::from).collect(),
                    block_states: section
                        .block_states
                        .map(|data| data.into_inner())
                        .unwrap_or_default(),
                    packing,
                    block_light: section.block_light.map(|data| data.into_inner()),
                    sky_light: section.sky_light.map(|data| data.into_inner()),
                })
                .collect();
            return Ok(Column {
                coords: CCoords((level.x_pos, level.z_pos).into()),
                data_version,
                chunks,
            });
        }

        let Some(sections) = record.sections else {
            return Err(Error::MissingLevel);
        };
        let chunks = sections
            .into_iter()
            .map(|section| {
                let (palette, block_states) = match section.block_states {
                    Some(states) => (
                        states.palette.into_iter().map(BlockState::from).collect(),
                        states.data.map(|data| data.into_inner()).unwrap_or_default(),
                    ),
                    None => (Vec::new(), Vec::new()),
                };
                Chunk {
                    y: section.y,
                    palette,
                    block_states,
                    packing,
                    block_light: section.block_light.map(|data| data.into_inner()),
                    sky_light: section.sky_light.map(|data| data.into_inner()),
                }
            })
            .collect();
        Ok(Column {
            coords: CCoords(
                (
                    record.x_pos.unwrap_or_default(),
                    record.z_pos.unwrap_or_default(),
                )
                    .into(),
            ),
            data_version,
            chunks,
        })
    }

    /// Get the chunk with vertical index `y`.
    ///
    /// Sections that are entirely air may be left out of a column, so a missing chunk is reported
    /// as [`Error::ChunkNotFound`] instead of being treated as air.
    pub fn chunk(&self, y: i8) -> Result<&Chunk> {
        self.chunks
            .iter()
            .find(|chunk| chunk.y == y)
            .ok_or(Error::ChunkNotFound { y: y as i32 })
    }

    /// Get the block at `x`, `z` within the column and absolute height `y`.
    pub fn block_state(&self, x: u32, y: i32, z: u32) -> Result<&BlockState> {
        let chunk_y = y.div_euclid(CHUNK_SIZE as i32);
        let chunk_y = i8::try_from(chunk_y).map_err(|_| Error::ChunkNotFound { y: chunk_y })?;
        let local_y = y.rem_euclid(CHUNK_SIZE as i32) as u32;
        self.chunk(chunk_y)?.block_state(BIndex((x, z, local_y).into()))
    }
}

impl From<nbt::PaletteEntry> for BlockState {
    fn from(entry: nbt::PaletteEntry) -> Self {
        BlockState {
            name: entry.name,
            properties: entry.properties.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::packed;
    use crate::world::testutil::{flat_column_nbt, legacy_column_nbt, legacy_section, stone_at};

    fn chunk(y: i8, name: &str) -> Chunk {
        Chunk::new(y, vec![BlockState::new(name)], vec![], Packing::Aligned)
    }

    #[test]
    fn test_chunk_lookup() {
        let column = Column {
            coords: CCoords((0, 0).into()),
            data_version: 3953,
            chunks: vec![chunk(2, "test:two"), chunk(-1, "test:minus_one"), chunk(0, "test:zero")],
        };
        assert_eq!(column.chunk(0).unwrap().palette[0].name, "test:zero");
        assert_eq!(column.chunk(-1).unwrap().palette[0].name, "test:minus_one");
        assert_eq!(column.chunk(2).unwrap().palette[0].name, "test:two");
        assert!(matches!(column.chunk(1), Err(Error::ChunkNotFound { y: 1 })));

        assert_eq!(column.block_state(3, 35, 4).unwrap().name, "test:two");
        assert_eq!(column.block_state(3, -16, 4).unwrap().name, "test:minus_one");
        assert!(matches!(column.block_state(0, -17, 0), Err(Error::ChunkNotFound { y: -2 })));
        // Far outside the range of vertical indices
        assert!(matches!(
            column.block_state(0, 100_000, 0),
            Err(Error::ChunkNotFound { y: 6250 })
        ));
    }

    #[test]
    fn test_from_legacy_nbt() {
        let data = legacy_column_nbt(
            5,
            -7,
            1976,
            vec![legacy_section(0, stone_at(0, Packing::Straddled)), legacy_section(1, vec![])],
        );
        let column = Column::from_nbt(&data).unwrap();
        assert_eq!(column.coords, CCoords((5, -7).into()));
        assert_eq!(column.data_version, 1976);
        assert_eq!(column.chunks.len(), 2);
        let chunk = column.chunk(0).unwrap();
        assert_eq!(chunk.packing, Packing::Straddled);
        assert_eq!(chunk.block(BIndex((0, 0, 0).into())).unwrap(), "minecraft:stone");
        assert_eq!(chunk.block(BIndex((1, 0, 0).into())).unwrap(), "minecraft:air");
        assert_eq!(chunk.block_light.as_deref().map(|light| light.len()), Some(2048));
        assert!(chunk.sky_light.is_none());
        // Section without block states
        assert!(column.chunk(1).unwrap().block_states.is_empty());
    }

    #[test]
    fn test_from_flat_nbt() {
        let values: Vec<u64> = (0..4096).map(|i| (i % 3 != 0) as u64).collect();
        let data = flat_column_nbt(
            -1,
            2,
            3953,
            vec![
                (-4, vec!["minecraft:air", "minecraft:deepslate"], packed::pack(&values, 4, Packing::Aligned)),
                (5, vec!["minecraft:air"], vec![]),
            ],
        );
        let column = Column::from_nbt(&data).unwrap();
        assert_eq!(column.coords, CCoords((-1, 2).into()));
        assert_eq!(column.block_state(0, -64, 0).unwrap().name, "minecraft:air");
        assert_eq!(column.block_state(1, -64, 0).unwrap().name, "minecraft:deepslate");
        assert_eq!(column.block_state(9, 85, 9).unwrap().name, "minecraft:air");
        assert_eq!(column.chunk(-4).unwrap().packing, Packing::Aligned);
    }

    #[test]
    fn test_missing_level() {
        let data = fastnbt::to_bytes(&nbt::ColumnRecord {
            data_version: 3953,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(Column::from_nbt(&data), Err(Error::MissingLevel)));
    }

    #[test]
    fn test_invalid_nbt() {
        assert!(matches!(Column::from_nbt(&[0xFF, 0x00, 0x01]), Err(Error::Nbt(_))));
    }
}
