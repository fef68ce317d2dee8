use std::collections::BTreeMap;
use std::fmt::Write;

use crate::world::error::{Error, Result};
use crate::world::packed::{self, Packing};
use crate::world::{BIndex, CHUNK_SIZE, SECTION_BLOCK_COUNT};

/// A 16x16x16 cube of blocks, each an index into the chunk's palette.
#[derive(Clone, derive_more::Debug)]
pub struct Chunk {
    /// Vertical index, i.e. the chunk covers `y * 16 .. y * 16 + 16`.
    pub y: i8,
    pub palette: Vec<BlockState>,
    #[debug(ignore)]
    pub block_states: Vec<i64>,
    pub packing: Packing,
    #[debug(ignore)]
    pub block_light: Option<Vec<i8>>,
    #[debug(ignore)]
    pub sky_light: Option<Vec<i8>>,
}

impl Chunk {
    pub fn new(y: i8, palette: Vec<BlockState>, block_states: Vec<i64>, packing: Packing) -> Self {
        Self {
            y,
            palette,
            block_states,
            packing,
            block_light: None,
            sky_light: None,
        }
    }

    pub fn bits_per_element(&self) -> u32 {
        packed::bits_per_element(self.palette.len())
    }

    /// Get the palette index of the block at `index`.
    pub fn palette_index(&self, index: BIndex) -> Result<usize> {
        if index.x() >= CHUNK_SIZE || index.z() >= CHUNK_SIZE || index.y() >= CHUNK_SIZE {
            return Err(Error::InvalidBlockIndex {
                x: index.x(),
                z: index.z(),
                y: index.y(),
            });
        }
        self.palette_index_by_flat_index(index.to_flat_index())
    }

    fn palette_index_by_flat_index(&self, i: usize) -> Result<usize> {
        // A uniform chunk in the aligned format has no data at all
        if self.block_states.is_empty() && self.packing == Packing::Aligned && self.palette.len() == 1
        {
            return Ok(0);
        }
        let value = packed::get(i, self.bits_per_element(), &self.block_states, self.packing)?;
        if value >= self.palette.len() as u64 {
            return Err(Error::PaletteIndexOutOfRange {
                index: value,
                length: self.palette.len(),
            });
        }
        Ok(value as usize)
    }

    pub fn block_state(&self, index: BIndex) -> Result<&BlockState> {
        Ok(&self.palette[self.palette_index(index)?])
    }

    /// Get the id of the block at `index`, e.g. `minecraft:stone`.
    pub fn block(&self, index: BIndex) -> Result<&str> {
        Ok(self.block_state(index)?.name.as_str())
    }

    /// Iterate over every block in (Y, Z, X) order.
    pub fn iter_blocks(&self) -> impl Iterator<Item = Result<(BIndex, &BlockState)>> {
        (0..SECTION_BLOCK_COUNT).map(move |i| {
            let palette_index = self.palette_index_by_flat_index(i)?;
            Ok((BIndex::from_flat_index(i), &self.palette[palette_index]))
        })
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockState {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    pub fn new<S: Into<String>>(name: S) -> BlockState {
        BlockState {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Get the name of the block without any namespace prefix, e.g. `water` instead of
    /// `minecraft:water`.
    pub fn short_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_namespace, name)) => name,
            None => &self.name,
        }
    }

    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.as_str())
    }
}

impl std::fmt::Display for BlockState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.properties.is_empty() {
            f.write_char('[')?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_char(']')?;
        }
        Ok(())
    }
}
