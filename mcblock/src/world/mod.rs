/*
Anvil file format notes:

- A region's column offset table is ordered by (Z, X).
- A chunk's blocks are ordered by (Y, Z, X).
- Region file offsets count from the start of the file, header included.
 */

mod cache;
pub mod chunk;
pub mod column;
pub mod error;
mod nbt;
pub mod packed;
pub mod region;
#[cfg(test)]
pub(crate) mod testutil;

pub use cache::RegionCache;
pub use chunk::{BlockState, Chunk};
pub use column::Column;
pub use error::{Error, Result};
pub use region::{ColumnLocation, CompressionScheme, Region, RegionHeader};

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::coords::{CoordsXZ, CoordsXZY, IndexXZ, IndexXZY};
use crate::settings::Settings;

pub const REGION_SIZE: u32 = 32;
pub const CHUNK_SIZE: u32 = 16;
const SECTION_BLOCK_COUNT: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Global region coordinates.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Deref,
)]
pub struct RCoords(pub CoordsXZ);

/// Global column coordinates.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Deref,
)]
pub struct CCoords(pub CoordsXZ);

impl CCoords {
    pub fn to_region_coords(self) -> (RCoords, CIndex) {
        let region = RCoords(
            (
                self.x().div_euclid(REGION_SIZE as i32),
                self.z().div_euclid(REGION_SIZE as i32),
            )
                .into(),
        );
        let index = CIndex(
            (
                self.x().rem_euclid(REGION_SIZE as i32) as u32,
                self.z().rem_euclid(REGION_SIZE as i32) as u32,
            )
                .into(),
        );
        (region, index)
    }
}

/// 2D column index within a region.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Deref,
)]
pub struct CIndex(pub IndexXZ);

impl CIndex {
    pub fn to_column_coords(self, region_coords: RCoords) -> CCoords {
        CCoords(
            (
                region_coords.x() * REGION_SIZE as i32 + self.x() as i32,
                region_coords.z() * REGION_SIZE as i32 + self.z() as i32,
            )
                .into(),
        )
    }

    pub fn to_flat_index(self) -> usize {
        (self.z() * REGION_SIZE + self.x()) as usize
    }

    pub fn from_flat_index(index: usize) -> Self {
        assert!(
            index < (REGION_SIZE * REGION_SIZE) as usize,
            "not a valid region column index"
        );
        Self((index as u32 % REGION_SIZE, index as u32 / REGION_SIZE).into())
    }
}

/// Global block coordinates.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Deref,
)]
pub struct BCoords(pub CoordsXZY);

impl BCoords {
    pub fn to_column_coords(self) -> CCoords {
        CCoords(
            (
                self.x().div_euclid(CHUNK_SIZE as i32),
                self.z().div_euclid(CHUNK_SIZE as i32),
            )
                .into(),
        )
    }

    /// Vertical index of the chunk containing this block.
    pub fn to_chunk_y(self) -> i32 {
        self.y().div_euclid(CHUNK_SIZE as i32)
    }

    /// Position of this block within its chunk.
    pub fn to_block_index(self) -> BIndex {
        BIndex(
            (
                self.x().rem_euclid(CHUNK_SIZE as i32) as u32,
                self.z().rem_euclid(CHUNK_SIZE as i32) as u32,
                self.y().rem_euclid(CHUNK_SIZE as i32) as u32,
            )
                .into(),
        )
    }
}

/// 3D block index within a chunk.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Deref,
)]
pub struct BIndex(pub IndexXZY);

impl BIndex {
    pub fn to_flat_index(self) -> usize {
        (self.y() * CHUNK_SIZE * CHUNK_SIZE + self.z() * CHUNK_SIZE + self.x()) as usize
    }

    pub fn from_flat_index(index: usize) -> Self {
        assert!(index < SECTION_BLOCK_COUNT, "not a valid chunk block index");
        let x = index & 0xF;
        let z = (index >> 4) & 0xF;
        let y = (index >> 8) & 0xF;
        Self((x as u32, z as u32, y as u32).into())
    }
}

/// Parse region coordinates from a filename of the form `r.<x>.<z>.<extension>`.
pub fn parse_region_filename(filename: &str, extension: &str) -> Option<RCoords> {
    let next = filename.strip_prefix("r.")?;
    let next = next.strip_suffix(extension)?.strip_suffix('.')?;
    let (raw_x, raw_z) = next.split_once('.')?;
    let x = i32::from_str(raw_x).ok()?;
    let z = i32::from_str(raw_z).ok()?;
    Some(RCoords((x, z).into()))
}

/// A directory of region files, e.g. `<world>/region` or `<world>/DIM-1/region`.
///
/// Without a cache every query reads and decodes its region file from scratch, so the files can
/// change underneath a `Dimension` without it ever returning stale data.
#[derive(Debug)]
pub struct Dimension {
    path: PathBuf,
    extension: String,
    cache: Option<RegionCache>,
}

impl Dimension {
    pub fn new<P: Into<PathBuf>>(path: P, settings: &Settings) -> Self {
        let cache = NonZeroUsize::new(settings.cache.capacity).map(RegionCache::new);
        Self {
            path: path.into(),
            extension: settings.region.extension.clone(),
            cache,
        }
    }

    /// Open a dimension with default settings, i.e. without caching.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, &Settings::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cache(&self) -> Option<&RegionCache> {
        self.cache.as_ref()
    }

    pub fn region_path(&self, region_coords: RCoords) -> PathBuf {
        self.path.join(format!(
            "r.{}.{}.{}",
            region_coords.x(),
            region_coords.z(),
            self.extension
        ))
    }

    /// Find all region files in the dimension.
    pub fn list_regions(&self) -> Result<BTreeMap<RCoords, PathBuf>> {
        let mut regions = BTreeMap::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if let Some(coords) = parse_region_filename(filename, &self.extension) {
                regions.insert(coords, path);
            }
        }
        Ok(regions)
    }

    pub fn load_region(&self, region_coords: RCoords) -> Result<Arc<Region>> {
        match &self.cache {
            Some(cache) => cache.get_or_load(region_coords, || self.read_region(region_coords)),
            None => self.read_region(region_coords).map(Arc::new),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(coords = %region_coords))]
    fn read_region(&self, region_coords: RCoords) -> Result<Region> {
        let path = self.region_path(region_coords);
        log::debug!("Dimension::read_region: {:?}", path);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::RegionNotFound { path });
            }
            Err(err) => return Err(err.into()),
        };
        Region::parse(region_coords, BufReader::new(file))
    }

    /// Forget any cached copy of a region, e.g. after its file has been rewritten.
    pub fn invalidate(&self, region_coords: RCoords) {
        if let Some(cache) = &self.cache {
            cache.invalidate(region_coords);
        }
    }

    pub fn column(&self, column_coords: CCoords) -> Result<Column> {
        let (region_coords, column_index) = column_coords.to_region_coords();
        self.load_region(region_coords)?
            .column(column_index.x(), column_index.z())
    }

    pub fn block_state(&self, block_coords: BCoords) -> Result<BlockState> {
        let column = self.column(block_coords.to_column_coords())?;
        let chunk_y = block_coords.to_chunk_y();
        let chunk_y = i8::try_from(chunk_y).map_err(|_| Error::ChunkNotFound { y: chunk_y })?;
        let state = column
            .chunk(chunk_y)?
            .block_state(block_coords.to_block_index())?;
        Ok(state.clone())
    }

    /// Get the id of the block at world coordinates `x`, `y`, `z`, e.g. `minecraft:stone`.
    pub fn block(&self, x: i32, y: i32, z: i32) -> Result<String> {
        Ok(self.block_state(BCoords((x, z, y).into()))?.name)
    }
}
