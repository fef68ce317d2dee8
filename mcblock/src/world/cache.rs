use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::world::error::Result;
use crate::world::{RCoords, Region};

/// One cache entry; empty until its region has been loaded.
type Slot = Mutex<Option<Arc<Region>>>;

/// Read-through cache of decoded regions, evicting the least recently used.
///
/// Entries are immutable snapshots: a region is never reloaded behind the caller's back, only
/// after [`RegionCache::invalidate`] or [`RegionCache::clear`]. Each entry has its own lock, so
/// concurrent requests for the same region load it once while other regions stay available.
pub struct RegionCache {
    entries: Mutex<LruCache<RCoords, Arc<Slot>>>,
}

impl RegionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_or_load<F>(&self, coords: RCoords, load: F) -> Result<Arc<Region>>
    where
        F: FnOnce() -> Result<Region>,
    {
        let slot = {
            let mut entries = self.entries.lock();
            if !entries.contains(&coords) && entries.len() == entries.cap().get() {
                log::trace!("RegionCache: evicting to make room for {}", coords);
            }
            entries
                .get_or_insert(coords, || Arc::new(Mutex::new(None)))
                .clone()
        };

        let mut guard = slot.lock();
        if let Some(region) = guard.as_ref() {
            log::trace!("RegionCache: hit {}", coords);
            return Ok(region.clone());
        }
        log::debug!("RegionCache: miss {}", coords);
        match load() {
            Ok(region) => {
                let region = Arc::new(region);
                *guard = Some(region.clone());
                Ok(region)
            }
            Err(err) => {
                // Don't keep an empty entry around for a region that failed to load
                drop(guard);
                let mut entries = self.entries.lock();
                if entries
                    .peek(&coords)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot))
                {
                    entries.pop(&coords);
                }
                Err(err)
            }
        }
    }

    /// Drop the cached copy of a region, returning whether there was one.
    pub fn invalidate(&self, coords: RCoords) -> bool {
        let removed = self.entries.lock().pop(&coords).is_some();
        if removed {
            log::debug!("RegionCache: invalidated {}", coords);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RegionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("RegionCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
