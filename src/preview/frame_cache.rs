//! Extracted frame cache for scrubbing back and forth.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::core::time::{self, Seconds};
use crate::media::Frame;

/// Cache key: (source_path, source time in milliseconds)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_path: PathBuf,
    millis: i64,
}

impl CacheKey {
    fn new(source_path: &Path, source_time: Seconds) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            millis: time::to_millis(source_time),
        }
    }
}

/// Bounded frame cache. Evicts in insertion order once full.
#[derive(Debug)]
pub struct FrameCache {
    cache: HashMap<CacheKey, Frame>,
    order: VecDeque<CacheKey>,
    max_cache_size: usize,
}

impl FrameCache {
    /// Create a new frame cache holding at most `max_cache_size` frames
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            order: VecDeque::new(),
            max_cache_size,
        }
    }

    /// Get a frame from the cache
    pub fn get(&self, source_path: &Path, source_time: Seconds) -> Option<&Frame> {
        self.cache.get(&CacheKey::new(source_path, source_time))
    }

    /// Insert a frame into the cache
    pub fn insert(&mut self, frame: Frame) {
        if self.max_cache_size == 0 {
            return;
        }

        let key = CacheKey::new(&frame.source_path, frame.source_time);
        if self.cache.insert(key.clone(), frame).is_some() {
            return;
        }
        self.order.push_back(key);

        while self.order.len() > self.max_cache_size {
            if let Some(oldest) = self.order.pop_front() {
                self.cache.remove(&oldest);
            }
        }
    }

    /// Clear all cached frames
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Get the number of cached frames
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new(64)
    }
}
