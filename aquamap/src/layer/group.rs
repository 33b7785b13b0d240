//! Layer group abstraction.
//!
//! The map widget's per-layer groups are external collaborators; the
//! engine only needs add/clear/bounds. [`VectorLayerGroup`] is the
//! in-process implementation used by the CLI and the test suite.

use std::sync::Mutex;

use super::render::RenderObject;
use crate::coord::GeoBounds;

/// Destination for render objects of one layer.
pub trait LayerGroup: Send + Sync {
    /// Adds a render object to the group.
    fn add(&self, object: RenderObject);

    /// Removes every object (full layer reset).
    fn clear(&self);

    /// Number of objects currently in the group.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of all object envelopes, `None` while empty.
    fn bounds(&self) -> Option<GeoBounds>;
}

/// In-memory layer group backed by a vector.
#[derive(Default)]
pub struct VectorLayerGroup {
    objects: Mutex<Vec<RenderObject>>,
}

impl VectorLayerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the current objects without copying them out.
    pub fn with_objects<R>(&self, f: impl FnOnce(&[RenderObject]) -> R) -> R {
        let objects = self.objects.lock().unwrap();
        f(&objects)
    }
}

impl LayerGroup for VectorLayerGroup {
    fn add(&self, object: RenderObject) {
        self.objects.lock().unwrap().push(object);
    }

    fn clear(&self) {
        self.objects.lock().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn bounds(&self) -> Option<GeoBounds> {
        let objects = self.objects.lock().unwrap();
        let mut iter = objects.iter();
        let first = iter.next()?.bounds();
        Some(iter.fold(first, |acc, object| acc.union(&object.bounds())))
    }
}
