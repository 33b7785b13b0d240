//! Feature processing pipeline.
//!
//! Turns batches of raw backend features into render objects added to a
//! layer group, without monopolizing the executor for large batches. The
//! processor is the convergence point of both retrieval paths - bulk
//! pagination and viewport tiles - and owns the dedup discipline that
//! makes their overlap harmless.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::FeatureDedupCache;
use crate::feature::{fingerprint, GeometryError, ParsedGeometry, RawFeature};
use crate::layer::{LayerGroup, LayerRegistry, LayerType, RenderGeometry, RenderObject};
use crate::stats::LoaderStats;

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Render objects added to the layer group.
    pub added: usize,
    /// Features skipped as already-seen duplicates.
    pub duplicates: usize,
    /// Features skipped for malformed or unsupported geometry.
    pub invalid: usize,
}

impl ProcessOutcome {
    pub fn total(&self) -> usize {
        self.added + self.duplicates + self.invalid
    }
}

/// Converts raw features into render objects, cooperatively.
pub struct FeatureProcessor {
    dedup: Arc<FeatureDedupCache>,
    registry: Arc<LayerRegistry>,
    stats: Arc<LoaderStats>,
}

impl FeatureProcessor {
    pub fn new(
        dedup: Arc<FeatureDedupCache>,
        registry: Arc<LayerRegistry>,
        stats: Arc<LoaderStats>,
    ) -> Self {
        Self {
            dedup,
            registry,
            stats,
        }
    }

    /// The shared dedup cache (both retrieval paths write through it).
    pub fn dedup_cache(&self) -> &Arc<FeatureDedupCache> {
        &self.dedup
    }

    /// Processes a batch of features into `group`.
    ///
    /// The batch is split into layer-sized chunks with a scheduler yield
    /// between chunks, and the built objects are handed to the group in
    /// smaller sub-batches, again yielding between them - adding many
    /// vector objects to a live layer is itself expensive. Per-feature
    /// failures are logged and skipped; they never abort the batch.
    pub async fn process(
        &self,
        features: Vec<RawFeature>,
        layer: LayerType,
        group: &dyn LayerGroup,
    ) -> ProcessOutcome {
        let chunk_size = layer.chunk_size();
        let render_batch = layer.render_batch_size();
        let descriptor = self.registry.get(layer);
        let mut outcome = ProcessOutcome::default();

        let total = features.len();
        let mut chunk = Vec::with_capacity(chunk_size.min(total));
        let mut iter = features.into_iter().peekable();

        while iter.peek().is_some() {
            chunk.clear();
            chunk.extend(iter.by_ref().take(chunk_size));

            let mut built = Vec::with_capacity(chunk.len());
            for feature in chunk.drain(..) {
                // Fingerprint first: a cache hit costs nothing further.
                let key = fingerprint(&feature);
                if let Some(ref key) = key {
                    if self.dedup.has(key) {
                        outcome.duplicates += 1;
                        continue;
                    }
                }

                match build_render_object(&feature, layer, &descriptor) {
                    Ok(object) => {
                        if let Some(key) = key {
                            self.dedup.mark_seen(&key);
                        }
                        built.push(object);
                    }
                    Err(e) => {
                        outcome.invalid += 1;
                        warn!(
                            layer = layer.as_query(),
                            error = %e,
                            "skipping feature with unusable geometry"
                        );
                    }
                }
            }

            // Hand the chunk's objects to the layer group in sub-batches.
            let mut pending = built.into_iter().peekable();
            while pending.peek().is_some() {
                for object in pending.by_ref().take(render_batch) {
                    group.add(object);
                    outcome.added += 1;
                }
                self.yield_to_scheduler().await;
            }

            if iter.peek().is_some() {
                self.yield_to_scheduler().await;
            }
        }

        self.stats.add_features(outcome.added as u64);
        self.stats.add_duplicates(outcome.duplicates as u64);
        self.stats.add_invalid(outcome.invalid as u64);

        debug!(
            layer = layer.as_query(),
            total = total,
            added = outcome.added,
            duplicates = outcome.duplicates,
            invalid = outcome.invalid,
            "batch processed"
        );

        outcome
    }

    async fn yield_to_scheduler(&self) {
        self.stats.record_yield();
        tokio::task::yield_now().await;
    }
}

/// Builds a render object from one feature.
fn build_render_object(
    feature: &RawFeature,
    layer: LayerType,
    descriptor: &Arc<crate::layer::LayerDescriptor>,
) -> Result<RenderObject, GeometryError> {
    let geometry = match feature.parsed_geometry()? {
        ParsedGeometry::Point { lon, lat } => RenderGeometry::Marker { lon, lat },
        ParsedGeometry::Line(vertices) => RenderGeometry::Polyline { vertices },
    };

    Ok(RenderObject::new(
        layer,
        geometry,
        feature.properties.clone(),
        Arc::clone(descriptor),
    ))
}
