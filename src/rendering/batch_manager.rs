use std::collections::BTreeMap;

use glam::Mat4;

use crate::assets::MaterialHandle;
use crate::rendering::{Renderable, RenderableRef, Renderer};
use crate::scene_graph::NodeId;

/// One object queued for drawing.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub node: Option<NodeId>,
    pub renderable: Renderable,
    pub model_matrix: Mat4,
}

#[derive(Debug)]
struct MaterialBucket(Vec<DrawItem>);

impl MaterialBucket {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn count(&self) -> usize {
        self.0.len()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Debug)]
pub struct DrawFailure {
    pub node: Option<NodeId>,
    pub renderable: RenderableRef,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub material_binds: usize,
    pub draws: usize,
    pub failures: Vec<DrawFailure>,
}

/// Groups draws by material so each material is bound once per flush, no
/// matter how many objects use it.
#[derive(Debug, Default)]
pub struct BatchManager {
    buckets: BTreeMap<MaterialHandle, MaterialBucket>,
}

impl BatchManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, item: DrawItem) {
        self.buckets
            .entry(item.renderable.material)
            .or_insert_with(MaterialBucket::new)
            .0
            .push(item);
    }

    /// Empties every bucket but keeps their allocations for the next frame.
    pub fn clear(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
    }

    pub fn object_count(&self) -> usize {
        self.buckets.values().map(MaterialBucket::count).sum()
    }

    pub fn material_count(&self) -> usize {
        self.buckets.values().filter(|bucket| !bucket.is_empty()).count()
    }

    /// Binds each non-empty bucket's material once, then submits its objects.
    ///
    /// A failed draw is recorded and the rest still go out. A failed bind
    /// skips that bucket's objects, recording each as failed.
    pub fn render(&self, renderer: &mut dyn Renderer, view: &Mat4, projection: &Mat4) -> BatchReport {
        let mut report = BatchReport::default();

        for (&material, bucket) in self.buckets.iter() {
            if bucket.is_empty() {
                continue;
            }

            if let Err(error) = renderer.bind_material(material) {
                log::warn!("Failed to bind material {:?}: {:#}", material, error);
                let message = format!("{:#}", error);
                report.failures.extend(bucket.0.iter().map(|item| DrawFailure {
                    node: item.node,
                    renderable: item.renderable.handle,
                    error: anyhow::anyhow!("material bind failed: {}", message),
                }));
                continue;
            }
            report.material_binds += 1;

            for item in &bucket.0 {
                match renderer.submit_draw(item.renderable.handle, &item.model_matrix, view, projection) {
                    Ok(()) => report.draws += 1,
                    Err(error) => {
                        log::warn!(
                            "Draw failed for {:?} (node {:?}): {:#}",
                            item.renderable.handle,
                            item.node,
                            error
                        );
                        report.failures.push(DrawFailure {
                            node: item.node,
                            renderable: item.renderable.handle,
                            error,
                        });
                    }
                }
            }
        }

        report
    }
}
