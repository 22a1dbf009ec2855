//! Split-point topology for polygonal mesh editing
//!
//! Points are shared mesh vertices. Each face corner is a split point that
//! instances a point and carries that corner's incoming and outgoing edge, so
//! a face boundary is the cycle `split point -> outgoing edge -> destination`.
//! All records live in arenas and refer to each other by generation-tagged
//! handles.

mod circulators;
mod construction;
mod deletion;
mod modification;
mod navigation;
mod types;
mod validation;

pub use circulators::{
    FaceEdgeCirculator, FacePointCirculator, FaceSplitPointCirculator, PointEdgeIterator,
    PointFaceIterator, PointSplitPointIterator,
};
pub use types::{
    CreateFaceResult, Edge, EdgeId, Face, FaceId, Point, PointId, RemovedElements, SplitPoint,
    SplitPointId,
};
pub use validation::{ValidationReport, Violation};

use trellis_config::GeometryConfig;

use crate::arena::Arena;

/// Split-point topology.
///
/// Sole owner of all point, split point, edge and face records.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) points: Arena<PointId, Point>,
    pub(crate) split_points: Arena<SplitPointId, SplitPoint>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) faces: Arena<FaceId, Face>,
    pub(crate) config: GeometryConfig,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn split_point_count(&self) -> usize {
        self.split_points.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn has_point(&self, p: PointId) -> bool {
        self.points.has(p)
    }

    pub fn has_split_point(&self, s: SplitPointId) -> bool {
        self.split_points.has(s)
    }

    pub fn has_edge(&self, e: EdgeId) -> bool {
        self.edges.has(e)
    }

    pub fn has_face(&self, f: FaceId) -> bool {
        self.faces.has(f)
    }

    /// Live points in handle order
    pub fn points(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.handles()
    }

    /// Live split points in handle order
    pub fn split_points(&self) -> impl Iterator<Item = SplitPointId> + '_ {
        self.split_points.handles()
    }

    /// Live edges in handle order
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.handles()
    }

    /// Live faces in handle order
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.handles()
    }

    /// Upper bound on the length of any boundary walk.
    pub(crate) fn walk_limit(&self) -> usize {
        self.split_points.len() + 1
    }

    /// Runs the validator after a mutation when the config asks for it.
    pub(crate) fn check_after(&self, operation: &str) {
        if !self.config.validate_after_mutation {
            return;
        }
        let report = self.validate();
        report.log(operation);
        debug_assert!(
            report.is_valid(),
            "{} left the topology invalid:\n{}",
            operation,
            report
        );
    }
}
