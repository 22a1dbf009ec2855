//! Type definitions for the split-point topology.

use std::collections::BTreeSet;

use crate::arena::define_handle;

define_handle!(
    /// Shared mesh vertex
    PointId
);
define_handle!(
    /// One face corner's instance of a point
    SplitPointId
);
define_handle!(
    /// Directed boundary segment between two split points
    EdgeId
);
define_handle!(
    /// Polygon boundary
    FaceId
);

/// A location shared by every face corner that sits on it
#[derive(Debug, Clone, Default)]
pub struct Point {
    /// Outgoing edges of every split point on this point (the star)
    pub edges: BTreeSet<EdgeId>,
}

/// A face corner.
///
/// Carries the adjacency of one face at one point, so the same point can hold
/// different per-face attributes without complicating the shared star.
#[derive(Debug, Clone)]
pub struct SplitPoint {
    pub point: PointId,
    pub face: FaceId,
    pub incoming: EdgeId,
    pub outgoing: EdgeId,
}

/// A directed edge from `source` to `destination`, both corners of one face
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: SplitPointId,
    pub destination: SplitPointId,
}

/// A polygon, anchored at one of its corners
#[derive(Debug, Clone)]
pub struct Face {
    pub split_point: SplitPointId,
}

/// A freshly created face and its corners in boundary order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFaceResult {
    pub face: FaceId,
    pub split_points: Vec<SplitPointId>,
}

/// Everything a delete call removed from the topology
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedElements {
    pub points: BTreeSet<PointId>,
    pub split_points: BTreeSet<SplitPointId>,
    pub edges: BTreeSet<EdgeId>,
    pub faces: BTreeSet<FaceId>,
}

impl RemovedElements {
    pub(crate) fn merge(&mut self, other: RemovedElements) {
        self.points.extend(other.points);
        self.split_points.extend(other.split_points);
        self.edges.extend(other.edges);
        self.faces.extend(other.faces);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.split_points.is_empty()
            && self.edges.is_empty()
            && self.faces.is_empty()
    }
}
