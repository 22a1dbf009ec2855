//! Lazy walks over a face boundary or a point's star.
//!
//! Face circulators start at the face's anchor corner and stop after one
//! full turn. Point iterators visit the point's outgoing edges in handle
//! order. Requesting a new one always restarts from the same anchor.

use std::collections::btree_set;

use super::types::{EdgeId, FaceId, PointId, SplitPointId};
use super::Topology;

/// Edges of a face boundary, starting at the anchor's outgoing edge
#[derive(Clone)]
pub struct FaceEdgeCirculator<'a> {
    topology: &'a Topology,
    start: EdgeId,
    current: Option<EdgeId>,
    remaining: usize,
}

impl<'a> FaceEdgeCirculator<'a> {
    fn new(topology: &'a Topology, face: FaceId) -> Self {
        let start = topology.get_face_edge(face);
        Self {
            topology,
            start,
            current: Some(start),
            remaining: topology.walk_limit(),
        }
    }
}

impl Iterator for FaceEdgeCirculator<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let e = self.current?;
        self.remaining = self.remaining.saturating_sub(1);
        let next = self.topology.get_next_edge(e);
        self.current = if next == self.start || self.remaining == 0 {
            None
        } else {
            Some(next)
        };
        Some(e)
    }
}

/// Corners of a face boundary, starting at the anchor
#[derive(Clone)]
pub struct FaceSplitPointCirculator<'a> {
    edges: FaceEdgeCirculator<'a>,
}

impl Iterator for FaceSplitPointCirculator<'_> {
    type Item = SplitPointId;

    fn next(&mut self) -> Option<SplitPointId> {
        let e = self.edges.next()?;
        Some(self.edges.topology.get_source(e))
    }
}

/// Points around a face, starting at the anchor's point
#[derive(Clone)]
pub struct FacePointCirculator<'a> {
    edges: FaceEdgeCirculator<'a>,
}

impl Iterator for FacePointCirculator<'_> {
    type Item = PointId;

    fn next(&mut self) -> Option<PointId> {
        let e = self.edges.next()?;
        let topology = self.edges.topology;
        Some(topology.get_point(topology.get_source(e)))
    }
}

/// Outgoing edges of a point
#[derive(Clone)]
pub struct PointEdgeIterator<'a> {
    edges: btree_set::Iter<'a, EdgeId>,
}

impl Iterator for PointEdgeIterator<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        self.edges.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.edges.size_hint()
    }
}

impl ExactSizeIterator for PointEdgeIterator<'_> {}

/// Split points instancing a point
#[derive(Clone)]
pub struct PointSplitPointIterator<'a> {
    topology: &'a Topology,
    edges: PointEdgeIterator<'a>,
}

impl Iterator for PointSplitPointIterator<'_> {
    type Item = SplitPointId;

    fn next(&mut self) -> Option<SplitPointId> {
        let e = self.edges.next()?;
        Some(self.topology.get_source(e))
    }
}

/// Faces around a point. A face passing through the point twice is
/// yielded twice.
#[derive(Clone)]
pub struct PointFaceIterator<'a> {
    topology: &'a Topology,
    edges: PointEdgeIterator<'a>,
}

impl Iterator for PointFaceIterator<'_> {
    type Item = FaceId;

    fn next(&mut self) -> Option<FaceId> {
        let e = self.edges.next()?;
        Some(self.topology.get_edge_face(e))
    }
}

impl Topology {
    pub fn face_edges(&self, f: FaceId) -> FaceEdgeCirculator<'_> {
        FaceEdgeCirculator::new(self, f)
    }

    pub fn face_split_points(&self, f: FaceId) -> FaceSplitPointCirculator<'_> {
        FaceSplitPointCirculator {
            edges: FaceEdgeCirculator::new(self, f),
        }
    }

    pub fn face_points(&self, f: FaceId) -> FacePointCirculator<'_> {
        FacePointCirculator {
            edges: FaceEdgeCirculator::new(self, f),
        }
    }

    /// Outgoing edges of every corner on `p`
    pub fn get_out_edges(&self, p: PointId) -> PointEdgeIterator<'_> {
        PointEdgeIterator {
            edges: self.points.get(p).edges.iter(),
        }
    }

    pub fn point_split_points(&self, p: PointId) -> PointSplitPointIterator<'_> {
        PointSplitPointIterator {
            topology: self,
            edges: self.get_out_edges(p),
        }
    }

    pub fn point_faces(&self, p: PointId) -> PointFaceIterator<'_> {
        PointFaceIterator {
            topology: self,
            edges: self.get_out_edges(p),
        }
    }
}
