//! Navigation and adjacency queries for Topology.
//!
//! Every lookup here is O(1) (or O(star size) for the set queries) and has no
//! side effects. Passing a dead handle panics.

use std::collections::HashSet;

use super::types::{Edge, EdgeId, Face, FaceId, Point, PointId, SplitPoint, SplitPointId};
use super::Topology;

impl Topology {
    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn point(&self, p: PointId) -> &Point {
        self.points.get(p)
    }

    pub fn split_point(&self, s: SplitPointId) -> &SplitPoint {
        self.split_points.get(s)
    }

    pub fn edge(&self, e: EdgeId) -> &Edge {
        self.edges.get(e)
    }

    pub fn face(&self, f: FaceId) -> &Face {
        self.faces.get(f)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Point instanced by a split point
    pub fn get_point(&self, s: SplitPointId) -> PointId {
        self.split_points.get(s).point
    }

    /// Face owning a split point
    pub fn get_face(&self, s: SplitPointId) -> FaceId {
        self.split_points.get(s).face
    }

    /// Face owning an edge
    pub fn get_edge_face(&self, e: EdgeId) -> FaceId {
        self.get_face(self.edges.get(e).source)
    }

    pub fn get_in_edge(&self, s: SplitPointId) -> EdgeId {
        self.split_points.get(s).incoming
    }

    pub fn get_out_edge(&self, s: SplitPointId) -> EdgeId {
        self.split_points.get(s).outgoing
    }

    pub fn get_source(&self, e: EdgeId) -> SplitPointId {
        self.edges.get(e).source
    }

    pub fn get_destination(&self, e: EdgeId) -> SplitPointId {
        self.edges.get(e).destination
    }

    /// Anchor corner of a face
    pub fn get_face_split_point(&self, f: FaceId) -> SplitPointId {
        self.faces.get(f).split_point
    }

    /// Outgoing edge of a face's anchor corner
    pub fn get_face_edge(&self, f: FaceId) -> EdgeId {
        self.get_out_edge(self.get_face_split_point(f))
    }

    pub fn get_next_edge(&self, e: EdgeId) -> EdgeId {
        self.get_out_edge(self.edges.get(e).destination)
    }

    pub fn get_prev_edge(&self, e: EdgeId) -> EdgeId {
        self.get_in_edge(self.edges.get(e).source)
    }

    pub fn get_next_split_point(&self, s: SplitPointId) -> SplitPointId {
        self.get_destination(self.get_out_edge(s))
    }

    pub fn get_prev_split_point(&self, s: SplitPointId) -> SplitPointId {
        self.get_source(self.get_in_edge(s))
    }

    /// Number of corners on a face boundary
    pub fn get_corner_count(&self, f: FaceId) -> usize {
        self.face_split_points(f).count()
    }

    // ========================================================================
    // Set queries
    // ========================================================================

    /// Edges joining `p0` and `p1`, in either direction
    pub fn get_edges(&self, p0: PointId, p1: PointId) -> HashSet<EdgeId> {
        self.points
            .get(p0)
            .edges
            .iter()
            .chain(self.points.get(p1).edges.iter())
            .copied()
            .filter(|&e| {
                let source = self.get_point(self.get_source(e));
                let destination = self.get_point(self.get_destination(e));
                (source == p0 && destination == p1) || (source == p1 && destination == p0)
            })
            .collect()
    }

    /// Faces touching `p`
    pub fn get_faces(&self, p: PointId) -> HashSet<FaceId> {
        self.point_faces(p).collect()
    }

    /// Faces having an edge between `p0` and `p1`
    pub fn get_shared_faces(&self, p0: PointId, p1: PointId) -> HashSet<FaceId> {
        self.get_edges(p0, p1)
            .into_iter()
            .map(|e| self.get_edge_face(e))
            .collect()
    }
}
