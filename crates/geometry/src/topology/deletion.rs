//! Deletion methods for Topology.
//!
//! Faces are the unit of removal. Deleting an edge or a split point removes
//! the face that owns it, and deleting a point removes every face around it.
//! Points whose star empties are removed with the face that emptied them.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::types::{EdgeId, FaceId, PointId, RemovedElements, SplitPointId};
use super::Topology;

impl Topology {
    /// Delete a face, its corners and edges, and any point left without edges.
    pub fn delete_face(&mut self, f: FaceId) -> RemovedElements {
        let removed = self.delete_face_unchecked(f);
        self.check_after("delete_face");
        removed
    }

    /// Delete every face around `p`. An isolated point is deleted directly.
    pub fn delete_point(&mut self, p: PointId) -> RemovedElements {
        let faces: BTreeSet<FaceId> = self.point_faces(p).collect();
        let mut removed = RemovedElements::default();

        for f in faces {
            removed.merge(self.delete_face_unchecked(f));
        }
        if self.points.has(p) {
            self.points.delete(p);
            removed.points.insert(p);
        }

        debug!(
            "delete_point: {:?} removed {} faces and {} points",
            p,
            removed.faces.len(),
            removed.points.len()
        );
        self.check_after("delete_point");
        removed
    }

    /// Delete the face owning `e`.
    pub fn delete_edge(&mut self, e: EdgeId) -> RemovedElements {
        let f = self.get_edge_face(e);
        self.delete_face(f)
    }

    /// Delete the face owning `s`.
    pub fn delete_split_point(&mut self, s: SplitPointId) -> RemovedElements {
        let f = self.get_face(s);
        self.delete_face(f)
    }

    fn delete_face_unchecked(&mut self, f: FaceId) -> RemovedElements {
        // ===== PHASE 1: DETACH FROM STARS =====
        let corners: Vec<SplitPointId> = self.face_split_points(f).collect();
        let mut removed = RemovedElements::default();

        for s in corners {
            let split_point = self.split_points.get(s);
            let (p, e) = (split_point.point, split_point.outgoing);

            let star = &mut self.points.get_mut(p).edges;
            star.remove(&e);
            if star.is_empty() {
                removed.points.insert(p);
            }
            removed.split_points.insert(s);
            removed.edges.insert(e);
        }

        // ===== PHASE 2: DELETE =====
        for &s in &removed.split_points {
            self.split_points.delete(s);
        }
        for &e in &removed.edges {
            self.edges.delete(e);
        }
        for &p in &removed.points {
            self.points.delete(p);
        }
        self.faces.delete(f);
        removed.faces.insert(f);

        trace!(
            "delete_face: face={:?} split_points={} points={:?}",
            f,
            removed.split_points.len(),
            removed.points
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::GeometryConfig;

    fn topology() -> Topology {
        Topology::with_config(GeometryConfig::validating())
    }

    #[test]
    fn test_delete_only_face_empties_topology() {
        let mut topology = topology();
        let result = topology.create_face_with(&[None; 4]).unwrap();

        let removed = topology.delete_face(result.face);

        assert_eq!(removed.faces.len(), 1);
        assert_eq!(removed.split_points.len(), 4);
        assert_eq!(removed.edges.len(), 4);
        assert_eq!(removed.points.len(), 4);
        assert_eq!(topology.point_count(), 0);
        assert_eq!(topology.split_point_count(), 0);
        assert_eq!(topology.edge_count(), 0);
        assert_eq!(topology.face_count(), 0);
        assert!(!topology.has_face(result.face));
    }

    #[test]
    fn test_delete_face_keeps_shared_points() {
        let mut topology = topology();
        let first = topology.create_triangle(&[]).unwrap();
        let p0 = topology.get_point(first.split_points[0]);
        let p1 = topology.get_point(first.split_points[1]);
        let second = topology.create_triangle(&[p1, p0]).unwrap();
        let p3 = topology.get_point(second.split_points[2]);

        let removed = topology.delete_face(second.face);

        assert_eq!(removed.points, BTreeSet::from([p3]));
        assert!(topology.has_point(p0));
        assert!(topology.has_point(p1));
        assert_eq!(topology.get_out_edges(p0).count(), 1);
        assert_eq!(topology.point_count(), 3);
        assert!(topology.is_valid());
    }

    #[test]
    fn test_delete_point_removes_incident_faces() {
        let mut topology = topology();
        let first = topology.create_triangle(&[]).unwrap();
        let hub = topology.get_point(first.split_points[0]);
        let second = topology.create_triangle(&[hub]).unwrap();
        let third = topology.create_triangle(&[]).unwrap();

        let removed = topology.delete_point(hub);

        assert_eq!(removed.faces, BTreeSet::from([first.face, second.face]));
        assert!(removed.points.contains(&hub));
        assert_eq!(removed.points.len(), 5);
        assert_eq!(topology.face_count(), 1);
        assert!(topology.has_face(third.face));
        assert!(topology.is_valid());
    }

    #[test]
    fn test_delete_isolated_point() {
        let mut topology = topology();
        let p = topology.create_point();

        let removed = topology.delete_point(p);

        assert_eq!(removed.points, BTreeSet::from([p]));
        assert!(removed.faces.is_empty());
        assert!(!topology.has_point(p));
    }

    #[test]
    fn test_delete_edge_and_split_point_remove_owner() {
        let mut topology = topology();
        let a = topology.create_triangle(&[]).unwrap();
        let b = topology.create_triangle(&[]).unwrap();

        let removed = topology.delete_edge(topology.get_out_edge(a.split_points[1]));
        assert_eq!(removed.faces, BTreeSet::from([a.face]));

        let removed = topology.delete_split_point(b.split_points[2]);
        assert_eq!(removed.faces, BTreeSet::from([b.face]));
        assert!(topology.faces().next().is_none());
    }

    #[test]
    fn test_deleted_slots_are_reused_with_new_generation() {
        let mut topology = topology();
        let first = topology.create_triangle(&[]).unwrap();
        topology.delete_face(first.face);

        let second = topology.create_triangle(&[]).unwrap();

        assert_ne!(first.face, second.face);
        assert!(!topology.has_face(first.face));
        assert!(topology.has_face(second.face));
    }

    #[test]
    #[should_panic(expected = "deleted")]
    fn test_delete_face_twice_panics() {
        let mut topology = topology();
        let result = topology.create_triangle(&[]).unwrap();
        topology.delete_face(result.face);
        topology.delete_face(result.face);
    }
}
