//! Construction methods for Topology.

use tracing::{trace, warn};

use super::types::{CreateFaceResult, Edge, EdgeId, Face, Point, PointId, SplitPoint, SplitPointId};
use super::Topology;
use crate::arena::ArenaHandle;
use crate::error::TopologyError;

impl Topology {
    /// Add an isolated point with an empty star.
    pub fn create_point(&mut self) -> PointId {
        let p = self.points.create(Point::default());
        trace!("create_point: {:?}", p);
        p
    }

    /// Create a triangle from up to 3 existing points, filling the remaining
    /// corners with new points.
    pub fn create_triangle(&mut self, existing: &[PointId]) -> Result<CreateFaceResult, TopologyError> {
        if existing.len() > 3 {
            warn!("create_triangle: rejected {} existing points", existing.len());
            return Err(TopologyError::TooManyPoints {
                count: existing.len(),
            });
        }

        let mut corners = [None; 3];
        for (corner, &p) in corners.iter_mut().zip(existing) {
            *corner = Some(p);
        }
        self.create_face_with(&corners)
    }

    /// Create an N-gon over existing points, in boundary order.
    pub fn create_face(&mut self, points: &[PointId]) -> Result<CreateFaceResult, TopologyError> {
        let corners: Vec<Option<PointId>> = points.iter().copied().map(Some).collect();
        self.create_face_with(&corners)
    }

    /// Create an N-gon where `None` corners get a new point.
    ///
    /// The face, its split points and edges are wired in one step; nothing is
    /// allocated when the input is rejected.
    pub fn create_face_with(
        &mut self,
        corners: &[Option<PointId>],
    ) -> Result<CreateFaceResult, TopologyError> {
        // ===== PHASE 1: VALIDATE (read-only) =====
        if corners.len() < 3 {
            warn!("create_face: rejected face with {} points", corners.len());
            return Err(TopologyError::TooFewPoints {
                count: corners.len(),
            });
        }
        for p in corners.iter().flatten() {
            self.points.get(*p);
        }

        // ===== PHASE 2: ALLOCATE =====
        let size = corners.len();
        let points: Vec<PointId> = corners
            .iter()
            .map(|corner| match corner {
                Some(p) => *p,
                None => self.points.create(Point::default()),
            })
            .collect();

        let face = self.faces.create(Face {
            split_point: SplitPointId::dangling(),
        });
        let edges: Vec<EdgeId> = (0..size)
            .map(|_| {
                self.edges.create(Edge {
                    source: SplitPointId::dangling(),
                    destination: SplitPointId::dangling(),
                })
            })
            .collect();
        let split_points: Vec<_> = (0..size)
            .map(|i| {
                self.split_points.create(SplitPoint {
                    point: points[i],
                    face,
                    incoming: edges[(i + size - 1) % size],
                    outgoing: edges[i],
                })
            })
            .collect();

        // ===== PHASE 3: WIRE =====
        for i in 0..size {
            let edge = self.edges.get_mut(edges[i]);
            edge.source = split_points[i];
            edge.destination = split_points[(i + 1) % size];
            self.points.get_mut(points[i]).edges.insert(edges[i]);
        }
        self.faces.get_mut(face).split_point = split_points[0];

        trace!(
            "create_face: face={:?} points={:?} split_points={:?}",
            face,
            points,
            split_points
        );
        self.check_after("create_face");

        Ok(CreateFaceResult { face, split_points })
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
    fn test_create_triangle_with_new_points() {
        let mut topology = topology();
        let result = topology.create_triangle(&[]).unwrap();

        assert_eq!(result.split_points.len(), 3);
        assert_eq!(topology.point_count(), 3);
        assert_eq!(topology.split_point_count(), 3);
        assert_eq!(topology.edge_count(), 3);
        assert_eq!(topology.face_count(), 1);
        assert!(topology.is_valid());
    }

    #[test]
    fn test_create_two_faces_use_different_handles() {
        let mut topology = topology();
        let a = topology.create_triangle(&[]).unwrap();
        let b = topology.create_triangle(&[]).unwrap();

        assert_ne!(a.face, b.face);
        for s in &a.split_points {
            assert!(!b.split_points.contains(s));
        }
        assert!(topology.is_valid());
    }

    #[test]
    fn test_create_triangle_reuses_points() {
        let mut topology = topology();
        let first = topology.create_triangle(&[]).unwrap();
        let p0 = topology.get_point(first.split_points[0]);
        let p1 = topology.get_point(first.split_points[1]);

        let second = topology.create_triangle(&[p0, p1]).unwrap();

        assert_eq!(topology.get_point(second.split_points[0]), p0);
        assert_eq!(topology.get_point(second.split_points[1]), p1);
        assert_eq!(topology.point_count(), 4);
        assert_eq!(topology.get_out_edges(p0).count(), 2);
        assert!(topology.is_valid());
    }

    #[test]
    fn test_create_triangle_with_every_arity() {
        for existing in 0..=3 {
            let mut topology = topology();
            let given: Vec<PointId> = (0..existing).map(|_| topology.create_point()).collect();
            let result = topology.create_triangle(&given).unwrap();

            assert_eq!(topology.point_count(), 3);
            for (i, p) in given.iter().enumerate() {
                assert_eq!(topology.get_point(result.split_points[i]), *p);
            }
            assert!(topology.is_valid());
        }
    }

    #[test]
    fn test_create_triangle_rejects_four_points() {
        let mut topology = topology();
        let points: Vec<PointId> = (0..4).map(|_| topology.create_point()).collect();
        let err = topology.create_triangle(&points).unwrap_err();
        assert_eq!(err, TopologyError::TooManyPoints { count: 4 });
        assert_eq!(topology.face_count(), 0);
    }

    #[test]
    fn test_create_face_too_few_points_changes_nothing() {
        let mut topology = topology();
        let points: Vec<PointId> = (0..2).map(|_| topology.create_point()).collect();

        let err = topology.create_face(&points).unwrap_err();

        assert_eq!(err, TopologyError::TooFewPoints { count: 2 });
        assert_eq!(topology.point_count(), 2);
        assert_eq!(topology.split_point_count(), 0);
        assert_eq!(topology.edge_count(), 0);
        assert_eq!(topology.face_count(), 0);
    }

    #[test]
    fn test_create_pentagon() {
        let mut topology = topology();
        let points: Vec<PointId> = (0..5).map(|_| topology.create_point()).collect();
        let result = topology.create_face(&points).unwrap();

        let walked: Vec<PointId> = topology.face_points(result.face).collect();
        assert_eq!(walked, points);
        assert!(topology.is_valid());
    }

    #[test]
    #[should_panic(expected = "deleted")]
    fn test_create_face_with_deleted_point_panics() {
        let mut topology = topology();
        let first = topology.create_triangle(&[]).unwrap();
        let p = topology.get_point(first.split_points[0]);
        topology.delete_face(first.face);
        let _ = topology.create_triangle(&[p]);
    }
}
