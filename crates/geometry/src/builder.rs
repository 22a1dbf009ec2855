//! Incremental face construction over a [`Geometry`].
//!
//! Points are registered once with the builder and referenced by index from
//! any number of faces. A [`FaceBuilder`] only collects indices; the topology
//! is touched when the face is closed, after every input check has passed.
//! Closing creates a triangle from the first three corners and grows it one
//! corner at a time by splitting the trailing edge, so the builder never
//! bypasses the topology API.

use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, warn};

use crate::arena::AssociativeArena;
use crate::error::BuilderError;
use crate::geometry::{Geometry, VertexAttributes};
use crate::normal::unit_normal;
use crate::topology::{FaceId, PointId};

/// A registered point and the topology point it became, once closed into a face
#[derive(Debug, Clone)]
struct PointData {
    attributes: VertexAttributes,
    point: Option<PointId>,
}

/// Builds faces into a borrowed [`Geometry`]
pub struct GeometryBuilder<'g> {
    geometry: &'g mut Geometry,
    point_data: AssociativeArena<u32, PointData>,
}

/// Ordered point indices of a face under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceBuilder {
    indices: Vec<u32>,
}

impl FaceBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
        }
    }

    /// Append the next corner in boundary order.
    pub fn add_index(&mut self, index: u32) -> &mut Self {
        self.indices.push(index);
        self
    }

    /// Point index of corner `i`. Panics when out of range.
    pub fn index(&self, i: usize) -> u32 {
        self.indices[i]
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn close(self, builder: &mut GeometryBuilder<'_>) -> Result<FaceId, BuilderError> {
        builder.close_face(self)
    }
}

impl<'g> GeometryBuilder<'g> {
    pub fn new(geometry: &'g mut Geometry) -> Self {
        Self {
            geometry,
            point_data: AssociativeArena::new(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &*self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut *self.geometry
    }

    /// Register a point at `position` and return its index.
    pub fn add_point(&mut self, position: Vec3) -> u32 {
        self.add_point_with_attributes(VertexAttributes {
            position,
            ..Default::default()
        })
    }

    /// Register a point with full vertex attributes. The normal is replaced
    /// by the face normal when the point is closed into a face.
    pub fn add_point_with_attributes(&mut self, attributes: VertexAttributes) -> u32 {
        self.point_data.create(PointData {
            attributes,
            point: None,
        })
    }

    /// Number of registered points
    pub fn point_count(&self) -> usize {
        self.point_data.len()
    }

    /// Topology point behind a registered index, if it has been closed into a
    /// face and is still alive.
    pub fn point(&self, index: u32) -> Option<PointId> {
        self.point_data
            .get(&index)
            .and_then(|data| data.point)
            .filter(|&p| self.geometry.topology().has_point(p))
    }

    /// Start a face, reserving room for `points` corners.
    pub fn start_face(&self, points: Option<usize>) -> FaceBuilder {
        FaceBuilder::with_capacity(points.unwrap_or(self.geometry.config().face_capacity_hint))
    }

    pub fn start_faces(&self, count: usize, points: Option<usize>) -> Vec<FaceBuilder> {
        (0..count).map(|_| self.start_face(points)).collect()
    }

    /// Turn the collected indices into a face.
    ///
    /// Nothing is written to the geometry unless the face has at least three
    /// known points with a non-degenerate normal.
    pub fn close_face(&mut self, face: FaceBuilder) -> Result<FaceId, BuilderError> {
        // ===== PHASE 1: VALIDATE (read-only) =====
        if face.len() < 3 {
            warn!("close_face: rejected face with {} points", face.len());
            return Err(BuilderError::InvalidFace { points: face.len() });
        }

        let mut corners = Vec::with_capacity(face.len());
        for &index in face.indices() {
            let data = self.point_data.get(&index).ok_or_else(|| {
                warn!("close_face: unknown point index {}", index);
                BuilderError::UnknownPoint(index)
            })?;
            corners.push((index, data.attributes));
        }

        let epsilon = self.geometry.config().degenerate_normal_epsilon;
        let normal = unit_normal(corners.iter().map(|(_, a)| a.position), epsilon)
            .ok_or_else(|| {
                warn!("close_face: degenerate normal over indices {:?}", face.indices());
                BuilderError::DegenerateNormal
            })?;

        // ===== PHASE 2: RESOLVE POINTS =====
        let mut resolved: HashMap<u32, PointId> = HashMap::with_capacity(corners.len());
        let mut points = Vec::with_capacity(corners.len());
        for &(index, attributes) in &corners {
            let p = match resolved.get(&index) {
                Some(&p) => p,
                None => {
                    let p = match self.point(index) {
                        Some(p) => p,
                        None => self.geometry.create_vertex(attributes.position),
                    };
                    resolved.insert(index, p);
                    if let Some(data) = self.point_data.get_mut(&index) {
                        data.point = Some(p);
                    }
                    p
                }
            };
            points.push(p);
        }

        // ===== PHASE 3: BUILD =====
        let result = self.geometry.create_triangle(&points[..3])?;
        let first = result.split_points[0];
        for &p in &points[3..] {
            let trailing = self.geometry.topology().get_in_edge(first);
            self.geometry.split_edge_with_point(trailing, p);
        }

        // ===== PHASE 4: ATTRIBUTES =====
        for (&(_, attributes), &p) in corners.iter().zip(&points) {
            self.geometry.set_vertex_attributes(
                p,
                VertexAttributes {
                    normal,
                    ..attributes
                },
            );
        }
        self.geometry.face_attributes_mut(result.face).normal = normal;

        debug!(
            "close_face: face={:?} corners={} normal={:?}",
            result.face,
            points.len(),
            normal
        );
        Ok(result.face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;
    use trellis_config::GeometryConfig;

    fn geometry() -> Geometry {
        Geometry::with_config(GeometryConfig::validating())
    }

    fn add_unit_square(builder: &mut GeometryBuilder<'_>) -> Vec<u32> {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
        .into_iter()
        .map(|position| builder.add_point(position))
        .collect()
    }

    #[test]
    fn test_square_normal_points_up() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let indices = add_unit_square(&mut builder);

        let mut face = builder.start_face(Some(4));
        for &i in &indices {
            face.add_index(i);
        }
        let f = face.close(&mut builder).unwrap();

        let normal = geometry.face_attributes(f).normal;
        assert_relative_eq!(normal.x, 0.0);
        assert_relative_eq!(normal.y, 0.0);
        assert_relative_eq!(normal.z, 1.0);
    }

    #[test]
    fn test_pentagon_round_trips_positions_and_normals() {
        let positions: Vec<Vec3> = (0..5)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 5.0;
                Vec3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();

        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let mut face = builder.start_face(None);
        for &position in &positions {
            let index = builder.add_point(position);
            face.add_index(index);
        }
        let f = builder.close_face(face).unwrap();

        let topology = geometry.topology();
        assert_eq!(topology.get_corner_count(f), 5);
        assert!(topology.is_valid());

        let walked: Vec<Vec3> = geometry.face_positions(f);
        let offset = walked
            .iter()
            .position(|p| *p == positions[0])
            .unwrap();
        for (i, expected) in positions.iter().enumerate() {
            assert_eq!(walked[(offset + i) % 5], *expected);
        }

        let face_normal = geometry.face_attributes(f).normal;
        assert_relative_eq!(face_normal.z, 1.0, epsilon = 1e-6);
        for p in topology.face_points(f) {
            assert_eq!(geometry.vertex_attributes(p).normal, face_normal);
        }
    }

    #[test]
    fn test_shared_indices_reuse_points() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let square = add_unit_square(&mut builder);
        let apex = builder.add_point(Vec3::new(0.5, 2.0, 0.0));

        let mut bottom = builder.start_face(None);
        for &i in &square {
            bottom.add_index(i);
        }
        bottom.close(&mut builder).unwrap();

        let mut top = builder.start_face(Some(3));
        top.add_index(square[3]).add_index(square[2]).add_index(apex);
        top.close(&mut builder).unwrap();

        let shared = builder.point(square[2]).unwrap();
        let other = builder.point(square[3]).unwrap();
        let topology = geometry.topology();
        assert_eq!(topology.point_count(), 5);
        assert_eq!(topology.face_count(), 2);
        assert_eq!(topology.get_edges(shared, other).len(), 2);
        assert_eq!(topology.get_faces(shared).len(), 2);
        assert!(topology.is_valid());
    }

    #[test]
    fn test_attributes_are_written_to_points() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let mut face = builder.start_face(None);
        for (i, position) in [Vec3::ZERO, Vec3::X, Vec3::Y].into_iter().enumerate() {
            let index = builder.add_point_with_attributes(VertexAttributes {
                position,
                normal: Vec3::NEG_Z,
                tex_coords: Vec2::new(i as f32, 0.0),
            });
            face.add_index(index);
        }
        let f = face.close(&mut builder).unwrap();

        let attributes: Vec<VertexAttributes> = geometry
            .topology()
            .face_points(f)
            .map(|p| geometry.vertex_attributes(p))
            .collect();
        assert_eq!(attributes[1].position, Vec3::X);
        assert_eq!(attributes[2].tex_coords, Vec2::new(2.0, 0.0));
        assert_eq!(attributes[0].normal, Vec3::Z);
    }

    #[test]
    fn test_too_few_points_is_invalid_face() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let a = builder.add_point(Vec3::ZERO);
        let b = builder.add_point(Vec3::X);

        let mut face = builder.start_face(None);
        face.add_index(a).add_index(b);

        assert_eq!(
            builder.close_face(face).unwrap_err(),
            BuilderError::InvalidFace { points: 2 }
        );
        assert_eq!(geometry.topology().point_count(), 0);
    }

    #[test]
    fn test_collinear_points_are_rejected() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let mut face = builder.start_face(None);
        for x in 0..4 {
            let index = builder.add_point(Vec3::new(x as f32, x as f32, 0.0));
            face.add_index(index);
        }

        assert_eq!(
            builder.close_face(face).unwrap_err(),
            BuilderError::DegenerateNormal
        );
        assert_eq!(geometry.topology().point_count(), 0);
        assert_eq!(geometry.topology().face_count(), 0);
    }

    #[test]
    fn test_sub_millimetre_triangle_closes() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let mut face = builder.start_face(Some(3));
        for position in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5e-4, 0.0, 0.0),
            Vec3::new(0.0, 5e-4, 0.0),
        ] {
            let index = builder.add_point(position);
            face.add_index(index);
        }

        let f = builder.close_face(face).unwrap();

        assert_relative_eq!(geometry.face_attributes(f).normal.z, 1.0);
    }

    #[test]
    fn test_non_finite_position_is_rejected() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let mut face = builder.start_face(Some(3));
        for position in [Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y] {
            let index = builder.add_point(position);
            face.add_index(index);
        }

        assert_eq!(
            builder.close_face(face).unwrap_err(),
            BuilderError::DegenerateNormal
        );
        assert_eq!(geometry.topology().face_count(), 0);
    }

    #[test]
    fn test_unknown_index_is_rejected() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let square = add_unit_square(&mut builder);

        let mut face = builder.start_face(None);
        face.add_index(square[0]).add_index(square[1]).add_index(42);

        assert_eq!(
            builder.close_face(face).unwrap_err(),
            BuilderError::UnknownPoint(42)
        );
        assert_eq!(geometry.topology().point_count(), 0);
    }

    #[test]
    fn test_deleted_cached_point_is_recreated() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let square = add_unit_square(&mut builder);
        let mut face = builder.start_face(None);
        for &i in &square {
            face.add_index(i);
        }
        let first = face.close(&mut builder).unwrap();
        let stale = builder.point(square[0]).unwrap();

        builder.geometry_mut().delete_face(first);
        assert_eq!(builder.point(square[0]), None);

        let mut faces = builder.start_faces(2, Some(3));
        faces[0].add_index(square[0]).add_index(square[1]).add_index(square[2]);
        faces[1].add_index(square[0]).add_index(square[2]).add_index(square[3]);
        for face in faces {
            face.close(&mut builder).unwrap();
        }

        let fresh = builder.point(square[0]).unwrap();
        assert_ne!(fresh, stale);
        assert_eq!(geometry.topology().point_count(), 4);
        assert!(geometry.topology().is_valid());
    }

    #[test]
    fn test_repeated_index_within_face_uses_one_point() {
        let mut geometry = geometry();
        let mut builder = GeometryBuilder::new(&mut geometry);
        let square = add_unit_square(&mut builder);
        let mut face = builder.start_face(None);
        face.add_index(square[0])
            .add_index(square[1])
            .add_index(square[2])
            .add_index(square[0])
            .add_index(square[3]);

        let f = face.close(&mut builder).unwrap();

        let topology = geometry.topology();
        assert_eq!(topology.get_corner_count(f), 5);
        assert_eq!(topology.point_count(), 4);
        assert!(topology.is_valid());
    }

    #[test]
    #[should_panic]
    fn test_face_builder_index_out_of_range_panics() {
        let mut face = FaceBuilder::default();
        face.add_index(7);
        assert_eq!(face.index(0), 7);
        face.index(1);
    }
}
