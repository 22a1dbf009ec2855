//! Attribute layer over the split-point topology.
//!
//! [`Geometry`] owns one [`Topology`] and the attribute records keyed by its
//! handles. Structural edits go through the wrappers here so attribute maps
//! never outlive the elements they describe. Read-only traversal goes through
//! [`Geometry::topology`].

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trellis_config::GeometryConfig;

use crate::arena::AssociativeArena;
use crate::error::GeometryError;
use crate::normal::unit_normal;
use crate::topology::{
    CreateFaceResult, EdgeId, FaceId, PointId, RemovedElements, SplitPointId, Topology,
};

/// Per-vertex attributes, shared by every corner on the point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexAttributes {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

/// Per-face attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub normal: Vec3,
}

/// Per-edge attributes (none yet)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {}

/// Flat vertex/index view for exporters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub positions: Vec<Vec3>,
    /// Boundary-ordered indices into `positions`, one list per face
    pub faces: Vec<Vec<u32>>,
}

impl IndexedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Topology plus vertex, face and edge attributes
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    topology: Topology,
    vertex_attributes: AssociativeArena<PointId, VertexAttributes>,
    face_attributes: AssociativeArena<FaceId, FaceAttributes>,
    edge_attributes: AssociativeArena<EdgeId, EdgeAttributes>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            topology: Topology::with_config(config),
            ..Self::default()
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn config(&self) -> &GeometryConfig {
        self.topology.config()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Add an isolated vertex at `position`.
    pub fn create_vertex(&mut self, position: Vec3) -> PointId {
        let p = self.topology.create_point();
        self.vertex_attributes.insert(
            p,
            VertexAttributes {
                position,
                ..Default::default()
            },
        );
        p
    }

    pub fn create_triangle(&mut self, existing: &[PointId]) -> Result<CreateFaceResult, GeometryError> {
        Ok(self.topology.create_triangle(existing)?)
    }

    pub fn create_face(&mut self, points: &[PointId]) -> Result<CreateFaceResult, GeometryError> {
        Ok(self.topology.create_face(points)?)
    }

    pub fn create_face_with(
        &mut self,
        corners: &[Option<PointId>],
    ) -> Result<CreateFaceResult, GeometryError> {
        Ok(self.topology.create_face_with(corners)?)
    }

    /// Create a face over new points placed at `positions`, in boundary order.
    pub fn create_face_from_positions(&mut self, positions: &[Vec3]) -> Result<FaceId, GeometryError> {
        let corners: Vec<Option<PointId>> = vec![None; positions.len()];
        let result = self.topology.create_face_with(&corners)?;
        for (&s, &position) in result.split_points.iter().zip(positions) {
            let p = self.topology.get_point(s);
            self.vertex_attributes_mut(p).position = position;
        }
        Ok(result.face)
    }

    // ========================================================================
    // Modification
    // ========================================================================

    pub fn split_edge(&mut self, e: EdgeId) -> SplitPointId {
        self.topology.split_edge(e)
    }

    pub fn split_edge_with_point(&mut self, e: EdgeId, p: PointId) -> SplitPointId {
        self.topology.split_edge_with_point(e, p)
    }

    pub fn collapse_edge(&mut self, e: EdgeId) -> Result<SplitPointId, GeometryError> {
        let point = self.topology.get_point(self.topology.get_source(e));
        let survivor = self.topology.collapse_edge(e)?;
        self.edge_attributes.delete(&e);
        if !self.topology.has_point(point) {
            self.vertex_attributes.delete(&point);
        }
        Ok(survivor)
    }

    pub fn split_face(&mut self, f: FaceId, e0: EdgeId, e1: EdgeId) -> Result<FaceId, GeometryError> {
        let new_face = self.topology.split_face(f, e0, e1)?;
        if let Some(attributes) = self.face_attributes.get(&f).copied() {
            self.face_attributes.insert(new_face, attributes);
        }
        Ok(new_face)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    pub fn delete_face(&mut self, f: FaceId) -> RemovedElements {
        let removed = self.topology.delete_face(f);
        self.purge(&removed);
        removed
    }

    pub fn delete_point(&mut self, p: PointId) -> RemovedElements {
        let removed = self.topology.delete_point(p);
        self.purge(&removed);
        removed
    }

    pub fn delete_edge(&mut self, e: EdgeId) -> RemovedElements {
        let removed = self.topology.delete_edge(e);
        self.purge(&removed);
        removed
    }

    pub fn delete_split_point(&mut self, s: SplitPointId) -> RemovedElements {
        let removed = self.topology.delete_split_point(s);
        self.purge(&removed);
        removed
    }

    fn purge(&mut self, removed: &RemovedElements) {
        for p in &removed.points {
            self.vertex_attributes.delete(p);
        }
        for e in &removed.edges {
            self.edge_attributes.delete(e);
        }
        for f in &removed.faces {
            self.face_attributes.delete(f);
        }
        debug!(
            "purged attributes of {} points, {} edges and {} faces",
            removed.points.len(),
            removed.edges.len(),
            removed.faces.len()
        );
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Attributes of `p`, default-initialized if never written.
    #[track_caller]
    pub fn vertex_attributes(&self, p: PointId) -> VertexAttributes {
        self.topology.point(p);
        self.vertex_attributes.get(&p).copied().unwrap_or_default()
    }

    #[track_caller]
    pub fn vertex_attributes_mut(&mut self, p: PointId) -> &mut VertexAttributes {
        self.topology.point(p);
        self.vertex_attributes.get_or_default(p)
    }

    #[track_caller]
    pub fn set_vertex_attributes(&mut self, p: PointId, attributes: VertexAttributes) {
        *self.vertex_attributes_mut(p) = attributes;
    }

    #[track_caller]
    pub fn position(&self, p: PointId) -> Vec3 {
        self.vertex_attributes(p).position
    }

    #[track_caller]
    pub fn set_position(&mut self, p: PointId, position: Vec3) {
        self.vertex_attributes_mut(p).position = position;
    }

    #[track_caller]
    pub fn face_attributes(&self, f: FaceId) -> FaceAttributes {
        self.topology.face(f);
        self.face_attributes.get(&f).copied().unwrap_or_default()
    }

    #[track_caller]
    pub fn face_attributes_mut(&mut self, f: FaceId) -> &mut FaceAttributes {
        self.topology.face(f);
        self.face_attributes.get_or_default(f)
    }

    #[track_caller]
    pub fn edge_attributes(&self, e: EdgeId) -> EdgeAttributes {
        self.topology.edge(e);
        self.edge_attributes.get(&e).copied().unwrap_or_default()
    }

    #[track_caller]
    pub fn edge_attributes_mut(&mut self, e: EdgeId) -> &mut EdgeAttributes {
        self.topology.edge(e);
        self.edge_attributes.get_or_default(e)
    }

    /// Vertex positions around `f`, starting at the anchor.
    pub fn face_positions(&self, f: FaceId) -> Vec<Vec3> {
        self.topology
            .face_points(f)
            .map(|p| self.position(p))
            .collect()
    }

    // ========================================================================
    // Normals
    // ========================================================================

    /// Unit Newell normal of `f` from its current vertex positions.
    pub fn compute_face_normal(&self, f: FaceId) -> Result<Vec3, GeometryError> {
        let epsilon = self.config().degenerate_normal_epsilon;
        unit_normal(self.face_positions(f), epsilon).ok_or_else(|| {
            warn!("compute_face_normal: face {:?} is degenerate", f);
            GeometryError::ZeroNormal { face: f }
        })
    }

    /// Recompute the normal of `f` and store it in the face attributes.
    pub fn update_face_normal(&mut self, f: FaceId) -> Result<Vec3, GeometryError> {
        let normal = self.compute_face_normal(f)?;
        self.face_attributes_mut(f).normal = normal;
        Ok(normal)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Contiguous positions and per-face index lists, in handle order.
    pub fn to_indexed_mesh(&self) -> IndexedMesh {
        let mut indices = HashMap::with_capacity(self.topology.point_count());
        let mut positions = Vec::with_capacity(self.topology.point_count());
        for p in self.topology.points() {
            indices.insert(p, positions.len() as u32);
            positions.push(self.position(p));
        }

        let faces = self
            .topology
            .faces()
            .map(|f| self.topology.face_points(f).map(|p| indices[&p]).collect())
            .collect();

        IndexedMesh { positions, faces }
    }
}
