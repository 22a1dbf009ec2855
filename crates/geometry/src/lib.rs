//! Trellis geometry core - split-point mesh topology and attributes
//!
//! This crate provides the mesh representation used by procedural operations:
//! - [`arena`] - Generation-checked handle arenas
//! - [`topology`] - Points, split points, edges and faces with their adjacency
//! - [`geometry`] - Vertex, face and edge attributes over a topology
//! - [`builder`] - Index-based face construction with Newell normals
//! - [`normal`] - Polygon normal computation
//! - [`error`] - Error types for all of the above

pub mod arena;
pub mod builder;
pub mod error;
pub mod geometry;
pub mod normal;
pub mod topology;

pub use builder::{FaceBuilder, GeometryBuilder};
pub use error::{ArenaError, BuilderError, GeometryError, TopologyError};
pub use geometry::{EdgeAttributes, FaceAttributes, Geometry, IndexedMesh, VertexAttributes};
pub use normal::{newell_normal, unit_normal};
pub use topology::{
    CreateFaceResult, EdgeId, FaceId, PointId, RemovedElements, SplitPointId, Topology,
    ValidationReport, Violation,
};
pub use trellis_config::GeometryConfig;
