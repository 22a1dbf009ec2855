//! Error types for the geometry core.
//!
//! Stale or never-allocated handles are caller bugs and panic at the point of
//! use. The enums here cover malformed input, which is reported before any
//! mutation takes place.

use thiserror::Error;

use crate::topology::{EdgeId, FaceId};

/// Failed arena lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("handle {index} (generation {generation}) refers to a deleted slot")]
    DeletedHandle { index: u32, generation: u32 },
    #[error("handle {index} is out of range ({len} slots allocated)")]
    OutOfRange { index: u32, len: usize },
}

/// Errors that can occur during topology construction and editing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("A face needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("A triangle takes at most 3 existing points, got {count}")]
    TooManyPoints { count: usize },
    #[error("Face {face:?} has only {corners} corners and cannot lose another")]
    FaceTooSmall { face: FaceId, corners: usize },
    #[error("Edge {edge:?} is not on the boundary of face {face:?}")]
    EdgeNotInFace { edge: EdgeId, face: FaceId },
    #[error("Cannot split face {face:?}: {reason}")]
    DegenerateSplit { face: FaceId, reason: String },
}

/// Errors raised by the attribute layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("Face {face:?} has a zero-length normal (are all its points collinear?)")]
    ZeroNormal { face: FaceId },
}

/// Errors raised while closing a face with the geometry builder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    #[error("Cannot close a face with {points} points, at least 3 are required")]
    InvalidFace { points: usize },
    #[error("Point index {0} was never added to the builder")]
    UnknownPoint(u32),
    #[error("Face normal has zero magnitude (are all the points collinear?)")]
    DegenerateNormal,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl From<TopologyError> for BuilderError {
    fn from(err: TopologyError) -> Self {
        Self::Geometry(GeometryError::Topology(err))
    }
}
