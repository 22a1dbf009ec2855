//! Validation methods for Topology.
//!
//! The validator walks every record through the non-panicking arena lookups,
//! so it can describe a corrupted topology instead of crashing on it. Each
//! broken reference becomes one [`Violation`].

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::error;

use super::types::{Edge, EdgeId, FaceId, PointId, SplitPointId};
use super::Topology;

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Point {point:?}: star edge {edge:?} does not exist")]
    StarEdgeMissing { point: PointId, edge: EdgeId },
    #[error("Point {point:?}: star edge {edge:?} starts on point {actual:?}")]
    StarEdgeForeign {
        point: PointId,
        edge: EdgeId,
        actual: PointId,
    },
    #[error("Split point {split_point:?}: point {point:?} does not exist")]
    SplitPointPointMissing {
        split_point: SplitPointId,
        point: PointId,
    },
    #[error("Split point {split_point:?}: face {face:?} does not exist")]
    SplitPointFaceMissing {
        split_point: SplitPointId,
        face: FaceId,
    },
    #[error("Split point {split_point:?}: {role} edge {edge:?} does not exist")]
    SplitPointEdgeMissing {
        split_point: SplitPointId,
        edge: EdgeId,
        role: &'static str,
    },
    #[error("Split point {split_point:?}: {role} edge {edge:?} does not point back")]
    SplitPointEdgeMismatch {
        split_point: SplitPointId,
        edge: EdgeId,
        role: &'static str,
    },
    #[error("Edge {edge:?}: {role} {split_point:?} does not exist")]
    EdgeEndpointMissing {
        edge: EdgeId,
        split_point: SplitPointId,
        role: &'static str,
    },
    #[error("Edge {edge:?}: {role} {split_point:?} does not point back")]
    EdgeEndpointMismatch {
        edge: EdgeId,
        split_point: SplitPointId,
        role: &'static str,
    },
    #[error("Edge {edge:?}: missing from the star of point {point:?}")]
    EdgeNotInStar { edge: EdgeId, point: PointId },
    #[error("Face {face:?}: anchor {split_point:?} does not exist")]
    FaceAnchorMissing {
        face: FaceId,
        split_point: SplitPointId,
    },
    #[error("Face {face:?}: boundary walk breaks at {split_point:?}")]
    FaceCycleBroken {
        face: FaceId,
        split_point: SplitPointId,
    },
    #[error("Face {face:?}: boundary does not close within {limit} steps")]
    FaceCycleUnbounded { face: FaceId, limit: usize },
    #[error("Face {face:?}: corner {split_point:?} belongs to face {owner:?}")]
    FaceCornerForeign {
        face: FaceId,
        split_point: SplitPointId,
        owner: FaceId,
    },
    #[error("Split point {split_point:?}: not on the boundary of its face {face:?}")]
    SplitPointUnreachable {
        split_point: SplitPointId,
        face: FaceId,
    },
    #[error("Face {face:?}: only {corners} corners")]
    FaceTooSmall { face: FaceId, corners: usize },
}

/// Outcome of [`Topology::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Emit one error event per violation.
    pub fn log(&self, operation: &str) {
        for violation in &self.violations {
            error!("{}: {}", operation, violation);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return writeln!(f, "topology is valid");
        }
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl Topology {
    /// Check every adjacency invariant and collect what is broken.
    pub fn validate(&self) -> ValidationReport {
        let mut violations = Vec::new();
        self.validate_points(&mut violations);
        self.validate_split_points(&mut violations);
        self.validate_edges(&mut violations);
        self.validate_faces(&mut violations);
        ValidationReport { violations }
    }

    /// Validate and log any violations.
    pub fn is_valid(&self) -> bool {
        let report = self.validate();
        report.log("validate");
        report.is_valid()
    }

    /// Human readable listing of every live record.
    pub fn dump(&self) -> String {
        Dump(self).to_string()
    }

    fn validate_points(&self, violations: &mut Vec<Violation>) {
        for (p, point) in self.points.iter() {
            for &e in &point.edges {
                let Ok(edge) = self.edges.try_get(e) else {
                    violations.push(Violation::StarEdgeMissing { point: p, edge: e });
                    continue;
                };
                // Missing sources are reported by the edge pass
                if let Ok(source) = self.split_points.try_get(edge.source) {
                    if source.point != p {
                        violations.push(Violation::StarEdgeForeign {
                            point: p,
                            edge: e,
                            actual: source.point,
                        });
                    }
                }
            }
        }
    }

    fn validate_split_points(&self, violations: &mut Vec<Violation>) {
        for (s, split_point) in self.split_points.iter() {
            if !self.points.has(split_point.point) {
                violations.push(Violation::SplitPointPointMissing {
                    split_point: s,
                    point: split_point.point,
                });
            }
            if !self.faces.has(split_point.face) {
                violations.push(Violation::SplitPointFaceMissing {
                    split_point: s,
                    face: split_point.face,
                });
            }

            let checks: [(&'static str, EdgeId, fn(&Edge) -> SplitPointId); 2] = [
                ("incoming", split_point.incoming, |e| e.destination),
                ("outgoing", split_point.outgoing, |e| e.source),
            ];
            for (role, e, end) in checks {
                match self.edges.try_get(e) {
                    Err(_) => violations.push(Violation::SplitPointEdgeMissing {
                        split_point: s,
                        edge: e,
                        role,
                    }),
                    Ok(edge) if end(edge) != s => {
                        violations.push(Violation::SplitPointEdgeMismatch {
                            split_point: s,
                            edge: e,
                            role,
                        })
                    }
                    Ok(_) => {}
                }
            }
        }
    }

    fn validate_edges(&self, violations: &mut Vec<Violation>) {
        for (e, edge) in self.edges.iter() {
            match self.split_points.try_get(edge.source) {
                Err(_) => violations.push(Violation::EdgeEndpointMissing {
                    edge: e,
                    split_point: edge.source,
                    role: "source",
                }),
                Ok(source) => {
                    if source.outgoing != e {
                        violations.push(Violation::EdgeEndpointMismatch {
                            edge: e,
                            split_point: edge.source,
                            role: "source",
                        });
                    }
                    let in_star = self
                        .points
                        .try_get(source.point)
                        .map(|point| point.edges.contains(&e))
                        .unwrap_or(true);
                    if !in_star {
                        violations.push(Violation::EdgeNotInStar {
                            edge: e,
                            point: source.point,
                        });
                    }
                }
            }

            match self.split_points.try_get(edge.destination) {
                Err(_) => violations.push(Violation::EdgeEndpointMissing {
                    edge: e,
                    split_point: edge.destination,
                    role: "destination",
                }),
                Ok(destination) if destination.incoming != e => {
                    violations.push(Violation::EdgeEndpointMismatch {
                        edge: e,
                        split_point: edge.destination,
                        role: "destination",
                    })
                }
                Ok(_) => {}
            }
        }
    }

    fn validate_faces(&self, violations: &mut Vec<Violation>) {
        let limit = self.walk_limit();
        let mut visited = HashSet::with_capacity(self.split_points.len());
        for (f, face) in self.faces.iter() {
            let start = face.split_point;
            if !self.split_points.has(start) {
                violations.push(Violation::FaceAnchorMissing {
                    face: f,
                    split_point: start,
                });
                continue;
            }

            let mut corners = 0;
            let mut current = start;
            loop {
                let Some(next) = self
                    .split_points
                    .try_get(current)
                    .ok()
                    .and_then(|s| self.edges.try_get(s.outgoing).ok())
                    .map(|e| e.destination)
                else {
                    violations.push(Violation::FaceCycleBroken {
                        face: f,
                        split_point: current,
                    });
                    break;
                };
                if let Ok(split_point) = self.split_points.try_get(current) {
                    if split_point.face == f {
                        visited.insert(current);
                    } else {
                        violations.push(Violation::FaceCornerForeign {
                            face: f,
                            split_point: current,
                            owner: split_point.face,
                        });
                    }
                }

                corners += 1;
                if next == start {
                    if corners < 3 {
                        violations.push(Violation::FaceTooSmall { face: f, corners });
                    }
                    break;
                }
                if corners >= limit {
                    violations.push(Violation::FaceCycleUnbounded { face: f, limit });
                    break;
                }
                current = next;
            }
        }

        // Corners of missing faces are reported by the split point pass
        for (s, split_point) in self.split_points.iter() {
            if self.faces.has(split_point.face) && !visited.contains(&s) {
                violations.push(Violation::SplitPointUnreachable {
                    split_point: s,
                    face: split_point.face,
                });
            }
        }
    }
}

struct Dump<'a>(&'a Topology);

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topology = self.0;

        writeln!(f, "Points:")?;
        for (p, point) in topology.points.iter() {
            let edges: Vec<String> = point.edges.iter().map(|e| e.to_string()).collect();
            writeln!(f, "  {}: Edges [{}]", p, edges.join(", "))?;
        }

        writeln!(f, "SplitPoints:")?;
        for (s, split_point) in topology.split_points.iter() {
            writeln!(
                f,
                "  {}: P {} F {} In {} Out {}",
                s, split_point.point, split_point.face, split_point.incoming, split_point.outgoing
            )?;
        }

        writeln!(f, "Edges:")?;
        for (e, edge) in topology.edges.iter() {
            writeln!(f, "  {}: {} -> {}", e, edge.source, edge.destination)?;
        }

        writeln!(f, "Faces:")?;
        for (face_id, face) in topology.faces.iter() {
            writeln!(f, "  {}: SP {}", face_id, face.split_point)?;
        }
        Ok(())
    }
}
