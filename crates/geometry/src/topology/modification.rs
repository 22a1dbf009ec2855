//! Modification methods for Topology.

use tracing::{trace, warn};

use super::types::{Edge, EdgeId, Face, FaceId, PointId, SplitPoint, SplitPointId};
use super::Topology;
use crate::arena::ArenaHandle;
use crate::error::TopologyError;

impl Topology {
    /// Split an edge with a new point.
    ///
    /// See [`Topology::split_edge_with_point`].
    pub fn split_edge(&mut self, e: EdgeId) -> SplitPointId {
        self.edges.get(e);
        let p = self.points.create(Default::default());
        self.split_edge_with_point(e, p)
    }

    /// Insert a corner on `p` between the source and destination of `e`.
    ///
    /// ```text
    ///   A----B             A----B
    ///   |   /              |    |
    ///   |  / e     =>      |    | e
    ///   | /                |    |
    ///   C    p             C----P
    ///                        f
    /// ```
    ///
    /// `e` keeps its source and now ends at the new corner P; a new edge `f`
    /// runs from P to the old destination C. The face anchor is unchanged.
    pub fn split_edge_with_point(&mut self, e: EdgeId, p: PointId) -> SplitPointId {
        // ===== PHASE 1: GATHER (panics on dead handles) =====
        let c = self.get_destination(e);
        let face = self.get_face(c);
        self.points.get(p);

        // ===== PHASE 2: CREATE =====
        let f = self.edges.create(Edge {
            source: SplitPointId::dangling(),
            destination: c,
        });
        let new_split_point = self.split_points.create(SplitPoint {
            point: p,
            face,
            incoming: e,
            outgoing: f,
        });

        // ===== PHASE 3: REWIRE =====
        self.edges.get_mut(f).source = new_split_point;
        self.edges.get_mut(e).destination = new_split_point;
        self.split_points.get_mut(c).incoming = f;
        self.points.get_mut(p).edges.insert(f);

        trace!(
            "split_edge: edge={:?} point={:?} new_split_point={:?} new_edge={:?}",
            e,
            p,
            new_split_point,
            f
        );
        self.check_after("split_edge");

        new_split_point
    }

    /// Remove the source corner of `e`, linking its predecessor straight to
    /// the destination of `e`.
    ///
    /// ```text
    ///        prev                      prev
    ///   ~ A-----B             ~ A
    ///           |                 \
    ///           | e     =>         \
    ///           |                   \
    ///     ~ ----C             ~ -----C
    /// ```
    ///
    /// The source's point is deleted once no corner references it. Returns
    /// the destination corner, which now receives `prev`.
    pub fn collapse_edge(&mut self, e: EdgeId) -> Result<SplitPointId, TopologyError> {
        // ===== PHASE 1: GATHER + VALIDATE =====
        let b = self.get_source(e);
        let c = self.get_destination(e);
        let prev = self.get_prev_edge(e);
        let a = self.get_source(prev);
        let face = self.get_face(b);
        let corners = self.get_corner_count(face);
        if corners <= 3 {
            warn!(
                "collapse_edge: face {:?} has {} corners, refusing to collapse {:?}",
                face, corners, e
            );
            return Err(TopologyError::FaceTooSmall { face, corners });
        }
        let point_b = self.get_point(b);

        // ===== PHASE 2: REWIRE =====
        self.edges.get_mut(prev).destination = c;
        self.split_points.get_mut(c).incoming = prev;
        if self.faces.get(face).split_point == b {
            self.faces.get_mut(face).split_point = a;
        }

        // ===== PHASE 3: DELETE =====
        self.split_points.delete(b);
        self.edges.delete(e);
        let star = &mut self.points.get_mut(point_b).edges;
        star.remove(&e);
        let point_removed = star.is_empty();
        if point_removed {
            self.points.delete(point_b);
        }

        trace!(
            "collapse_edge: edge={:?} removed_split_point={:?} point={:?} (removed={})",
            e,
            b,
            point_b,
            point_removed
        );
        self.check_after("collapse_edge");

        Ok(c)
    }

    /// Cut `f` in two along a new edge pair between the destination of `e1`
    /// (A) and the source of `e0` (D).
    ///
    /// ```text
    ///         e1
    ///  (A)-------B             A/A'------B
    ///    |       |               |\  f   |
    ///    |       |               | \     |
    ///    |       |     =>      e4|  \e2  |
    ///    |       |e0             | e3\   |e0
    ///    |       |               |    \  |
    ///    |       |               | new \ |
    ///    C-------(D)             C------D/D'
    ///       e5                      e5
    /// ```
    ///
    /// The corners walked from A to D (exclusive) move to the new face along
    /// with fresh corners A' and D' on the same points; A and D stay in `f`.
    /// Each side must keep at least 3 corners.
    pub fn split_face(&mut self, f: FaceId, e0: EdgeId, e1: EdgeId) -> Result<FaceId, TopologyError> {
        // ===== PHASE 1: GATHER + VALIDATE (read-only) =====
        for e in [e0, e1] {
            if self.get_edge_face(e) != f {
                warn!("split_face: edge {:?} is not on face {:?}", e, f);
                return Err(TopologyError::EdgeNotInFace { edge: e, face: f });
            }
        }

        let a = self.get_destination(e1);
        let d = self.get_source(e0);
        if a == d {
            warn!("split_face: cut on face {:?} starts and ends at {:?}", f, a);
            return Err(TopologyError::DegenerateSplit {
                face: f,
                reason: "the cut starts and ends at the same corner".into(),
            });
        }

        let corners = self.get_corner_count(f);
        let mut steps_a_to_d = 0;
        let mut current = a;
        while current != d {
            current = self.get_next_split_point(current);
            steps_a_to_d += 1;
        }
        let steps_d_to_a = corners - steps_a_to_d;
        if steps_a_to_d < 2 || steps_d_to_a < 2 {
            warn!(
                "split_face: cut {:?} -> {:?} on face {:?} leaves sides of {} and {} corners",
                a,
                d,
                f,
                steps_a_to_d + 1,
                steps_d_to_a + 1
            );
            return Err(TopologyError::DegenerateSplit {
                face: f,
                reason: format!(
                    "cut would leave a side with fewer than 3 corners ({} and {})",
                    steps_a_to_d + 1,
                    steps_d_to_a + 1
                ),
            });
        }

        let e4 = self.get_out_edge(a);
        let e5 = self.get_in_edge(d);
        let point_a = self.get_point(a);
        let point_d = self.get_point(d);

        // ===== PHASE 2: CREATE =====
        let new_face = self.faces.create(Face {
            split_point: SplitPointId::dangling(),
        });
        let e2 = self.edges.create(Edge {
            source: a,
            destination: d,
        });
        let a_ = self.split_points.create(SplitPoint {
            point: point_a,
            face: new_face,
            incoming: EdgeId::dangling(),
            outgoing: e4,
        });
        let d_ = self.split_points.create(SplitPoint {
            point: point_d,
            face: new_face,
            incoming: e5,
            outgoing: EdgeId::dangling(),
        });
        let e3 = self.edges.create(Edge {
            source: d_,
            destination: a_,
        });

        // ===== PHASE 3: REWIRE =====
        let mut current = self.get_destination(e4);
        while current != d {
            self.split_points.get_mut(current).face = new_face;
            current = self.get_next_split_point(current);
        }

        self.split_points.get_mut(a_).incoming = e3;
        self.split_points.get_mut(d_).outgoing = e3;
        self.edges.get_mut(e4).source = a_;
        self.edges.get_mut(e5).destination = d_;
        self.split_points.get_mut(a).outgoing = e2;
        self.split_points.get_mut(d).incoming = e2;

        self.points.get_mut(point_a).edges.insert(e2);
        self.points.get_mut(point_d).edges.insert(e3);

        // A stays on this boundary
        self.faces.get_mut(f).split_point = a;
        self.faces.get_mut(new_face).split_point = a_;

        trace!(
            "split_face: face={:?} e0={:?} e1={:?} new_face={:?} new_edges=({:?}, {:?})",
            f,
            e0,
            e1,
            new_face,
            e2,
            e3
        );
        self.check_after("split_face");

        Ok(new_face)
    }
}
