//! Polygon normals by Newell's method.

use glam::Vec3;

/// Unnormalized Newell normal of a closed polygon.
///
/// Counter-clockwise winding seen from +Z yields a +Z normal. The length is
/// twice the projected area, so it is zero for collinear input.
pub fn newell_normal(points: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let points: Vec<Vec3> = points.into_iter().collect();
    let mut normal = Vec3::ZERO;
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Unit Newell normal, or `None` for degenerate or non-finite input.
///
/// The squared Newell length scales with the fourth power of the polygon
/// size, so it is compared against `epsilon` times the longest edge to the
/// fourth power. Collinear input is rejected at any scale.
pub fn unit_normal(points: impl IntoIterator<Item = Vec3>, epsilon: f32) -> Option<Vec3> {
    let points: Vec<Vec3> = points.into_iter().collect();
    let normal = newell_normal(points.iter().copied());
    if !normal.is_finite() {
        return None;
    }

    let extent_squared = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance_squared(*b))
        .fold(0.0_f32, f32::max);
    if normal.length_squared() <= epsilon * extent_squared * extent_squared {
        return None;
    }
    Some(normal.normalize())
}
