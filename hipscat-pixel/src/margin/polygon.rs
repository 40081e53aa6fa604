//! Point-in-polygon on the sphere via a gnomonic (TAN) projection.
//!
//! Great circles project to straight lines under the gnomonic projection, so
//! a polygon whose edges are short arcs stays a polygon in the tangent plane
//! and an ordinary even-odd ray cast decides membership. Points on the far
//! hemisphere have no projection and are outside.

use hipscat_core::constants::DEG_TO_RAD;
use hipscat_core::Vector3;

/// Widening never reaches past this angle from the projection centre.
const MAX_REACH_RAD: f64 = 89.0 * DEG_TO_RAD;

/// Floor on the mitre cosine, bounding the push at very sharp corners.
const MIN_MITRE_COS: f64 = 0.05;

#[derive(Debug, Clone)]
pub(crate) struct TangentPolygon {
    centre: Vector3,
    east: Vector3,
    north: Vector3,
    vertices: Vec<(f64, f64)>,
}

impl TangentPolygon {
    /// Projects `vertices` (RA, Dec in degrees) about `centre`.
    ///
    /// Returns `None` if any vertex lies on the far hemisphere, or if fewer
    /// than three vertices are given.
    pub(crate) fn from_radec(centre: (f64, f64), vertices: &[(f64, f64)]) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let centre = Vector3::from_radec_deg(centre.0, centre.1);
        let (east, north) = centre.tangent_basis();
        let mut polygon = Self {
            centre,
            east,
            north,
            vertices: Vec::with_capacity(vertices.len()),
        };
        for &(ra, dec) in vertices {
            let projected = polygon.project(&Vector3::from_radec_deg(ra, dec))?;
            polygon.vertices.push(projected);
        }
        Some(polygon)
    }

    /// Pushes every vertex outward so the polygon covers all points within
    /// `pad_rad` of its original outline.
    ///
    /// Each vertex moves along its mitre direction. The push is the tangent-plane
    /// length of a `pad_rad` arc starting at the vertex's own distance from the
    /// centre, which is never shorter than the projected length of that arc
    /// anywhere nearer the centre.
    pub(crate) fn widened(mut self, pad_rad: f64) -> Self {
        let n = self.vertices.len();
        let twice_area: f64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.vertices[(i + n - 1) % n];
                let (x1, y1) = self.vertices[i];
                x0 * y1 - x1 * y0
            })
            .sum();
        let orientation = if twice_area > 0.0 { 1.0 } else { -1.0 };
        let outward = |a: (f64, f64), b: (f64, f64)| {
            let (dx, dy) = (b.0 - a.0, b.1 - a.1);
            let len = libm::hypot(dx, dy);
            (len > 0.0).then(|| (orientation * dy / len, -orientation * dx / len))
        };

        let vertices = (0..n)
            .map(|i| {
                let prev = self.vertices[(i + n - 1) % n];
                let vertex = self.vertices[i];
                let next = self.vertices[(i + 1) % n];
                let (n1, n2) = match (outward(prev, vertex), outward(vertex, next)) {
                    (Some(n1), Some(n2)) => (n1, n2),
                    (Some(normal), None) | (None, Some(normal)) => (normal, normal),
                    (None, None) => return vertex,
                };

                let (mx, my) = (n1.0 + n2.0, n1.1 + n2.1);
                let m_len = libm::hypot(mx, my);
                if m_len < 1e-12 {
                    return vertex;
                }
                let (mx, my) = (mx / m_len, my / m_len);

                let radius = libm::hypot(vertex.0, vertex.1);
                let reach = libm::tan((libm::atan(radius) + pad_rad).min(MAX_REACH_RAD)) - radius;
                let mitre = reach / (mx * n1.0 + my * n1.1).max(MIN_MITRE_COS);
                (vertex.0 + mx * mitre, vertex.1 + my * mitre)
            })
            .collect();
        self.vertices = vertices;
        self
    }

    fn project(&self, v: &Vector3) -> Option<(f64, f64)> {
        let d = self.centre.dot(v);
        if d <= 0.0 {
            return None;
        }
        Some((self.east.dot(v) / d, self.north.dot(v) / d))
    }

    pub(crate) fn contains(&self, v: &Vector3) -> bool {
        match self.project(v) {
            Some(point) => point_in_polygon(point, &self.vertices),
            None => false,
        }
    }
}

/// Even-odd rule ray cast toward +x.
fn point_in_polygon((x, y): (f64, f64), vertices: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_in_square() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(point_in_polygon((0.5, 0.5), &square));
        assert!(!point_in_polygon((1.5, 0.5), &square));
        assert!(!point_in_polygon((0.5, -0.1), &square));
    }

    #[test]
    fn test_point_in_concave() {
        let notch = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (1.0, 1.0), (0.0, 2.0)];
        assert!(point_in_polygon((0.5, 1.2), &notch));
        assert!(!point_in_polygon((1.0, 1.5), &notch));
    }

    #[test]
    fn test_tangent_polygon_around_ra_zero() {
        let vertices = [(359.0, -1.0), (1.0, -1.0), (1.0, 1.0), (359.0, 1.0)];
        let polygon = TangentPolygon::from_radec((0.0, 0.0), &vertices).unwrap();

        assert!(polygon.contains(&Vector3::from_radec_deg(0.0, 0.0)));
        assert!(polygon.contains(&Vector3::from_radec_deg(359.5, 0.5)));
        assert!(!polygon.contains(&Vector3::from_radec_deg(2.0, 0.0)));
        assert!(!polygon.contains(&Vector3::from_radec_deg(180.0, 0.0)));
    }

    #[test]
    fn test_widened_covers_pad() {
        let vertices = [(359.0, -1.0), (1.0, -1.0), (1.0, 1.0), (359.0, 1.0)];
        let polygon = TangentPolygon::from_radec((0.0, 0.0), &vertices).unwrap();
        assert!(!polygon.contains(&Vector3::from_radec_deg(1.2, 0.0)));
        assert!(!polygon.contains(&Vector3::from_radec_deg(1.1, 1.1)));

        let widened = polygon.widened(0.25 * DEG_TO_RAD);
        assert!(widened.contains(&Vector3::from_radec_deg(0.0, 0.0)));
        assert!(widened.contains(&Vector3::from_radec_deg(1.2, 0.0)));
        assert!(widened.contains(&Vector3::from_radec_deg(0.0, -1.2)));
        assert!(widened.contains(&Vector3::from_radec_deg(1.1, 1.1)));
        assert!(!widened.contains(&Vector3::from_radec_deg(1.5, 0.0)));
    }

    #[test]
    fn test_widened_ignores_orientation() {
        let clockwise = [(359.0, 1.0), (1.0, 1.0), (1.0, -1.0), (359.0, -1.0)];
        let polygon = TangentPolygon::from_radec((0.0, 0.0), &clockwise)
            .unwrap()
            .widened(0.25 * DEG_TO_RAD);
        assert!(polygon.contains(&Vector3::from_radec_deg(1.2, 0.0)));
        assert!(!polygon.contains(&Vector3::from_radec_deg(1.5, 0.0)));
    }

    #[test]
    fn test_tangent_polygon_rejects_far_vertices() {
        let vertices = [(0.0, 0.0), (100.0, 0.0), (50.0, 10.0)];
        assert!(TangentPolygon::from_radec((0.0, 0.0), &vertices).is_none());
        assert!(TangentPolygon::from_radec((0.0, 0.0), &vertices[..2]).is_none());
    }
}
