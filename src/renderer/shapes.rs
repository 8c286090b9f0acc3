//! Shape generation for 2D primitives
//!
//! All shapes are emitted as triangle lists in pixel coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::scene::{Circle, DrawRequest, LineSegment};
use super::vertex::{Vertex, rgb8_to_rgba};

/// Segments used for bob circles
pub const CIRCLE_SEGMENTS: u32 = 32;

/// Upper bound on vertices for one pendulum frame (two rods, two bobs)
pub const MAX_VERTICES: usize = 2 * 6 + 2 * CIRCLE_SEGMENTS as usize * 3;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a stroked segment of the given width
///
/// Degenerate (zero-length) segments produce no geometry.
pub fn thick_line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a = from + perp;
    let b = from - perp;
    let c = to + perp;
    let d = to - perp;

    // Two triangles
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

fn line_vertices(line: &LineSegment) -> Vec<Vertex> {
    thick_line(
        line.from.as_vec2(),
        line.to.as_vec2(),
        line.width,
        rgb8_to_rgba(line.color),
    )
}

fn circle_vertices(c: &Circle) -> Vec<Vertex> {
    circle(
        c.center.as_vec2(),
        c.radius,
        rgb8_to_rgba(c.color),
        CIRCLE_SEGMENTS,
    )
}

/// Tessellate a whole frame: rods first, bobs on top
pub fn tessellate(request: &DrawRequest) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(MAX_VERTICES);
    for line in &request.lines {
        vertices.extend(line_vertices(line));
    }
    for c in &request.circles {
        vertices.extend(circle_vertices(c));
    }
    vertices
}
