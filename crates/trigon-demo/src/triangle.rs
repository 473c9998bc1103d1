//! The fixed geometry and shader pair drawn by the demo.

use trigon_engine::render::{ShaderSource, Vertex};

/// One triangle in normalized device coordinates: top, bottom-left, bottom-right.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.0, 0.5, 0.0),
    Vertex::new(-0.5, -0.5, 0.0),
    Vertex::new(0.5, -0.5, 0.0),
];

pub fn vertex_shader() -> ShaderSource {
    ShaderSource::new("triangle.vert", include_str!("../shaders/triangle.vert.wgsl"))
}

pub fn fragment_shader() -> ShaderSource {
    ShaderSource::new("triangle.frag", include_str!("../shaders/triangle.frag.wgsl"))
}
