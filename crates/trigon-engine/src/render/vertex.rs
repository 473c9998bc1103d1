use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// A vertex position in normalized device coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    /// Attribute layout: `@location(0) position: vec3<f32>`, tightly packed.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Buffer usage for uploaded vertices. No copy or map usage, so the
/// contents cannot change after upload.
pub(crate) const VERTEX_BUFFER_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX;

/// Immutable GPU vertex buffer.
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl VertexBuffer {
    /// Allocates a buffer sized for `vertices` and uploads them.
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Result<Self> {
        anyhow::ensure!(!vertices.is_empty(), "vertex buffer `{label}` has no vertices");
        let vertex_count = u32::try_from(vertices.len())?;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: VERTEX_BUFFER_USAGE,
        });

        log::info!(
            "vertex buffer `{label}` uploaded: {vertex_count} vertices, {} bytes",
            buffer.size()
        );

        Ok(Self {
            buffer,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Binds the whole buffer to vertex slot `slot` of `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        pass.set_vertex_buffer(slot, self.buffer.slice(..));
    }

    /// Draws every vertex once as a single instance.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.draw(0..self.vertex_count, 0..1);
    }
}
