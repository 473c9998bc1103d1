use std::collections::BTreeMap;

use super::shader::{
    compile_stage, scalar_kind, type_name, CompiledStage, ShaderError, ShaderSource, ShaderStage,
};

/// Compiled and linked vertex + fragment pair, ready to draw into the surface.
///
/// Backed by a `wgpu::RenderPipeline`: triangle list, no culling, no depth,
/// no blending, one color target in the surface format.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
}

/// Entry points of a pair that compiled and linked on the CPU.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LinkedStages {
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl ShaderProgram {
    /// Compiles both stages and links them against each other and against
    /// the vertex buffer layouts. Needs no device.
    pub fn check(
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        buffers: &[wgpu::VertexBufferLayout<'_>],
    ) -> Result<LinkedStages, ShaderError> {
        let vs = compile_stage(vertex, ShaderStage::Vertex)?;
        let fs = compile_stage(fragment, ShaderStage::Fragment)?;
        link(&vs, &fs, buffers)?;

        Ok(LinkedStages {
            vertex_entry: vs.entry_point,
            fragment_entry: fs.entry_point,
        })
    }

    /// Builds the program on `device` for a `target_format` color target.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        buffers: &[wgpu::VertexBufferLayout<'_>],
    ) -> Result<Self, ShaderError> {
        let LinkedStages {
            vertex_entry,
            fragment_entry,
        } = Self::check(vertex, fragment, buffers)?;

        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(vertex.label.as_ref()),
            source: wgpu::ShaderSource::Wgsl(vertex.wgsl.clone()),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(fragment.label.as_ref()),
            source: wgpu::ShaderSource::Wgsl(fragment.wgsl.clone()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trigon program layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trigon program"),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!(
            "shader program linked: `{}`::{vertex_entry} + `{}`::{fragment_entry}",
            vertex.label,
            fragment.label
        );

        Ok(Self { pipeline })
    }

    /// Makes this program current for subsequent draws in `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
    }
}

/// Every vertex input must be fed by a buffer attribute of the same scalar
/// kind, and every fragment input must be written by the vertex stage with
/// the same type.
fn link(
    vs: &CompiledStage,
    fs: &CompiledStage,
    buffers: &[wgpu::VertexBufferLayout<'_>],
) -> Result<(), ShaderError> {
    let attributes: BTreeMap<u32, wgpu::VertexFormat> = buffers
        .iter()
        .flat_map(|b| b.attributes.iter().map(|a| (a.shader_location, a.format)))
        .collect();

    for (&location, ty) in &vs.inputs {
        let Some(&format) = attributes.get(&location) else {
            return Err(ShaderError::UnlinkedInput {
                stage: ShaderStage::Vertex,
                location,
                provider: "vertex buffer layout",
            });
        };

        // Component counts may differ; wgpu pads or drops components.
        if let Some(kind) = format_kind(format) {
            if scalar_kind(ty) != Some(kind) {
                return Err(ShaderError::TypeMismatch {
                    stage: ShaderStage::Vertex,
                    location,
                    provider: "vertex buffer layout",
                    expected: format!("{format:?}"),
                    found: type_name(ty),
                });
            }
        }
    }

    for (&location, ty) in &fs.inputs {
        let Some(written) = vs.outputs.get(&location) else {
            return Err(ShaderError::UnlinkedInput {
                stage: ShaderStage::Fragment,
                location,
                provider: "vertex stage",
            });
        };

        if written != ty {
            return Err(ShaderError::TypeMismatch {
                stage: ShaderStage::Fragment,
                location,
                provider: "vertex stage",
                expected: type_name(written),
                found: type_name(ty),
            });
        }
    }

    Ok(())
}

/// Scalar kind a vertex attribute format delivers to the shader.
fn format_kind(format: wgpu::VertexFormat) -> Option<naga::ScalarKind> {
    use wgpu::VertexFormat as F;

    match format {
        F::Float32 | F::Float32x2 | F::Float32x3 | F::Float32x4 => Some(naga::ScalarKind::Float),
        F::Float16x2 | F::Float16x4 => Some(naga::ScalarKind::Float),
        F::Unorm8x2 | F::Unorm8x4 | F::Snorm8x2 | F::Snorm8x4 => Some(naga::ScalarKind::Float),
        F::Unorm16x2 | F::Unorm16x4 | F::Snorm16x2 | F::Snorm16x4 => Some(naga::ScalarKind::Float),
        F::Uint32 | F::Uint32x2 | F::Uint32x3 | F::Uint32x4 => Some(naga::ScalarKind::Uint),
        F::Uint8x2 | F::Uint8x4 | F::Uint16x2 | F::Uint16x4 => Some(naga::ScalarKind::Uint),
        F::Sint32 | F::Sint32x2 | F::Sint32x3 | F::Sint32x4 => Some(naga::ScalarKind::Sint),
        F::Sint8x2 | F::Sint8x4 | F::Sint16x2 | F::Sint16x4 => Some(naga::ScalarKind::Sint),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Vertex;

    const VS_COLOR: &str = r#"
        struct VsOut {
            @builtin(position) pos: vec4<f32>,
            @location(0) color: vec3<f32>,
        };
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
            var out: VsOut;
            out.pos = vec4<f32>(position, 1.0);
            out.color = position;
            return out;
        }
    "#;

    const FS_COLOR: &str = r#"
        @fragment
        fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(color, 1.0);
        }
    "#;

    const FS_NEEDS_UV: &str = r#"
        @fragment
        fn fs_main(@location(1) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(uv, 0.0, 1.0);
        }
    "#;

    const FS_WHITE: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    "#;

    const VS_UV2: &str = r#"
        struct VsOut {
            @builtin(position) pos: vec4<f32>,
            @location(0) uv: vec2<f32>,
        };
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
            var out: VsOut;
            out.pos = vec4<f32>(position, 1.0);
            out.uv = position.xy;
            return out;
        }
    "#;

    const FS_READS_VEC4: &str = r#"
        @fragment
        fn fs_main(@location(0) c: vec4<f32>) -> @location(0) vec4<f32> {
            return c;
        }
    "#;

    const VS_UINT_POSITION: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<u32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(vec3<f32>(position), 1.0);
        }
    "#;

    const VS_VEC2_POSITION: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 0.0, 1.0);
        }
    "#;

    const VS_NEEDS_NORMAL: &str = r#"
        @vertex
        fn vs_main(
            @location(0) position: vec3<f32>,
            @location(3) normal: vec3<f32>,
        ) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position + normal * 0.0, 1.0);
        }
    "#;

    fn pair(vs: &'static str, fs: &'static str) -> (ShaderSource, ShaderSource) {
        (ShaderSource::new("vs", vs), ShaderSource::new("fs", fs))
    }

    #[test]
    fn matching_interfaces_link() {
        let (vs, fs) = pair(VS_COLOR, FS_COLOR);
        let linked = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap();
        assert_eq!(linked.vertex_entry, "vs_main");
        assert_eq!(linked.fragment_entry, "fs_main");
    }

    #[test]
    fn fragment_input_without_vertex_output_fails() {
        let (vs, fs) = pair(VS_COLOR, FS_NEEDS_UV);
        let err = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap_err();
        assert_eq!(
            err,
            ShaderError::UnlinkedInput {
                stage: ShaderStage::Fragment,
                location: 1,
                provider: "vertex stage",
            }
        );
    }

    #[test]
    fn fragment_input_of_different_type_fails() {
        let (vs, fs) = pair(VS_UV2, FS_READS_VEC4);
        let err = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap_err();
        assert_eq!(
            err,
            ShaderError::TypeMismatch {
                stage: ShaderStage::Fragment,
                location: 0,
                provider: "vertex stage",
                expected: "vec2<f32>".into(),
                found: "vec4<f32>".into(),
            }
        );
    }

    #[test]
    fn vertex_input_of_different_kind_than_attribute_fails() {
        let (vs, fs) = pair(VS_UINT_POSITION, FS_WHITE);
        let err = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::TypeMismatch { stage: ShaderStage::Vertex, location: 0, .. }
        ));
    }

    #[test]
    fn vertex_input_narrower_than_attribute_links() {
        let (vs, fs) = pair(VS_VEC2_POSITION, FS_WHITE);
        assert!(ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).is_ok());
    }

    #[test]
    fn vertex_input_without_buffer_attribute_fails() {
        let (vs, fs) = pair(VS_NEEDS_NORMAL, FS_WHITE);
        let err = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::UnlinkedInput { stage: ShaderStage::Vertex, location: 3, .. }
        ));
    }

    #[test]
    fn vertex_input_without_any_buffer_fails() {
        let (vs, fs) = pair(VS_COLOR, FS_COLOR);
        let err = ShaderProgram::check(&vs, &fs, &[]).unwrap_err();
        assert!(matches!(err, ShaderError::UnlinkedInput { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn sources_swapped_report_missing_entry_point() {
        let (vs, fs) = pair(FS_COLOR, VS_COLOR);
        let err = ShaderProgram::check(&vs, &fs, &[Vertex::layout()]).unwrap_err();
        assert!(matches!(err, ShaderError::MissingEntryPoint { stage: ShaderStage::Vertex, .. }));
    }
}
