use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// WGSL source text for one stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub label: Cow<'static, str>,
    pub wgsl: Cow<'static, str>,
}

impl ShaderSource {
    pub fn new(label: impl Into<Cow<'static, str>>, wgsl: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            wgsl: wgsl.into(),
        }
    }
}

/// Compile or link failure while building a [`ShaderProgram`](super::ShaderProgram).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ShaderError {
    #[error("{stage} shader `{label}` failed to compile:\n{message}")]
    Parse {
        stage: ShaderStage,
        label: String,
        message: String,
    },

    #[error("{stage} shader `{label}` failed validation: {message}")]
    Validation {
        stage: ShaderStage,
        label: String,
        message: String,
    },

    #[error("{stage} shader `{label}` has no {stage} entry point")]
    MissingEntryPoint { stage: ShaderStage, label: String },

    #[error("{stage} shader `{label}` has {count} {stage} entry points; expected exactly one")]
    AmbiguousEntryPoint {
        stage: ShaderStage,
        label: String,
        count: usize,
    },

    #[error("link failed: {stage} input @location({location}) is not provided by the {provider}")]
    UnlinkedInput {
        stage: ShaderStage,
        location: u32,
        provider: &'static str,
    },

    #[error(
        "link failed: {stage} input @location({location}) is {found} but the {provider} supplies {expected}"
    )]
    TypeMismatch {
        stage: ShaderStage,
        location: u32,
        provider: &'static str,
        expected: String,
        found: String,
    },
}

/// Result of compiling one stage on the CPU: entry point and interface.
#[derive(Debug, Clone)]
pub(crate) struct CompiledStage {
    pub entry_point: String,
    /// User-defined inputs (`@location(n)` arguments) and their types.
    pub inputs: BTreeMap<u32, naga::TypeInner>,
    /// User-defined outputs and their types.
    pub outputs: BTreeMap<u32, naga::TypeInner>,
}

/// Parses and validates `source` as WGSL and locates its single `stage`
/// entry point.
pub(crate) fn compile_stage(
    source: &ShaderSource,
    stage: ShaderStage,
) -> Result<CompiledStage, ShaderError> {
    let label = source.label.to_string();

    let module = naga::front::wgsl::parse_str(&source.wgsl).map_err(|e| ShaderError::Parse {
        stage,
        label: label.clone(),
        message: e.emit_to_string(&source.wgsl),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validation {
        stage,
        label: label.clone(),
        message: e.into_inner().to_string(),
    })?;

    let mut candidates = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga());

    let entry = candidates.next().ok_or_else(|| ShaderError::MissingEntryPoint {
        stage,
        label: label.clone(),
    })?;

    let extra = candidates.count();
    if extra > 0 {
        return Err(ShaderError::AmbiguousEntryPoint {
            stage,
            label,
            count: extra + 1,
        });
    }

    let inputs = entry
        .function
        .arguments
        .iter()
        .flat_map(|arg| locations(&module, arg.ty, arg.binding.as_ref()))
        .collect();

    let outputs = entry
        .function
        .result
        .iter()
        .flat_map(|res| locations(&module, res.ty, res.binding.as_ref()))
        .collect();

    log::debug!("{stage} shader `{label}` compiled, entry point `{}`", entry.name);

    Ok(CompiledStage {
        entry_point: entry.name.clone(),
        inputs,
        outputs,
    })
}

/// `@location` indices and types carried by a binding, or by the members of
/// an unbound struct.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> Vec<(u32, naga::TypeInner)> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            vec![(*location, module.types[ty].inner.clone())]
        }
        Some(_) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match &m.binding {
                    Some(naga::Binding::Location { location, .. }) => {
                        Some((*location, module.types[m.ty].inner.clone()))
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

/// Scalar kind of a scalar or vector interface type.
pub(crate) fn scalar_kind(ty: &naga::TypeInner) -> Option<naga::ScalarKind> {
    match ty {
        naga::TypeInner::Scalar(s) | naga::TypeInner::Vector { scalar: s, .. } => Some(s.kind),
        _ => None,
    }
}

/// WGSL spelling of an interface type, for error messages.
pub(crate) fn type_name(ty: &naga::TypeInner) -> String {
    fn scalar(s: &naga::Scalar) -> String {
        match s.kind {
            naga::ScalarKind::Float => format!("f{}", s.width * 8),
            naga::ScalarKind::Sint => format!("i{}", s.width * 8),
            naga::ScalarKind::Uint => format!("u{}", s.width * 8),
            naga::ScalarKind::Bool => "bool".to_string(),
            other => format!("{other:?}"),
        }
    }

    match ty {
        naga::TypeInner::Scalar(s) => scalar(s),
        naga::TypeInner::Vector { size, scalar: s } => {
            format!("vec{}<{}>", *size as u8, scalar(s))
        }
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(wgsl: &'static str) -> ShaderSource {
        ShaderSource::new("test", wgsl)
    }

    #[test]
    fn struct_outputs_are_collected() {
        let s = src(r#"
            struct Out {
                @builtin(position) pos: vec4<f32>,
                @location(0) color: vec3<f32>,
                @location(2) uv: vec2<f32>,
            };
            @vertex
            fn main(@location(1) p: vec2<f32>) -> Out {
                var o: Out;
                o.pos = vec4<f32>(p, 0.0, 1.0);
                o.color = vec3<f32>(1.0);
                o.uv = p;
                return o;
            }
        "#);

        let stage = compile_stage(&s, ShaderStage::Vertex).unwrap();
        assert_eq!(stage.entry_point, "main");
        assert_eq!(stage.inputs.keys().copied().collect::<Vec<_>>(), [1]);
        assert_eq!(stage.outputs.keys().copied().collect::<Vec<_>>(), [0, 2]);
        assert_eq!(type_name(&stage.outputs[&0]), "vec3<f32>");
        assert_eq!(type_name(&stage.outputs[&2]), "vec2<f32>");
    }

    #[test]
    fn syntax_error_is_a_parse_error() {
        let err = compile_stage(&src("@vertex fn main( -> {"), ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::Parse { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn type_error_is_a_validation_or_parse_error() {
        // Returning a scalar where a vec4 is declared.
        let err = compile_stage(
            &src("@fragment fn main() -> @location(0) vec4<f32> { return 1.0; }"),
            ShaderStage::Fragment,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Parse { stage: ShaderStage::Fragment, .. }
                | ShaderError::Validation { stage: ShaderStage::Fragment, .. }
        ));
    }

    #[test]
    fn wrong_stage_is_missing_entry_point() {
        let err = compile_stage(
            &src("@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }"),
            ShaderStage::Vertex,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShaderError::MissingEntryPoint {
                stage: ShaderStage::Vertex,
                label: "test".into()
            }
        );
    }

    #[test]
    fn two_entry_points_of_one_stage_are_ambiguous() {
        let err = compile_stage(
            &src(r#"
                @vertex fn a() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }
                @vertex fn b() -> @builtin(position) vec4<f32> { return vec4<f32>(1.0); }
            "#),
            ShaderStage::Vertex,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShaderError::AmbiguousEntryPoint {
                stage: ShaderStage::Vertex,
                label: "test".into(),
                count: 2,
            }
        );
    }

    #[test]
    fn other_stage_entry_points_do_not_count() {
        let stage = compile_stage(
            &src(r#"
                @vertex fn vs() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }
                @fragment fn fs() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
            "#),
            ShaderStage::Fragment,
        )
        .unwrap();
        assert_eq!(stage.entry_point, "fs");
    }

    #[test]
    fn error_messages_name_stage_and_label() {
        let err = ShaderError::MissingEntryPoint {
            stage: ShaderStage::Fragment,
            label: "tri.frag".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader `tri.frag` has no fragment entry point"
        );
    }
}
