//! GPU resources for drawing: vertex data and shader programs.
//!
//! Convention: vertex positions are already in normalized device
//! coordinates; programs are built once at startup and never rebuilt.

mod program;
mod shader;
mod vertex;

pub use program::{LinkedStages, ShaderProgram};
pub use shader::{ShaderError, ShaderSource, ShaderStage};
pub use vertex::{Vertex, VertexBuffer};
