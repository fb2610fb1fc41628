//! Shader compilation and program linking.
//!
//! `ShaderCompiler` turns tagged sources into compiled stage objects and
//! `ProgramLinker` links a vertex/fragment pair, resolving the attribute and
//! uniform names a [`ProgramLayout`] asks for. Both are fatal on failure and
//! surface the driver's diagnostic text.

mod compiler;
mod linker;

pub use compiler::{CompiledShader, ShaderCompiler, ShaderSource};
pub use linker::{LinkedProgram, LocationTable, ProgramLayout, ProgramLinker};
