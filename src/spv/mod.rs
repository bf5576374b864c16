//! SPIR-V Module Reflection
//!
//! Decode a SPIR-V binary into an id-indexed module table and reflect the
//! descriptor bindings and push-constant ranges its entry points require.
pub mod consts;
mod decode;
mod error;
pub mod instr;
pub mod module;
pub mod parse;
pub mod print;
pub mod reflect;
mod size;

pub use error::Error;
pub use instr::{IdInstr, Instr, Operands, SideTable};
pub use module::{
    EntryPoint, ExecutionMode, Function, Module, ParseConfig, StructMember, Type, Variable,
};
pub use parse::{SpirvBinary, WordReader};
pub use reflect::{DescriptorSetInfo, PipelineInfo};

pub type Result<T> = std::result::Result<T, Error>;
