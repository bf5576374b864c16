//! Entity definitions and the decoded module table.
use std::collections::BTreeSet;

use super::decode;
use super::instr::{IdInstr, Instr};
use super::parse::SpirvBinary;
use super::Result;

/// Sentinel for a type size that has not been computed yet.
pub(super) const UNCALCULATED: u64 = u32::MAX as u64;
/// Sentinel for an entry point whose function has not been seen yet.
pub(super) const NO_FUNCTION: u32 = u32::MAX;

/// One `OpExecutionMode`/`OpExecutionModeId` attached to an entry point.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionMode<'a> {
    pub mode: u32,
    pub operands: &'a [u32],
}

/// A pipeline-stage entry declared by `OpEntryPoint`.
#[derive(Debug, Clone)]
pub struct EntryPoint<'a> {
    pub id: u32,
    /// Index into `Module::functions`; resolved while decoding the
    /// function section, guaranteed valid after a successful parse.
    pub function_index: u32,
    pub execution_model: u32,
    pub name: &'a str,
    /// Interface ids listed after the literal name.
    pub interface: &'a [u32],
    pub execution_modes: Vec<ExecutionMode<'a>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructMember<'a> {
    pub type_id: u32,
    pub name: Option<&'a str>,
    /// From `OpMemberDecorate ... Offset`; 0 when undecorated.
    pub offset: u64,
}

/// A declared type and its computed byte size.
#[derive(Debug, Clone)]
pub struct Type<'a> {
    pub id: u32,
    pub size: u64,
    /// Member slots; populated only for struct types.
    pub members: Vec<StructMember<'a>>,
}

/// An `OpVariable` or constant definition. The distinction is made by the
/// underlying instruction's opcode.
#[derive(Debug, Clone, Copy)]
pub struct Variable {
    pub id: u32,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub id: u32,
    /// Functions this one calls directly, as indices into
    /// `Module::functions`. Calls are not resolved transitively.
    pub called_function_indices: Vec<u32>,
    /// Module-scope variables the body references, as indices into
    /// `Module::variables`.
    pub referenced_variables: BTreeSet<u32>,
}

/// Decoder behavior switches.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    /// Reject deprecated decoration groups instead of skipping them.
    pub strict: bool,
}

/// Decoded module state. Borrows every string and word view from the
/// `SpirvBinary` it was parsed from; side tables reference each other by
/// index only.
#[derive(Debug)]
pub struct Module<'a> {
    pub version: u32,
    pub generator: u32,
    pub bound: u32,
    pub addressing_model: u32,
    pub memory_model: u32,
    /// Id-indexed table: slot `i` describes id `i`.
    pub id_instrs: Vec<IdInstr<'a>>,
    pub entry_points: Vec<EntryPoint<'a>>,
    pub types: Vec<Type<'a>>,
    pub variables: Vec<Variable>,
    pub decorations: Vec<Instr<'a>>,
    pub functions: Vec<Function>,
}

impl<'a> Module<'a> {
    pub fn parse(binary: &'a SpirvBinary) -> Result<Module<'a>> {
        Module::parse_with_config(binary, &ParseConfig::default())
    }

    pub fn parse_with_config(
        binary: &'a SpirvBinary,
        config: &ParseConfig,
    ) -> Result<Module<'a>> {
        decode::decode_module(binary, config)
    }

    pub fn id_instr(&self, id: u32) -> Option<&IdInstr<'a>> {
        self.id_instrs.get(id as usize)
    }

    pub fn entry_point_by_id(&self, id: u32) -> Option<&EntryPoint<'a>> {
        self.entry_points.iter().find(|ep| ep.id == id)
    }

    pub fn type_by_id(&self, id: u32) -> Option<&Type<'a>> {
        let index = self.id_instr(id)?.extra.type_index()?;
        self.types.get(index)
    }

    pub fn variable_by_id(&self, id: u32) -> Option<&Variable> {
        let index = self.id_instr(id)?.extra.variable_index()?;
        self.variables.get(index)
    }
}
