//! Section-ordered module decoding.
//!
//! SPIR-V carries no section delimiters. The logical layout (_2.4 Logical
//! Layout of a Module_ in the specification) fixes the order of the eleven
//! sections, so the first opcode that does not belong to the current
//! section starts the next one. Member names and member decorations can
//! precede the struct types they annotate and are fixed up after all
//! types are recorded.
use std::ops::Range;

use log::{debug, warn};

use super::consts::*;
use super::instr::{IdInstr, Instr, SideTable};
use super::module::{
    EntryPoint, ExecutionMode, Function, Module, ParseConfig, StructMember, Type, Variable,
    NO_FUNCTION, UNCALCULATED,
};
use super::parse::{index_instructions, SpirvBinary, WordReader};
use super::reflect::scan_function_bodies;
use super::size::compute_type_sizes;
use super::{Error, Result};

pub(super) fn decode_module<'a>(
    binary: &'a SpirvBinary,
    config: &ParseConfig,
) -> Result<Module<'a>> {
    let mut header = WordReader::new(binary.words());
    let magic = header.read_word()?;
    if magic != SPIRV_MAGIC {
        return Err(Error::BadMagic(magic));
    }
    let version = header.read_word()?;
    let generator = header.read_word()?;
    let bound = header.read_word()?;
    let _reserved = header.read_word()?;
    debug!(
        "version {}.{}, generator {:08x}, bound {}",
        (version >> 16) & 0xff,
        (version >> 8) & 0xff,
        generator,
        bound
    );

    let instrs = index_instructions(binary)?;

    let mut module = Module {
        version,
        generator,
        bound,
        addressing_model: 0,
        memory_model: 0,
        id_instrs: (0..bound).map(IdInstr::vacant).collect(),
        entry_points: Vec::new(),
        types: Vec::new(),
        variables: Vec::new(),
        decorations: Vec::new(),
        functions: Vec::new(),
    };

    let bodies;
    {
        let mut decoder = Decoder {
            module: &mut module,
            instrs: &instrs,
            pos: 0,
            strict: config.strict,
            member_names: Vec::new(),
            member_decorations: Vec::new(),
            bodies: Vec::new(),
        };
        decoder.run()?;
        bodies = decoder.bodies;
    }

    compute_type_sizes(&mut module)?;
    scan_function_bodies(&mut module, &instrs, &bodies);

    Ok(module)
}

struct Decoder<'m, 'a> {
    module: &'m mut Module<'a>,
    instrs: &'m [Instr<'a>],
    pos: usize,
    strict: bool,
    /// `OpMemberName` instructions deferred until types exist.
    member_names: Vec<Instr<'a>>,
    /// Indices into `Module::decorations` of deferred `OpMemberDecorate`s.
    member_decorations: Vec<u32>,
    /// Body instruction ranges, parallel to `Module::functions`.
    bodies: Vec<Range<usize>>,
}

impl<'m, 'a> Decoder<'m, 'a> {
    fn run(&mut self) -> Result<()> {
        self.capabilities()?;
        self.extensions()?;
        self.ext_inst_imports()?;
        self.memory_model()?;
        self.entry_points()?;
        self.execution_modes()?;
        self.debug_info()?;
        self.annotations()?;
        self.defs()?;
        self.fixup_member_names()?;
        self.fixup_member_decorations()?;
        self.functions()?;
        self.check_entry_points()
    }

    fn peek(&self) -> Option<Instr<'a>> {
        self.instrs.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn check_id(&self, id: u32) -> Result<()> {
        if id >= self.module.bound {
            return Err(Error::StructuralError(format!(
                "[{}] id %{} exceeds the declared bound {}",
                self.pos, id, self.module.bound
            )));
        }
        Ok(())
    }

    fn require_words(&self, instr: &Instr<'a>, min: u16, what: &str) -> Result<()> {
        if instr.word_count < min {
            return Err(Error::StructuralError(format!(
                "[{}] {} expects at least {} words, got {}",
                self.pos, what, min, instr.word_count
            )));
        }
        Ok(())
    }

    /// Copies the defining instruction into the id slot. Name and
    /// decoration state already attached to the slot is preserved.
    fn record_id_instr(&mut self, id: u32, instr: Instr<'a>) {
        self.module.id_instrs[id as usize].instr = instr;
    }

    // Section 1.
    fn capabilities(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            if instr.op() != OP_CAPABILITY {
                break;
            }
            self.require_words(&instr, 2, "OpCapability")?;
            debug!("[{}] OpCapability {}", self.pos, instr.words[1]);
            self.bump();
        }
        Ok(())
    }

    // Section 2.
    fn extensions(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            if instr.op() != OP_EXTENSION {
                break;
            }
            self.require_words(&instr, 2, "OpExtension")?;
            if let Ok(name) = instr.operands().read_str() {
                debug!("[{}] OpExtension {}", self.pos, name);
            }
            self.bump();
        }
        Ok(())
    }

    // Section 3.
    fn ext_inst_imports(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            if instr.op() != OP_EXT_INST_IMPORT {
                break;
            }
            self.require_words(&instr, 3, "OpExtInstImport")?;
            let id = instr.words[1];
            self.check_id(id)?;
            self.record_id_instr(id, instr);
            self.bump();
        }
        Ok(())
    }

    // Section 4. The only mandatory instruction in the whole module.
    fn memory_model(&mut self) -> Result<()> {
        let instr = match self.peek() {
            Some(instr) if instr.op() == OP_MEMORY_MODEL => instr,
            _ => {
                return Err(Error::StructuralError(format!(
                    "[{}] required OpMemoryModel instruction not found",
                    self.pos
                )))
            }
        };
        if instr.word_count != 3 {
            return Err(Error::StructuralError(format!(
                "[{}] OpMemoryModel expects 3 words, got {}",
                self.pos, instr.word_count
            )));
        }
        self.module.addressing_model = instr.words[1];
        self.module.memory_model = instr.words[2];
        self.bump();
        Ok(())
    }

    // Section 5.
    fn entry_points(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            if instr.op() != OP_ENTRY_POINT {
                break;
            }
            self.require_words(&instr, 4, "OpEntryPoint")?;
            let execution_model = instr.words[1];
            let id = instr.words[2];
            self.check_id(id)?;
            let mut operands = instr.operands();
            operands.read_u32()?;
            operands.read_u32()?;
            let name = operands.read_str().map_err(|_| {
                Error::StructuralError(format!("[{}] OpEntryPoint name is malformed", self.pos))
            })?;
            let interface = operands.read_list()?;
            self.module.entry_points.push(EntryPoint {
                id,
                function_index: NO_FUNCTION,
                execution_model,
                name,
                interface,
                execution_modes: Vec::new(),
            });
            self.bump();
        }
        Ok(())
    }

    // Section 6.
    fn execution_modes(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            let op = instr.op();
            if op != OP_EXECUTION_MODE && op != OP_EXECUTION_MODE_ID {
                break;
            }
            self.require_words(&instr, 3, "OpExecutionMode")?;
            let target = instr.words[1];
            let mode = instr.words[2];
            let operands = &instr.words[3..];
            let pos = self.pos;
            let ep = self
                .module
                .entry_points
                .iter_mut()
                .find(|ep| ep.id == target)
                .ok_or_else(|| {
                    Error::StructuralError(format!(
                        "[{}] OpExecutionMode targets unknown entry point %{}",
                        pos, target
                    ))
                })?;
            ep.execution_modes.push(ExecutionMode { mode, operands });
            self.bump();
        }
        Ok(())
    }

    // Section 7: strings and sources, then names, then OpModuleProcessed.
    fn debug_info(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            match instr.op() {
                OP_STRING => {
                    self.require_words(&instr, 3, "OpString")?;
                    let id = instr.words[1];
                    self.check_id(id)?;
                    self.record_id_instr(id, instr);
                }
                OP_SOURCE | OP_SOURCE_EXTENSION | OP_SOURCE_CONTINUED => {
                    debug!("[{}] source record, opcode {}", self.pos, instr.op());
                }
                _ => break,
            }
            self.bump();
        }
        while let Some(instr) = self.peek() {
            match instr.op() {
                OP_NAME => {
                    self.require_words(&instr, 3, "OpName")?;
                    let id = instr.words[1];
                    self.check_id(id)?;
                    let mut operands = instr.operands();
                    operands.read_u32()?;
                    let name = operands.read_str()?;
                    self.module.id_instrs[id as usize].name = Some(name);
                }
                OP_MEMBER_NAME => {
                    self.require_words(&instr, 4, "OpMemberName")?;
                    self.check_id(instr.words[1])?;
                    self.member_names.push(instr);
                }
                _ => break,
            }
            self.bump();
        }
        while let Some(instr) = self.peek() {
            if instr.op() != OP_MODULE_PROCESSED {
                break;
            }
            if let Ok(process) = instr.operands().read_str() {
                debug!("[{}] OpModuleProcessed {}", self.pos, process);
            }
            self.bump();
        }
        Ok(())
    }

    // Section 8.
    fn annotations(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            match instr.op() {
                OP_DECORATE | OP_DECORATE_ID => {
                    self.require_words(&instr, 3, "OpDecorate")?;
                    self.push_decoration(instr)?;
                }
                OP_MEMBER_DECORATE => {
                    self.require_words(&instr, 4, "OpMemberDecorate")?;
                    let index = self.push_decoration(instr)?;
                    self.member_decorations.push(index);
                }
                OP_DECORATION_GROUP | OP_GROUP_DECORATE | OP_GROUP_MEMBER_DECORATE => {
                    if self.strict {
                        return Err(Error::UnsupportedFeature("decoration groups"));
                    }
                    warn!(
                        "[{}] skipping deprecated decoration group instruction",
                        self.pos
                    );
                }
                _ => break,
            }
            self.bump();
        }
        Ok(())
    }

    fn push_decoration(&mut self, instr: Instr<'a>) -> Result<u32> {
        let target = instr.words[1];
        self.check_id(target)?;
        let index = self.module.decorations.len() as u32;
        self.module.decorations.push(instr);
        self.module.id_instrs[target as usize]
            .decoration_indices
            .push(index);
        Ok(index)
    }

    // Section 9: types, constants, and module-scope variables.
    fn defs(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            let op = instr.op();
            if is_type_defining(op) {
                self.require_words(&instr, 2, "type declaration")?;
                let id = instr.words[1];
                self.check_id(id)?;
                self.record_id_instr(id, instr);
                let members = if op == OP_TYPE_STRUCT {
                    instr.words[2..]
                        .iter()
                        .map(|&type_id| StructMember {
                            type_id,
                            name: None,
                            offset: 0,
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                let index = self.module.types.len() as u32;
                self.module.types.push(Type {
                    id,
                    size: UNCALCULATED,
                    members,
                });
                self.module.id_instrs[id as usize].extra = SideTable::Type(index);
            } else if op == OP_VARIABLE || is_constant_defining(op) {
                let min = if op == OP_VARIABLE { 4 } else { 3 };
                self.require_words(&instr, min, "constant or variable")?;
                let id = instr.words[2];
                self.check_id(id)?;
                self.record_id_instr(id, instr);
                let index = self.module.variables.len() as u32;
                self.module.variables.push(Variable { id });
                self.module.id_instrs[id as usize].extra = SideTable::Variable(index);
            } else if op == OP_TYPE_FORWARD_POINTER || op == OP_LINE || op == OP_NO_LINE {
                // Forward pointers and line markers carry no reflection
                // state.
            } else {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    fn member_type_index(&self, id: u32, what: &str) -> Result<usize> {
        self.module.id_instrs[id as usize]
            .extra
            .type_index()
            .ok_or_else(|| {
                Error::StructuralError(format!("{} targets %{} which is not a type", what, id))
            })
    }

    fn fixup_member_names(&mut self) -> Result<()> {
        let member_names = std::mem::take(&mut self.member_names);
        for instr in member_names {
            let id = instr.words[1];
            let member = instr.words[2] as usize;
            let mut operands = instr.operands();
            operands.read_u32()?;
            operands.read_u32()?;
            let name = operands.read_str()?;
            let type_index = self.member_type_index(id, "OpMemberName")?;
            let ty = &mut self.module.types[type_index];
            if ty.members.len() <= member {
                ty.members.resize_with(member + 1, StructMember::default);
            }
            ty.members[member].name = Some(name);
        }
        Ok(())
    }

    fn fixup_member_decorations(&mut self) -> Result<()> {
        let member_decorations = std::mem::take(&mut self.member_decorations);
        for index in member_decorations {
            let instr = self.module.decorations[index as usize];
            let id = instr.words[1];
            let member = instr.words[2] as usize;
            let decoration = instr.words[3];
            let type_index = self.member_type_index(id, "OpMemberDecorate")?;
            let ty = &mut self.module.types[type_index];
            if ty.members.len() <= member {
                ty.members.resize_with(member + 1, StructMember::default);
            }
            if decoration == DECO_OFFSET {
                let offset = *instr.words.get(4).ok_or_else(|| {
                    Error::StructuralError(format!(
                        "Offset decoration on %{} member {} is missing its operand",
                        id, member
                    ))
                })?;
                ty.members[member].offset = u64::from(offset);
            }
        }
        Ok(())
    }

    // Sections 10 and 11: function blocks.
    fn functions(&mut self) -> Result<()> {
        while let Some(instr) = self.peek() {
            if instr.op() != OP_FUNCTION {
                return Err(Error::StructuralError(format!(
                    "[{}] expected OpFunction, found opcode {}",
                    self.pos,
                    instr.op()
                )));
            }
            self.require_words(&instr, 5, "OpFunction")?;
            self.check_id(instr.words[1])?;
            let id = instr.words[2];
            self.check_id(id)?;
            self.check_id(instr.words[4])?;
            self.record_id_instr(id, instr);
            let function_index = self.module.functions.len() as u32;
            for ep in &mut self.module.entry_points {
                if ep.id == id {
                    ep.function_index = function_index;
                }
            }
            self.module.functions.push(Function {
                id,
                called_function_indices: Vec::new(),
                referenced_variables: Default::default(),
            });
            self.bump();
            let body = self.function_body()?;
            self.bodies.push(body);
        }
        Ok(())
    }

    /// Walks one function body. Only a handful of opcodes are validated;
    /// everything else is skipped so newer instruction sets keep parsing.
    fn function_body(&mut self) -> Result<Range<usize>> {
        let start = self.pos;
        while let Some(instr) = self.peek() {
            match instr.op() {
                OP_FUNCTION_PARAMETER => {
                    self.require_words(&instr, 3, "OpFunctionParameter")?;
                    self.check_id(instr.words[1])?;
                    self.check_id(instr.words[2])?;
                }
                OP_ACCESS_CHAIN => {
                    self.require_words(&instr, 4, "OpAccessChain")?;
                    self.check_id(instr.words[1])?;
                    self.check_id(instr.words[2])?;
                    self.check_id(instr.words[3])?;
                }
                OP_LOAD => {
                    self.require_words(&instr, 4, "OpLoad")?;
                    self.check_id(instr.words[1])?;
                    self.check_id(instr.words[2])?;
                    self.check_id(instr.words[3])?;
                }
                OP_LABEL | OP_RETURN => {}
                OP_FUNCTION_END => {
                    let end = self.pos;
                    self.bump();
                    return Ok(start..end);
                }
                _ => {}
            }
            self.bump();
        }
        // A body cut short by the end of the stream is tolerated; the
        // instruction index already guaranteed whole instructions.
        Ok(start..self.pos)
    }

    fn check_entry_points(&self) -> Result<()> {
        for ep in &self.module.entry_points {
            if ep.function_index == NO_FUNCTION {
                return Err(Error::StructuralError(format!(
                    "entry point {} has no function",
                    ep.name
                )));
            }
        }
        Ok(())
    }
}
