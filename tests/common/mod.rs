//! Word-level SPIR-V assembler for tests.
#![allow(dead_code)]

use spvscan::spv::consts::*;

/// Assembles a module word by word: a five-word header followed by
/// instructions with `(word_count << 16) | opcode` head words.
pub struct ModuleBuilder {
    words: Vec<u32>,
}

impl ModuleBuilder {
    pub fn new(bound: u32) -> ModuleBuilder {
        ModuleBuilder {
            words: vec![SPIRV_MAGIC, 0x0001_0200, 0, bound, 0],
        }
    }

    pub fn instr(&mut self, opcode: u32, operands: &[u32]) -> &mut Self {
        self.words.push(((operands.len() as u32 + 1) << 16) | opcode);
        self.words.extend_from_slice(operands);
        self
    }

    /// Instruction with an embedded literal string between fixed
    /// leading and trailing operands.
    pub fn instr_str(&mut self, opcode: u32, pre: &[u32], text: &str, post: &[u32]) -> &mut Self {
        let mut operands = pre.to_vec();
        operands.extend(encode_string(text));
        operands.extend_from_slice(post);
        self.instr(opcode, &operands)
    }

    pub fn memory_model(&mut self) -> &mut Self {
        self.instr(OP_MEMORY_MODEL, &[0, 1])
    }

    pub fn entry_point(&mut self, model: u32, id: u32, name: &str, interface: &[u32]) -> &mut Self {
        self.instr_str(OP_ENTRY_POINT, &[model, id], name, interface)
    }

    pub fn decorate(&mut self, target: u32, decoration: u32, operands: &[u32]) -> &mut Self {
        let mut words = vec![target, decoration];
        words.extend_from_slice(operands);
        self.instr(OP_DECORATE, &words)
    }

    pub fn member_decorate(
        &mut self,
        target: u32,
        member: u32,
        decoration: u32,
        operands: &[u32],
    ) -> &mut Self {
        let mut words = vec![target, member, decoration];
        words.extend_from_slice(operands);
        self.instr(OP_MEMBER_DECORATE, &words)
    }

    pub fn words(&self) -> Vec<u32> {
        self.words.clone()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }
}

/// Null-terminated UTF-8, zero-padded to the next word boundary.
pub fn encode_string(text: &str) -> Vec<u32> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// The prologue every function-bearing fixture shares: `%2` void and
/// `%3` the no-argument function type.
pub fn declare_void_function_type(builder: &mut ModuleBuilder) {
    builder.instr(OP_TYPE_VOID, &[2]);
    builder.instr(OP_TYPE_FUNCTION, &[3, 2]);
}
