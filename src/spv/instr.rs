//! Instruction views and operand reading.
use super::{Error, Result};

/// A single decoded instruction. `words` covers the whole instruction
/// including the header word, so operands begin at `words[1]`.
#[derive(Debug, Clone, Copy)]
pub struct Instr<'a> {
    pub opcode: u16,
    pub word_count: u16,
    pub words: &'a [u32],
}

impl<'a> Instr<'a> {
    pub fn op(&self) -> u32 {
        u32::from(self.opcode)
    }

    /// Operand reader positioned after the header word.
    pub fn operands(&self) -> Operands<'a> {
        Operands(self.words.get(1..).unwrap_or(&[]))
    }
}

/// Bounds-checked operand cursor over an instruction's tail.
pub struct Operands<'a>(&'a [u32]);

impl<'a> Operands<'a> {
    pub fn read_u32(&mut self) -> Result<u32> {
        if let Some(x) = self.0.first() {
            self.0 = &self.0[1..];
            Ok(*x)
        } else {
            Err(Error::Truncated)
        }
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u32().map(|x| x != 0)
    }

    /// Reads a literal string: UTF-8, null-terminated, padded with zero
    /// bytes to the next word boundary. The cursor advances past the
    /// padding. Literal bytes are packed low-order-first in each word.
    pub fn read_str(&mut self) -> Result<&'a str> {
        let bytes = unsafe {
            std::slice::from_raw_parts(self.0.as_ptr() as *const u8, self.0.len() * 4)
        };
        let nul = bytes.iter().position(|&x| x == 0).ok_or(Error::Truncated)?;
        let string = std::str::from_utf8(&bytes[..nul]).map_err(|_| {
            Error::StructuralError("literal string is not valid utf-8".to_string())
        })?;
        self.0 = &self.0[nul / 4 + 1..];
        Ok(string)
    }

    /// Consumes every remaining operand word.
    pub fn read_list(&mut self) -> Result<&'a [u32]> {
        let rv = self.0;
        self.0 = &[];
        Ok(rv)
    }
}

/// Side-table reference carried by an id slot. Makes the meaning of the
/// index explicit instead of overloading it by opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideTable {
    None,
    Type(u32),
    Variable(u32),
}

impl SideTable {
    pub fn type_index(self) -> Option<usize> {
        match self {
            SideTable::Type(index) => Some(index as usize),
            _ => None,
        }
    }

    pub fn variable_index(self) -> Option<usize> {
        match self {
            SideTable::Variable(index) => Some(index as usize),
            _ => None,
        }
    }
}

/// An id slot in the module table: the defining instruction plus
/// denormalized name, annotation, and side-table state.
#[derive(Debug, Clone)]
pub struct IdInstr<'a> {
    pub instr: Instr<'a>,
    pub id: u32,
    pub name: Option<&'a str>,
    /// Indices into `Module::decorations`, in declaration order.
    pub decoration_indices: Vec<u32>,
    pub extra: SideTable,
}

impl<'a> IdInstr<'a> {
    pub fn vacant(id: u32) -> IdInstr<'a> {
        IdInstr {
            instr: Instr {
                opcode: 0,
                word_count: 0,
                words: &[],
            },
            id,
            name: None,
            decoration_indices: Vec::new(),
            extra: SideTable::None,
        }
    }

    /// An undefined id keeps opcode 0.
    pub fn is_defined(&self) -> bool {
        self.instr.opcode != 0
    }
}
