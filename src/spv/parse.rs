//! SPIR-V binary loading and word-stream access.
use std::path::Path;

use super::consts::HEADER_LEN;
use super::instr::Instr;
use super::{Error, Result};

/// An owned SPIR-V word buffer. Every view inside a decoded module
/// borrows from this, so it must outlive the `Module` parsed from it.
pub struct SpirvBinary(Vec<u32>);

impl From<Vec<u32>> for SpirvBinary {
    fn from(x: Vec<u32>) -> Self {
        SpirvBinary(x)
    }
}

impl FromIterator<u32> for SpirvBinary {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        SpirvBinary(iter.into_iter().collect())
    }
}

impl SpirvBinary {
    /// Converts a raw byte buffer. The stream is little-endian by
    /// specification; a leading `0x07` byte means the producer wrote
    /// big-endian words and every word is swapped on conversion. The
    /// length must be a whole number of words covering at least the
    /// header.
    pub fn from_bytes(bytes: &[u8]) -> Result<SpirvBinary> {
        if bytes.len() % 4 != 0 || bytes.len() < HEADER_LEN * 4 {
            return Err(Error::Truncated);
        }
        let from_word = if bytes[0] == 0x07 {
            u32::from_be_bytes
        } else {
            u32::from_le_bytes
        };
        let words = bytes
            .chunks_exact(4)
            .map(|x| from_word(x.try_into().unwrap()))
            .collect();
        Ok(SpirvBinary(words))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SpirvBinary> {
        SpirvBinary::from_bytes(&std::fs::read(path)?)
    }

    pub fn words(&self) -> &[u32] {
        &self.0
    }
}

/// Bounds-checked forward cursor over a word stream.
pub struct WordReader<'a> {
    words: &'a [u32],
    pos: usize,
}

impl<'a> WordReader<'a> {
    pub fn new(words: &'a [u32]) -> WordReader<'a> {
        WordReader { words, pos: 0 }
    }

    pub fn read_word(&mut self) -> Result<u32> {
        let word = self.peek_word()?;
        self.pos += 1;
        Ok(word)
    }

    pub fn peek_word(&self) -> Result<u32> {
        self.words.get(self.pos).copied().ok_or(Error::Truncated)
    }

    pub fn skip(&mut self, nword: u32) -> Result<()> {
        let next = self
            .pos
            .checked_add(nword as usize)
            .filter(|&x| x <= self.words.len())
            .ok_or(Error::Truncated)?;
        self.pos = next;
        Ok(())
    }

    pub fn remaining_words(&self) -> usize {
        self.words.len() - self.pos
    }

    pub fn position_in_words(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.words.len()
    }

    /// Zero-copy view of the next `nword` words; does not advance.
    pub fn slice_words(&self, nword: usize) -> Result<&'a [u32]> {
        self.pos
            .checked_add(nword)
            .and_then(|end| self.words.get(self.pos..end))
            .ok_or(Error::Truncated)
    }
}

/// Scans the instruction stream after the module header into an ordered
/// index of zero-copy instruction views. No operand is interpreted here;
/// each instruction's first word encodes its word count in the high half
/// and its opcode in the low half.
pub fn index_instructions(binary: &SpirvBinary) -> Result<Vec<Instr<'_>>> {
    let mut reader = WordReader::new(&binary.words()[HEADER_LEN..]);
    let mut instrs = Vec::new();
    while !reader.is_at_end() {
        let head = reader.peek_word()?;
        let word_count = (head >> 16) as u16;
        let opcode = (head & 0xFFFF) as u16;
        if word_count == 0 {
            return Err(Error::Truncated);
        }
        let words = reader.slice_words(word_count as usize)?;
        reader.skip(u32::from(word_count))?;
        instrs.push(Instr {
            opcode,
            word_count,
            words,
        });
    }
    Ok(instrs)
}
