//! Symbol storage and lookup.
//!
//! A symbol is either a base unit (one byte) or the merge of two earlier symbols.
//! Ids are assigned densely: base units first, in alphabet order, then one id per
//! merge in creation order.

use crate::core::merges::Pair;
use crate::error::{BpeError, Result};

/// Number of distinct byte values.
pub const BYTE_ALPHABET_SIZE: usize = 256;

/// Append-only table of base and merged symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    /// Base units in id order.
    base: Vec<u8>,
    /// Byte value -> base id.
    byte_mapping: [Option<u32>; BYTE_ALPHABET_SIZE],
    /// Children of merged symbols; entry `i` belongs to id `base.len() + i`.
    merged: Vec<Pair>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            base: Vec::new(),
            byte_mapping: [None; BYTE_ALPHABET_SIZE],
            merged: Vec::new(),
        }
    }

    /// Create a table seeded with all 256 byte values, `id == byte`.
    pub fn with_byte_alphabet() -> Self {
        Self::with_base_units(0..=u8::MAX)
    }

    /// Create a table seeded with the given base alphabet.
    pub fn with_base_units(alphabet: impl IntoIterator<Item = u8>) -> Self {
        let mut table = Self::new();
        for byte in alphabet {
            table.push_base(byte);
        }
        table
    }

    fn push_base(&mut self, byte: u8) -> bool {
        if self.byte_mapping[byte as usize].is_some() {
            return false;
        }
        self.byte_mapping[byte as usize] = Some(self.base.len() as u32);
        self.base.push(byte);
        true
    }

    /// Seed base symbols from `alphabet`.
    ///
    /// Bytes already present are skipped. Returns the number of new base symbols.
    /// Base units can only be added while the table holds no merged symbols.
    pub fn intern_base_units(&mut self, alphabet: impl IntoIterator<Item = u8>) -> Result<usize> {
        if !self.merged.is_empty() {
            return Err(BpeError::InvalidConfig(
                "base units cannot be added after merged symbols".to_string(),
            ));
        }
        Ok(alphabet
            .into_iter()
            .filter(|&byte| self.push_base(byte))
            .count())
    }

    /// Allocate the next id for the merge of `left` and `right`.
    pub fn create_merged(&mut self, left: u32, right: u32) -> Result<u32> {
        for id in [left, right] {
            if !self.contains(id) {
                return Err(BpeError::UnknownSymbol(id));
            }
        }
        let id = self.len() as u32;
        self.merged.push((left, right));
        Ok(id)
    }

    /// Base id of a byte, if the byte is part of the alphabet.
    #[inline]
    pub fn base_id(&self, byte: u8) -> Option<u32> {
        self.byte_mapping[byte as usize]
    }

    /// The two children of a merged symbol; `None` for base units and unknown ids.
    #[inline]
    pub fn children(&self, id: u32) -> Option<Pair> {
        (id as usize)
            .checked_sub(self.base.len())
            .and_then(|i| self.merged.get(i))
            .copied()
    }

    /// Expand a symbol to its underlying bytes.
    pub fn decode(&self, id: u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decode_into(id, &mut out)?;
        Ok(out)
    }

    /// Append the bytes of `id` to `out`.
    pub fn decode_into(&self, id: u32, out: &mut Vec<u8>) -> Result<()> {
        if !self.contains(id) {
            return Err(BpeError::UnknownSymbol(id));
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.children(id) {
                // Right goes first so that left is expanded first.
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => out.push(self.base[id as usize]),
            }
        }
        Ok(())
    }

    /// Human-readable form of a symbol (lossy UTF-8).
    pub fn render(&self, id: u32) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.decode(id)?).into_owned())
    }

    /// Whether `id` names a symbol in this table.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        (id as usize) < self.len()
    }

    /// Base units in id order.
    #[inline]
    pub fn base_units(&self) -> &[u8] {
        &self.base
    }

    /// Number of base symbols.
    #[inline]
    pub fn base_len(&self) -> usize {
        self.base.len()
    }

    /// Total number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.base.len() + self.merged.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
