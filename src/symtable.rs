// This file is part of armjit, an arithmetic-expression JIT compiler.
// Copyright 2022 Jeffrey Sharp
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// armjit is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// armjit is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with armjit.  If not, see <http://www.gnu.org/licenses/>.

//! The symbol table: a name-to-address map resolved eagerly while
//! walking the expression tree.
//!
//! Addresses are stored as plain `u32`, the width the code generator
//! embeds directly into the instruction stream (see
//! `codegen::emit::constant`). A symbol's "address" may be a variable's
//! storage location or a function's entry point; the compiler does not
//! distinguish the two until it decides whether a reference is a call.

use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::{c_char, c_void};

/// One `(name, pointer)` pair as passed across the C ABI in
/// [`jit_compile_expression_to_arm`](crate::ffi::jit_compile_expression_to_arm).
///
/// An array of these is terminated by an entry whose `name` and
/// `pointer` are both null, mirroring the original `symbol_t[]`
/// protocol.
#[repr(C)]
pub struct SymbolRecord {
    pub name: *const c_char,
    pub pointer: *mut c_void,
}

/// A resolved `name -> address` map.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    addresses: HashMap<String, u32>,
}

impl SymbolTable {
    /// An empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, address)` pairs. Intended for tests
    /// and for callers that already have Rust-native symbol data.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            addresses: pairs.into_iter().map(|(name, addr)| (name.into(), addr)).collect(),
        }
    }

    /// Builds a table by walking a null-terminated array of
    /// [`SymbolRecord`]s, the shape the C ABI entry point receives.
    ///
    /// # Safety
    ///
    /// `records` must point to a valid, null-terminated array of
    /// `SymbolRecord`s whose `name` fields are valid, NUL-terminated C
    /// strings for as long as this call runs.
    pub unsafe fn from_symbol_records(records: *const SymbolRecord) -> Self {
        let mut addresses = HashMap::new();
        if !records.is_null() {
            let mut i = 0isize;
            loop {
                let record = &*records.offset(i);
                if record.name.is_null() && record.pointer.is_null() {
                    break;
                }
                let name = CStr::from_ptr(record.name).to_string_lossy().into_owned();
                addresses.insert(name, record.pointer as u32);
                i += 1;
            }
        }
        Self { addresses }
    }

    /// Looks up `name`, returning its address if present.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.addresses.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_present_and_absent() {
        let table = SymbolTable::from_pairs([("a", 0x1000), ("b", 0x2000)]);
        assert_eq!(table.get("a"), Some(0x1000));
        assert_eq!(table.get("b"), Some(0x2000));
        assert_eq!(table.get("c"), None);
    }

    #[test]
    fn empty_table_resolves_nothing() {
        let table = SymbolTable::new();
        assert_eq!(table.get("anything"), None);
    }
}
