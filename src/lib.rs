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

//! A JIT compiler for a single arithmetic expression over integers and
//! named external symbols, targeting 32-bit ARM (A32).
//!
//! The pipeline is the usual three stages — [`lexer`], [`parser`],
//! [`codegen`] — wired together by [`compile_expression`], the one
//! safe entry point the rest of this crate (and the driver binary)
//! should call. [`ffi`] exposes the same operation across a C ABI for
//! embedding into a host that already has its own symbol addresses to
//! hand over.
//!
//! This crate never prints anything itself; every fallible operation
//! returns a [`error::CompileError`], and it is up to the caller (the
//! driver binary, or an embedder) to decide how to report it. See
//! [`diagnostics`] for the rendering the driver uses.

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod error;
pub mod ffi;
pub mod lexer;
pub mod parser;
pub mod symtable;

use error::Result;
use symtable::SymbolTable;

/// The program's name, used in diagnostic messages.
pub const PROGRAM_NAME: &str = "armjit";

/// Compiles a single arithmetic expression against a resolved symbol
/// table, returning the little-endian bytes of a complete, callable
/// A32 function.
///
/// This is the safe counterpart to [`ffi::jit_compile_expression_to_arm`]:
/// same pipeline, ordinary `Result` instead of an abort-on-failure C
/// ABI.
pub fn compile_expression(expression: &str, symbols: &SymbolTable) -> Result<Vec<u8>> {
    let tree = parser::parse_expression(expression)?;
    codegen::compile(&tree, symbols)
}
