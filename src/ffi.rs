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

//! The C ABI entry point, matching the original `jit_compile_expression_to_arm`
//! signature exactly.
//!
//! The signature has no room for an error return: the original let a
//! failed compilation throw an uncaught exception straight into
//! `std::terminate`. This implementation keeps that observable
//! behavior — "compile fails; no bytes should be relied upon in the
//! output buffer" per `spec.md` §7 — by rendering the failure to
//! stderr and aborting the process, rather than by unwinding a Rust
//! panic across the FFI boundary.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::diagnostics::{self, Origin};
use crate::symtable::SymbolRecord;

/// Compiles `expression` against `externs` and writes the resulting
/// A32 machine code, little-endian, into `out_buffer`.
///
/// # Safety
///
/// - `expression` must be a valid, NUL-terminated, UTF-8 C string.
/// - `externs` must be null, or point to a null-terminated array of
///   [`SymbolRecord`]s whose `name` fields are themselves valid,
///   NUL-terminated C strings.
/// - `out_buffer` must be writable and large enough to hold the
///   compiled code; the caller is responsible for sizing it, as the
///   core does not report how many bytes it wrote.
#[no_mangle]
pub unsafe extern "C" fn jit_compile_expression_to_arm(
    expression: *const c_char,
    externs: *const SymbolRecord,
    out_buffer: *mut u8,
) {
    let text = match CStr::from_ptr(expression).to_str() {
        Ok(text) => text,
        Err(_) => {
            eprintln!("{}: error: expression is not valid UTF-8", crate::PROGRAM_NAME);
            std::process::abort();
        }
    };

    let symbols = crate::symtable::SymbolTable::from_symbol_records(externs);

    match crate::compile_expression(text, &symbols) {
        Ok(bytes) => {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), out_buffer, bytes.len());
        }
        Err(err) => {
            let origin = Origin::Expression { text, loc: diagnostics::Location::UNKNOWN };
            eprintln!("{}", diagnostics::render(&err, origin));
            std::process::abort();
        }
    }
}
