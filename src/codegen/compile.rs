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

//! The tree compiler: walks an [`Expr`] post-order and emits a A32
//! instruction stream that, once executed as a nullary function, leaves
//! the expression's value in `r0`.
//!
//! The stack (`r13`/`sp`) is the only storage the generated code uses;
//! every subexpression's result is pushed, and every operator pops its
//! operands and pushes its result, so the tree walk never needs a
//! register allocator.

use crate::ast::{BinOp, Expr, UnOp};
use crate::codegen::emit;
use crate::error::{CompileError, Result};
use crate::symtable::SymbolTable;

const PROLOGUE: u32 = 0xe92d_43f0; // push {r4-r9, lr}
const EPILOGUE: u32 = 0xe8bd_43f0; // pop {r4-r9, lr}
const BX_LR: u32 = 0xe12f_ff1e;

/// The maximum number of call arguments this code generator can place
/// in AAPCS argument registers.
const MAX_CALL_ARGS: usize = 4;

/// Compiles `expr` against `symbols`, returning the little-endian bytes
/// of a complete, self-contained nullary A32 function.
pub fn compile(expr: &Expr, symbols: &SymbolTable) -> Result<Vec<u8>> {
    let mut c = Compiler { words: Vec::new(), symbols };

    c.emit(PROLOGUE);
    c.compile_tree(expr)?;
    c.emit(emit::pop(0));
    c.emit(EPILOGUE);
    c.emit(BX_LR);

    Ok(c.words.iter().flat_map(|w| w.to_le_bytes()).collect())
}

struct Compiler<'a> {
    words: Vec<u32>,
    symbols: &'a SymbolTable,
}

impl Compiler<'_> {
    fn emit(&mut self, word: u32) {
        self.words.push(word);
    }

    fn emit_all(&mut self, words: impl IntoIterator<Item = u32>) {
        self.words.extend(words);
    }

    fn address_of(&self, name: &str) -> Result<u32> {
        self.symbols
            .get(name)
            .ok_or_else(|| CompileError::UnknownSymbol(name.to_string()))
    }

    /// Compiles `expr`, leaving exactly one 32-bit result on the stack.
    fn compile_tree(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Literal(text) => {
                let value = decode_literal(text)?;
                self.emit_all(emit::constant(value, 0));
                self.emit(emit::push(0));
            }

            Expr::SymbolRef(name) => {
                let addr = self.address_of(name)?;
                self.emit_all(emit::load_constant(addr, 0));
                self.emit(emit::push(0));
            }

            Expr::Call { name, args } => {
                if args.len() > MAX_CALL_ARGS {
                    return Err(CompileError::TooManyArguments {
                        name: name.clone(),
                        count: args.len(),
                    });
                }

                for arg in args {
                    self.compile_tree(arg)?;
                }

                // The last-compiled argument is on top of the stack;
                // popping in this order lands the leftmost argument in
                // r0 and the rightmost in r(n-1), per AAPCS.
                let n = args.len();
                for i in 0..n {
                    self.emit(emit::pop((n - 1 - i) as u8));
                }

                let addr = self.address_of(name)?;
                self.emit_all(emit::constant(addr, 7));
                self.emit(emit::blx(7));
                self.emit(emit::push(0));
            }

            Expr::Unary { op: UnOp::Neg, expr } => {
                self.compile_tree(expr)?;
                self.emit(emit::pop(1));
                self.emit_all(emit::constant(0, 0));
                self.emit(emit::sub(0, 0, 1));
                self.emit(emit::push(0));
            }

            Expr::Binary { op, left, right } => {
                self.compile_tree(left)?;
                self.compile_tree(right)?;
                self.emit(emit::pop(1));
                self.emit(emit::pop(0));
                self.emit(match op {
                    BinOp::Add => emit::add(0, 0, 1),
                    BinOp::Sub => emit::sub(0, 0, 1),
                    BinOp::Mul => emit::mul(0, 0, 1),
                });
                self.emit(emit::push(0));
            }
        }

        Ok(())
    }
}

/// Decodes a decimal literal as an unsigned 32-bit value. Values in
/// `0..=u32::MAX` are accepted, including those whose bit pattern is
/// negative when reinterpreted as signed (`spec.md` treats that as
/// ordinary wraparound, not an error); a literal too large to fit in 32
/// bits at all is a [`CompileError::NumericOverflow`].
fn decode_literal(text: &str) -> Result<u32> {
    text.parse::<u32>()
        .map_err(|_| CompileError::NumericOverflow(text.to_string()))
}


/// A sequential interpreter for exactly the instruction shapes
/// `codegen::emit` produces.
///
/// This is not a general A32 emulator: it recognizes the small,
/// fixed set of instructions this code generator emits (by comparing
/// against the same base words `emit` builds from) and executes them
/// against a simplified machine model — an operand stack rather than
/// real `sp`-addressed memory, and a couple of lookup tables standing
/// in for the host address space that variable and extern addresses
/// would otherwise refer to. It exists so the compiler's end-to-end
/// behavior can be checked without an actual ARM host.
#[cfg(test)]
mod interp {
    use std::collections::HashMap;

    pub struct Machine {
        pub memory: HashMap<u32, u32>,
        pub externs: HashMap<u32, Box<dyn Fn(&[u32; 4]) -> u32>>,
    }

    impl Machine {
        pub fn new() -> Self {
            Self { memory: HashMap::new(), externs: HashMap::new() }
        }

        pub fn bind_variable(&mut self, addr: u32, value: u32) {
            self.memory.insert(addr, value);
        }

        pub fn bind_extern(&mut self, addr: u32, f: impl Fn(&[u32; 4]) -> u32 + 'static) {
            self.externs.insert(addr, Box::new(f));
        }

        /// Runs `code` (as produced by [`super::compile`]) and returns
        /// the value left in `r0` when it executes `bx lr`.
        pub fn run(&self, code: &[u8]) -> u32 {
            let words: Vec<u32> = code
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();

            let mut regs = [0u32; 16];
            let mut stack: Vec<u32> = Vec::new();
            let mut i = 0usize;

            loop {
                let w = words[i];
                match w {
                    super::PROLOGUE | super::EPILOGUE => {
                        i += 1;
                    }
                    super::BX_LR => return regs[0],
                    _ if is_ldr_pc(w) => {
                        let rd = field(w, 12);
                        regs[rd as usize] = words[i + 2];
                        i += 3;
                    }
                    _ if is_push(w) => {
                        let rd = field(w, 12);
                        stack.push(regs[rd as usize]);
                        i += 1;
                    }
                    _ if is_pop(w) => {
                        let rd = field(w, 12);
                        regs[rd as usize] = stack.pop().expect("operand stack underflow");
                        i += 1;
                    }
                    _ if is_add(w) => {
                        let (rd, rn, rm) = add_sub_fields(w);
                        regs[rd] = regs[rn].wrapping_add(regs[rm]);
                        i += 1;
                    }
                    _ if is_sub(w) => {
                        let (rd, rn, rm) = add_sub_fields(w);
                        regs[rd] = regs[rn].wrapping_sub(regs[rm]);
                        i += 1;
                    }
                    _ if is_mul(w) => {
                        let rd = field(w, 16) as usize;
                        let rn = field(w, 8) as usize;
                        let rm = field(w, 0) as usize;
                        regs[rd] = regs[rn].wrapping_mul(regs[rm]);
                        i += 1;
                    }
                    _ if is_blx(w) => {
                        let rm = field(w, 0) as usize;
                        let addr = regs[rm];
                        let f = self.externs.get(&addr).unwrap_or_else(|| {
                            panic!("call to unbound extern address {addr:#x}")
                        });
                        regs[0] = f(&[regs[0], regs[1], regs[2], regs[3]]);
                        i += 1;
                    }
                    _ if is_ldr_deref(w) => {
                        let rd = field(w, 12) as usize;
                        let rn = field(w, 16) as usize;
                        let addr = regs[rn];
                        regs[rd] = *self
                            .memory
                            .get(&addr)
                            .unwrap_or_else(|| panic!("read of unbound address {addr:#x}"));
                        i += 1;
                    }
                    other => panic!("interpreter cannot decode word {other:#010x}"),
                }
            }
        }
    }

    fn field(word: u32, shift: u32) -> u32 {
        (word >> shift) & 0xf
    }

    fn is_ldr_pc(word: u32) -> bool {
        const MASK: u32 = !(0xf << 16 | 0xf << 12);
        (word & MASK) == emit::LDR_BASE && field(word, 16) == 15
    }

    fn is_ldr_deref(word: u32) -> bool {
        const MASK: u32 = !(0xf << 16 | 0xf << 12);
        (word & MASK) == emit::LDR_BASE && field(word, 16) != 15
    }

    fn is_push(word: u32) -> bool {
        const MASK: u32 = !(0xf << 12);
        (word & MASK) == emit::PUSH_BASE
    }

    fn is_pop(word: u32) -> bool {
        const MASK: u32 = !(0xf << 12);
        (word & MASK) == emit::POP_BASE
    }

    fn is_add(word: u32) -> bool {
        const MASK: u32 = !(0xf << 16 | 0xf << 12 | 0xf);
        (word & MASK) == emit::ADD_BASE && field(word, 16) != 15
    }

    fn is_sub(word: u32) -> bool {
        const MASK: u32 = !(0xf << 16 | 0xf << 12 | 0xf);
        (word & MASK) == emit::SUB_BASE
    }

    fn is_mul(word: u32) -> bool {
        const MASK: u32 = !(0xf << 16 | 0xf << 8 | 0xf);
        (word & MASK) == emit::MUL_BASE
    }

    fn is_blx(word: u32) -> bool {
        const MASK: u32 = !0xf;
        (word & MASK) == emit::BLX_BASE
    }

    fn add_sub_fields(word: u32) -> (usize, usize, usize) {
        (field(word, 12) as usize, field(word, 16) as usize, field(word, 0) as usize)
    }

    use super::*;
    use crate::parser::parse_expression;

    fn run_arithmetic(expr: &str) -> u32 {
        let tree = parse_expression(expr).unwrap();
        let bytes = compile(&tree, &SymbolTable::new()).unwrap();
        Machine::new().run(&bytes)
    }

    #[test]
    fn scenario_subtraction() {
        assert_eq!(run_arithmetic("1337 - 42"), 1295);
    }

    #[test]
    fn scenario_mul_binds_tighter_on_the_left() {
        assert_eq!(run_arithmetic("2 * 3 + 4"), 10);
    }

    #[test]
    fn scenario_mul_binds_tighter_on_the_right() {
        assert_eq!(run_arithmetic("2 + 3 * 4"), 14);
    }

    #[test]
    fn scenario_unary_minus_of_parenthesized_subtraction() {
        assert_eq!(run_arithmetic("-(5 - 8)"), 3);
    }

    #[test]
    fn scenario_call_with_symbol_arguments() {
        let tree = parse_expression("div(a + b, c)").unwrap();
        let symbols = SymbolTable::from_pairs([
            ("a", 0x9000),
            ("b", 0x9004),
            ("c", 0x9008),
            ("div", 0x1000),
        ]);
        let bytes = compile(&tree, &symbols).unwrap();

        let mut machine = Machine::new();
        machine.bind_variable(0x9000, 10);
        machine.bind_variable(0x9004, 20);
        machine.bind_variable(0x9008, 3);
        machine.bind_extern(0x1000, |args| args[0] / args[1]);

        assert_eq!(machine.run(&bytes), 10);
    }

    #[test]
    fn scenario_nested_call() {
        let tree = parse_expression("mod(inc(a), 3)").unwrap();
        let symbols = SymbolTable::from_pairs([("a", 0x9000), ("inc", 0x1000), ("mod", 0x1004)]);
        let bytes = compile(&tree, &symbols).unwrap();

        let mut machine = Machine::new();
        machine.bind_variable(0x9000, 10);
        machine.bind_extern(0x1000, |args| args[0] + 1);
        machine.bind_extern(0x1004, |args| args[0] % args[1]);

        assert_eq!(machine.run(&bytes), 2);
    }
}
