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

//! The driver binary: reads a line-oriented protocol from stdin, JIT
//! compiles the one expression it describes, and runs the result.
//!
//! This binary, and the protocol it reads, are informative per
//! `spec.md` §6 — nothing here is part of the compiler's public
//! contract. It exists to give the library something to drive.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use armjit::diagnostics::{self, Origin};
use armjit::symtable::SymbolTable;
use armjit::PROGRAM_NAME;

// The four built-in externs every driver invocation makes available,
// matching `original_source/src/main.cpp`'s `my_div`/`my_mod`/`my_inc`/
// `my_dec`.
extern "C" fn my_div(a: i32, b: i32) -> i32 {
    a / b
}
extern "C" fn my_mod(a: i32, b: i32) -> i32 {
    a % b
}
extern "C" fn my_inc(a: i32) -> i32 {
    a + 1
}
extern "C" fn my_dec(a: i32) -> i32 {
    a - 1
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Expression,
    Vars,
}

/// The protocol's accumulated state: the one expression to compile
/// (replaced wholesale by each expression-mode line, matching the
/// original's line-at-a-time buffer reset) and the variables declared
/// in vars-mode lines so far.
struct Program {
    expression: String,
    variables: Vec<(String, i32)>,
}

fn read_program(input: impl BufRead) -> io::Result<Program> {
    let mut program = Program { expression: String::new(), variables: Vec::new() };
    let mut mode = Mode::Expression;

    for line in input.lines() {
        let line = line?;

        if line.starts_with('#') {
            continue;
        }
        if line.starts_with('.') {
            if line.contains("expression") {
                mode = Mode::Expression;
            } else if line.contains("vars") {
                mode = Mode::Vars;
            }
            continue;
        }

        match mode {
            Mode::Expression => {
                program.expression = line.chars().filter(|c| !c.is_whitespace()).collect();
            }
            Mode::Vars => {
                for token in line.split_whitespace() {
                    match token.split_once('=') {
                        Some((name, value)) if !name.is_empty() => {
                            let value: i32 = value.parse().unwrap_or_else(|_| {
                                eprintln!("{PROGRAM_NAME}: error: not a decimal integer: {value:?}");
                                std::process::exit(1);
                            });
                            program.variables.push((name.to_string(), value));
                        }
                        _ => {
                            eprintln!("{PROGRAM_NAME}: error: malformed variable token: {token:?}");
                            std::process::exit(1);
                        }
                    }
                }
            }
        }
    }

    Ok(program)
}

/// Builds the symbol table: the four built-ins, plus one leaked `i32`
/// cell per declared variable. Leaking is deliberate: each cell's
/// address is embedded directly into the generated code and must stay
/// valid for the rest of the process's life.
fn build_symbols(variables: &[(String, i32)]) -> SymbolTable {
    let mut pairs: Vec<(String, u32)> = vec![
        ("div".to_string(), my_div as usize as u32),
        ("mod".to_string(), my_mod as usize as u32),
        ("inc".to_string(), my_inc as usize as u32),
        ("dec".to_string(), my_dec as usize as u32),
    ];

    for (name, value) in variables {
        let cell: &'static mut i32 = Box::leak(Box::new(*value));
        pairs.push((name.clone(), cell as *mut i32 as u32));
    }

    SymbolTable::from_pairs(pairs)
}

fn main() -> ExitCode {
    let program = match read_program(io::stdin().lock()) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{PROGRAM_NAME}: error: failed to read stdin: {err}");
            return ExitCode::FAILURE;
        }
    };

    let symbols = build_symbols(&program.variables);

    let code = match armjit::compile_expression(&program.expression, &symbols) {
        Ok(code) => code,
        Err(err) => {
            let origin = Origin::Expression {
                text: &program.expression,
                loc: diagnostics::Location::UNKNOWN,
            };
            eprintln!("{}", diagnostics::render(&err, origin));
            return ExitCode::FAILURE;
        }
    };

    run_and_print(&code)
}

#[cfg(target_arch = "arm")]
fn run_and_print(code: &[u8]) -> ExitCode {
    use std::ptr;

    unsafe {
        let page = libc::mmap(
            ptr::null_mut(),
            code.len(),
            libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        );
        if page == libc::MAP_FAILED {
            eprintln!("{PROGRAM_NAME}: error: mmap failed: {}", io::Error::last_os_error());
            return ExitCode::FAILURE;
        }

        ptr::copy_nonoverlapping(code.as_ptr(), page as *mut u8, code.len());

        let function: extern "C" fn() -> i32 = std::mem::transmute(page);
        let result = function();
        println!("{result}");

        libc::munmap(page, code.len());
    }

    ExitCode::SUCCESS
}

/// On non-ARM hosts the emitted code cannot be executed; print a hex
/// dump instead so the driver is still useful for inspecting what the
/// compiler produced.
#[cfg(not(target_arch = "arm"))]
fn run_and_print(code: &[u8]) -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, chunk) in code.chunks(4).enumerate() {
        let word = u32::from_le_bytes([
            chunk[0],
            *chunk.get(1).unwrap_or(&0),
            *chunk.get(2).unwrap_or(&0),
            *chunk.get(3).unwrap_or(&0),
        ]);
        let _ = writeln!(out, "{:04}: {word:08x}", i * 4);
    }
    ExitCode::SUCCESS
}
