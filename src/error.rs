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

//! The compile-time error taxonomy.
//!
//! Every fallible operation in the lexer, parser, and code generator
//! returns `Result<_, CompileError>`. The first error aborts the whole
//! compilation; nothing here is recovered locally.

use thiserror::Error;

/// A fatal error arising anywhere in the lex → parse → compile pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The lexer's transition function reached its `Error` state: a byte
    /// outside letters, digits, `_`, the six symbol characters, and
    /// whitespace.
    #[error("lexical error: unrecognized character {found:?}")]
    Lexical {
        /// The offending byte, rendered as a `char` for display.
        found: char,
    },

    /// The parser expected one specific token and found another.
    #[error("syntax error: expected {expected}, found {found:?}")]
    Syntax {
        /// Human-readable description of what was expected (e.g. `"')'"`).
        expected: &'static str,
        /// The token text that was actually found.
        found: String,
    },

    /// A symbol reference or call named a symbol absent from the symbol
    /// table.
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),

    /// The tree compiler encountered an operator it cannot lower. This
    /// should be unreachable if the parser only ever constructs `BinOp`/
    /// `UnOp` values the compiler knows about; it exists defensively.
    #[error("unsupported operator: {0:?}")]
    UnsupportedOperator(String),

    /// A decimal literal could not be decoded as a 32-bit value at all
    /// (as opposed to wrapping into the high half of the unsigned range,
    /// which is accepted per spec).
    #[error("numeric overflow in literal {0:?}")]
    NumericOverflow(String),

    /// A call expression has more arguments than the AAPCS register
    /// convention this code generator supports.
    #[error("call to {name:?} has {count} arguments; at most 4 are supported")]
    TooManyArguments {
        /// The called symbol's name.
        name: String,
        /// The number of arguments actually given.
        count: usize,
    },
}

/// Convenience alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, CompileError>;
