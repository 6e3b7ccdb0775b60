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

//! The recursive-descent parser.
//!
//! Four mutually recursive productions, one per precedence level:
//!
//! ```text
//! sum     = product ( ('+' | '-') product )*
//! product = unary ( '*' unary )*
//! unary   = '-' unary | atom
//! atom    = number
//!         | ident ( '(' sum ( ',' sum )* ')' )?
//!         | '(' sum ')'
//! ```
//!
//! `sum` and `product` loop rather than recurse on their own level, so
//! `a - b - c` parses as `(a - b) - c`: left-associative. `unary`
//! recurses into itself, so `--a` parses as `-(-a)`: right-associative,
//! for whatever that is worth with a single prefix operator.
//!
//! A call's argument list requires at least one argument; `f()` is a
//! syntax error rather than a zero-argument call; see the note on
//! `Expr::Call` in `ast.rs`.

use crate::ast::{BinOp, Expr, UnOp};
use crate::error::{CompileError, Result};
use crate::lexer::Lexer;

/// Parses a `Sum` production out of the front of `input`. Does not
/// require end-of-stream: any tokens left over after a syntactically
/// complete expression are simply never consumed, matching the source
/// parser's `Parse()` (no trailing-EOF check) — it is the entry API's
/// decision, not the parser's, whether leftover input matters.
pub fn parse_expression(input: &str) -> Result<Expr> {
    Parser::new(input)?.parse()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        lexer.advance_skip_space()?;
        Ok(Self { lexer })
    }

    fn parse(&mut self) -> Result<Expr> {
        self.parse_sum()
    }

    /// The text of the current token, or a placeholder at end of input,
    /// for use in syntax-error messages.
    fn found(&self) -> String {
        if self.lexer.is_finished() {
            "<end of input>".to_string()
        } else {
            self.lexer.current().to_string()
        }
    }

    fn bump(&mut self) -> Result<()> {
        self.lexer.advance_skip_space()
    }

    fn at(&self, symbol: &str) -> bool {
        !self.lexer.is_finished() && self.lexer.current() == symbol
    }

    fn expect(&mut self, symbol: &'static str) -> Result<()> {
        if self.at(symbol) {
            self.bump()
        } else {
            Err(CompileError::Syntax {
                expected: symbol,
                found: self.found(),
            })
        }
    }

    /// `sum = product ( ('+' | '-') product )*`
    fn parse_sum(&mut self) -> Result<Expr> {
        let mut left = self.parse_product()?;
        loop {
            let op = if self.at("+") {
                BinOp::Add
            } else if self.at("-") {
                BinOp::Sub
            } else {
                return Ok(left);
            };
            self.bump()?;
            let right = self.parse_product()?;
            left = Expr::binary(op, left, right);
        }
    }

    /// `product = unary ( '*' unary )*`
    fn parse_product(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while self.at("*") {
            self.bump()?;
            let right = self.parse_unary()?;
            left = Expr::binary(BinOp::Mul, left, right);
        }
        Ok(left)
    }

    /// `unary = '-' unary | atom`
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.at("-") {
            self.bump()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(UnOp::Neg, operand));
        }
        self.parse_atom()
    }

    /// `atom = number | ident ( '(' sum ( ',' sum )* ')' )? | '(' sum ')'`
    fn parse_atom(&mut self) -> Result<Expr> {
        if self.lexer.is_finished() {
            return Err(CompileError::Syntax {
                expected: "expression",
                found: self.found(),
            });
        }

        if self.lexer.current_is_number() {
            let text = self.lexer.current().to_string();
            self.bump()?;
            return Ok(Expr::Literal(text));
        }

        if self.lexer.current_is_identifier() {
            let name = self.lexer.current().to_string();
            self.bump()?;
            if self.at("(") {
                return self.parse_call(name);
            }
            return Ok(Expr::SymbolRef(name));
        }

        if self.at("(") {
            self.bump()?;
            let inner = self.parse_sum()?;
            self.expect(")")?;
            return Ok(inner);
        }

        Err(CompileError::Syntax {
            expected: "expression",
            found: self.found(),
        })
    }

    /// The argument list of a call, with the leading identifier and `(`
    /// already consumed. Requires at least one argument.
    fn parse_call(&mut self, name: String) -> Result<Expr> {
        self.bump()?; // consume '('
        let mut args = vec![self.parse_sum()?];
        while self.at(",") {
            self.bump()?;
            args.push(self.parse_sum()?);
        }
        self.expect(")")?;
        Ok(Expr::Call { name, args })
    }
}
