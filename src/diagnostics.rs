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

//! Severity-tagged diagnostic rendering for the driver.
//!
//! The core library never prints anything; it only returns
//! [`CompileError`](crate::error::CompileError) values. This module is
//! how the driver binary turns one of those into a message a human would
//! want to read, with an optional source origin and an ANSI-colored
//! severity tag.

use std::fmt::{self, Display, Formatter};

use colored::Colorize;

use crate::error::CompileError;

/// A 1-based source location.
///
/// The core's expressions are always single-line, so only the line
/// number is tracked; `0` indicates "unknown". The type exists mainly so
/// the driver's diagnostics have the same shape as the rest of this
/// corpus's location-tagged messages, and so a future multi-line input
/// source is not a breaking change.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Location {
    /// The 1-based line number, or `0` if unknown.
    pub line: u32,
}

impl Location {
    /// The unknown location.
    pub const UNKNOWN: Self = Self { line: 0 };

    /// Creates a [`Location`] for the given 1-based line number.
    pub const fn new(line: u32) -> Self {
        Self { line }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.line {
            0 => Ok(()),
            l => write!(f, "{}", l),
        }
    }
}

/// The origin of a diagnostic message.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Origin<'a> {
    /// The message originates from the driver itself, not from the
    /// expression being compiled.
    General,

    /// The message originates from a specific expression source.
    Expression {
        /// The expression text, for context.
        text: &'a str,
        /// Location within it, if known.
        loc: Location,
    },
}

impl Display for Origin<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Origin::General => write!(f, "{}", crate::PROGRAM_NAME),
            Origin::Expression { text, loc } if loc.line == 0 => {
                write!(f, "{}: {:?}", crate::PROGRAM_NAME, text)
            }
            Origin::Expression { text, loc } => {
                write!(f, "{}:{}: {:?}", crate::PROGRAM_NAME, loc, text)
            }
        }
    }
}

/// Diagnostic severity levels.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    /// Informational; assembly/compilation is unaffected.
    Note,

    /// A problem that prevents compilation from producing output.
    Error,

    /// A severe, unrecoverable problem.
    Fatal,
}

impl Severity {
    fn tag(self) -> colored::ColoredString {
        match self {
            Severity::Note => "note".normal(),
            Severity::Error => "error".red().bold(),
            Severity::Fatal => "fatal".red().bold(),
        }
    }
}

/// Every [`CompileError`] is, at present, an `Error`-severity diagnostic;
/// none of the lex/parse/compile failures are warnings, since `spec.md`
/// treats all of them as fatal to the compilation.
fn severity_of(_err: &CompileError) -> Severity {
    Severity::Error
}

/// Renders a [`CompileError`] as a single line suitable for printing to
/// stderr, with an ANSI-colored severity tag and, when known, an origin.
pub fn render(err: &CompileError, origin: Origin) -> String {
    let severity = severity_of(err);
    match origin {
        Origin::General => format!("{}: {}: {}", crate::PROGRAM_NAME, severity.tag(), err),
        _ => format!("{}: {}: {}", origin, severity.tag(), err),
    }
}
