//! A Brainfuck interpreter over a circular byte tape.
//!
//! Programs are raw bytes. The eight instructions `><+-.,[]` are executed and
//! every other byte is ignored. Bracket pairs are resolved once, before
//! execution starts, so a program with unbalanced loops fails without running
//! any instruction.
//!
//! Behaviours:
//! - The tape holds `tape_size` cells (30,000 by default, at most 60,000), all
//!   starting at 0.
//! - The cursor wraps: `<` on cell 0 goes to the last cell, `>` on the last
//!   cell goes to cell 0.
//! - Cells wrap modulo 256.
//! - `,` reads one byte; at end of input the cell follows the [`EofPolicy`]
//!   (set to 0 by default).
//! - `.` writes the current cell as a raw byte.
//!
//! Quick start:
//!
//! ```
//! use bfc::Interpreter;
//!
//! let mut bf = Interpreter::new(b"++++++++[>++++++++<-]>+.".to_vec());
//! let mut out = Vec::new();
//! bf.run_with_io(&b""[..], &mut out).expect("program should run");
//! assert_eq!(out, b"A");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod resolver;
pub mod tape;

pub use config::{Config, ConfigError, EofPolicy};
pub use interpreter::{Interpreter, InterpreterError, UnmatchedBracketKind};
pub use resolver::{BracketStack, JumpTable};
pub use tape::Tape;
