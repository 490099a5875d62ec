//! The execution engine.
//!
//! An [`Interpreter`] owns a program, a [`Tape`] and the bracket pairing for
//! that program. Brackets are resolved before the first instruction runs, so
//! a structurally broken program produces no output at all.
//!
//! Behaviour:
//! - The tape is circular: `<` on cell 0 moves to the last cell and `>` on
//!   the last cell moves to cell 0.
//! - Cells wrap modulo 256 in both directions.
//! - `,` reads one byte from the input port; at end of input the cell is
//!   updated according to the [`EofPolicy`].
//! - `.` writes the current cell as a raw byte to the output port.
//! - Every byte outside `><+-.,[]` is ignored.
//!
//! ```no_run
//! use bfc::Interpreter;
//!
//! let code = b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut bf = Interpreter::new(code.to_vec());
//! bf.run().expect("program should run");
//! ```

use std::fmt;
use std::io::{self, Read, Write};
use std::num::NonZeroUsize;

use crate::config::{DEFAULT_TAPE, EofPolicy};
use crate::resolver::{DEFAULT_STACK_CAPACITY, JumpTable};
use crate::tape::Tape;

/// Errors that can occur while resolving or running a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("unmatched {kind} at instruction {ip}")]
    UnmatchedBrackets { ip: usize, kind: UnmatchedBracketKind },

    /// Brackets nested deeper than the bracket stack allows.
    #[error("stack depth exceeded at instruction {ip} (capacity {capacity})")]
    StackOverflow { ip: usize, capacity: usize },

    /// Reading from the input port or writing to the output port failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: io::Error,
    },
}

impl InterpreterError {
    /// Program offset the error is attributed to.
    pub fn ip(&self) -> usize {
        match self {
            InterpreterError::UnmatchedBrackets { ip, .. }
            | InterpreterError::StackOverflow { ip, .. }
            | InterpreterError::Io { ip, .. } => *ip,
        }
    }

    /// True for errors found while pairing brackets, before execution.
    pub fn is_structural(&self) -> bool {
        !matches!(self, InterpreterError::Io { .. })
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "opening bracket '['"),
            UnmatchedBracketKind::Close => write!(f, "closing bracket ']'"),
        }
    }
}

/// A Brainfuck interpreter over a circular tape.
pub struct Interpreter {
    program: Vec<u8>,
    tape: Tape,
    eof_policy: EofPolicy,
    stack_capacity: usize,
}

impl Interpreter {
    /// Create an interpreter for `program` with the default 30,000-cell tape.
    pub fn new(program: Vec<u8>) -> Self {
        Self::with_tape_size(program, DEFAULT_TAPE)
    }

    /// Create an interpreter for `program` with a tape of `tape_size` cells.
    pub fn with_tape_size(program: Vec<u8>, tape_size: NonZeroUsize) -> Self {
        Self {
            program,
            tape: Tape::new(tape_size),
            eof_policy: EofPolicy::default(),
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }

    /// Choose what `,` stores when the input port is exhausted.
    pub fn set_eof_policy(&mut self, policy: EofPolicy) {
        self.eof_policy = policy;
    }

    /// Limit how deeply loops may nest.
    pub fn set_stack_capacity(&mut self, capacity: usize) {
        self.stack_capacity = capacity;
    }

    /// Give the program bytes back, e.g. to render an error against them.
    pub fn into_program(self) -> Vec<u8> {
        self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Run against the process's stdin and stdout.
    pub fn run(&mut self) -> Result<(), InterpreterError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with_io(stdin.lock(), stdout.lock())
    }

    /// Run the program to completion, reading `,` bytes from `input` and
    /// writing `.` bytes to `output`.
    ///
    /// Brackets are resolved first; on a structural error nothing is read or
    /// written. Every run starts from a zeroed tape with the cursor on cell 0.
    /// `output` is flushed before returning, whether or not the run succeeded.
    pub fn run_with_io<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), InterpreterError> {
        let jumps = JumpTable::resolve_with_capacity(&self.program, self.stack_capacity)?;
        self.tape.reset();
        tracing::debug!(
            program_len = self.program.len(),
            tape_size = self.tape.size(),
            eof = ?self.eof_policy,
            "starting run"
        );

        let result = self.execute(&jumps, &mut input, &mut output);
        let flushed = output.flush();

        let steps = result?;
        flushed.map_err(|source| InterpreterError::Io { ip: self.program.len(), source })?;
        tracing::debug!(steps, cursor = self.tape.cursor(), "run finished");
        Ok(())
    }

    /// Dispatch loop. Returns the number of instructions executed.
    fn execute<R: Read, W: Write>(&mut self, jumps: &JumpTable, input: &mut R, output: &mut W) -> Result<u64, InterpreterError> {
        let code_len = self.program.len();
        let mut code_ptr = 0;
        let mut steps: u64 = 0;

        while code_ptr < code_len {
            match self.program[code_ptr] {
                b'>' => self.tape.move_right(),
                b'<' => self.tape.move_left(),
                b'+' => self.tape.increment(),
                b'-' => self.tape.decrement(),
                b'.' => {
                    output
                        .write_all(&[self.tape.get()])
                        .map_err(|source| InterpreterError::Io { ip: code_ptr, source })?;
                }
                b',' => {
                    match read_byte(input).map_err(|source| InterpreterError::Io { ip: code_ptr, source })? {
                        Some(b) => self.tape.set(b),
                        None => self.eof_policy.apply(&mut self.tape),
                    }
                }
                b'[' => {
                    // Land on the matching ']' so the increment below steps past it.
                    if self.tape.get() == 0 {
                        code_ptr = jumps.target(code_ptr);
                    }
                }
                b']' => {
                    // Land on the matching '[' so the increment below re-enters the body.
                    if self.tape.get() != 0 {
                        code_ptr = jumps.target(code_ptr);
                    }
                }
                _ => {}
            }

            steps += 1;
            code_ptr += 1;
        }

        tracing::trace!(steps, "dispatch loop reached end of program");
        Ok(steps)
    }
}

/// Read exactly one byte, retrying on interruption. `None` means end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
