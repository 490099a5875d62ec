//! Upfront bracket matching.
//!
//! The whole program is scanned once before execution. Every `[` is paired
//! with its `]` and the pairing is stored in a [`JumpTable`] so that loop
//! jumps during execution are O(1). Any nesting error is reported here, which
//! means a malformed program never executes a single instruction.

use crate::interpreter::{InterpreterError, UnmatchedBracketKind};

/// Default nesting depth accepted by [`JumpTable::resolve`].
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// Bounded stack of pending `[` offsets.
///
/// The capacity is fixed at construction; pushing past it is a
/// [`InterpreterError::StackOverflow`] rather than a reallocation.
#[derive(Debug)]
pub struct BracketStack {
    entries: Vec<usize>,
    capacity: usize,
}

impl BracketStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Record an open bracket at program offset `ip`.
    pub fn push(&mut self, ip: usize) -> Result<(), InterpreterError> {
        if self.entries.len() >= self.capacity {
            return Err(InterpreterError::StackOverflow {
                ip,
                capacity: self.capacity,
            });
        }
        self.entries.push(ip);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<usize> {
        self.entries.last().copied()
    }
}

/// Bidirectional map between matching bracket offsets.
///
/// `targets[i]` holds the partner of the bracket at offset `i`. Offsets that
/// are not brackets map to themselves, which no bracket ever does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<usize>,
    pairs: usize,
}

impl JumpTable {
    /// Resolve `program` with the default nesting capacity.
    pub fn resolve(program: &[u8]) -> Result<Self, InterpreterError> {
        Self::resolve_with_capacity(program, DEFAULT_STACK_CAPACITY)
    }

    /// Resolve `program`, failing if brackets nest deeper than `capacity`.
    ///
    /// Errors:
    /// - a `]` with nothing open is reported at that `]`;
    /// - a `[` still open after the last byte is reported at the innermost
    ///   such `[`, and only once the whole program has been scanned;
    /// - nesting past `capacity` is reported at the `[` that overflowed.
    pub fn resolve_with_capacity(program: &[u8], capacity: usize) -> Result<Self, InterpreterError> {
        let mut targets: Vec<usize> = (0..program.len()).collect();
        let mut stack = BracketStack::with_capacity(capacity);
        let mut pairs = 0;

        for (i, &byte) in program.iter().enumerate() {
            match byte {
                b'[' => stack.push(i)?,
                b']' => {
                    let Some(open_index) = stack.pop() else {
                        return Err(InterpreterError::UnmatchedBrackets {
                            ip: i,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    targets[open_index] = i;
                    targets[i] = open_index;
                    pairs += 1;
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last() {
            return Err(InterpreterError::UnmatchedBrackets {
                ip: unmatched_open,
                kind: UnmatchedBracketKind::Open,
            });
        }

        tracing::debug!(len = program.len(), pairs, "resolved bracket pairs");
        Ok(Self { targets, pairs })
    }

    /// Partner offset of the bracket at `ip`, or `None` if `ip` is not a
    /// bracket (or out of range).
    pub fn partner(&self, ip: usize) -> Option<usize> {
        match self.targets.get(ip) {
            Some(&target) if target != ip => Some(target),
            _ => None,
        }
    }

    /// Jump destination for `ip`. Non-bracket offsets map to themselves.
    pub(crate) fn target(&self, ip: usize) -> usize {
        self.targets[ip]
    }

    /// Number of matched `[`/`]` pairs.
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Length of the program this table was built for.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_simple_loop() {
        let table = JumpTable::resolve(b"+[-]").unwrap();
        assert_eq!(table.partner(1), Some(3));
        assert_eq!(table.partner(3), Some(1));
        assert_eq!(table.partner(0), None);
        assert_eq!(table.partner(2), None);
        assert_eq!(table.pairs(), 1);
    }

    #[test]
    fn pairs_nested_loops_innermost_first() {
        let table = JumpTable::resolve(b"[[][]]").unwrap();
        assert_eq!(table.partner(0), Some(5));
        assert_eq!(table.partner(1), Some(2));
        assert_eq!(table.partner(3), Some(4));
        assert_eq!(table.pairs(), 3);
    }

    #[test]
    fn skips_non_instruction_bytes() {
        let table = JumpTable::resolve(b"a[ b\n\xff ]c").unwrap();
        assert_eq!(table.partner(1), Some(7));
        assert_eq!(table.partner(7), Some(1));
    }

    #[test]
    fn empty_program_resolves() {
        let table = JumpTable::resolve(b"").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.pairs(), 0);
    }

    #[test]
    fn stray_close_is_reported_at_its_position() {
        let err = JumpTable::resolve(b"+[]]+").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBrackets { ip: 3, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn lone_close_is_reported_at_zero() {
        let err = JumpTable::resolve(b"]").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBrackets { ip: 0, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn stray_open_is_reported_after_full_scan() {
        // The `]` at offset 3 closes the inner loop; the outer `[` is only known to be open at the end.
        let err = JumpTable::resolve(b"[[+]+").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBrackets { ip: 0, kind: UnmatchedBracketKind::Open }
        ));
    }

    #[test]
    fn innermost_unclosed_open_is_reported() {
        let err = JumpTable::resolve(b"[+[").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBrackets { ip: 2, kind: UnmatchedBracketKind::Open }
        ));
    }

    #[test]
    fn close_error_wins_over_later_open_error() {
        let err = JumpTable::resolve(b"][").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBrackets { ip: 0, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn nesting_up_to_capacity_is_accepted() {
        let program = format!("{}{}", "[".repeat(4), "]".repeat(4));
        assert!(JumpTable::resolve_with_capacity(program.as_bytes(), 4).is_ok());
    }

    #[test]
    fn nesting_past_capacity_overflows() {
        let program = format!("{}{}", "[".repeat(5), "]".repeat(5));
        let err = JumpTable::resolve_with_capacity(program.as_bytes(), 4).unwrap_err();
        assert!(matches!(err, InterpreterError::StackOverflow { ip: 4, capacity: 4 }));
    }

    #[test]
    fn default_capacity_is_1024() {
        let ok = format!("{}{}", "[".repeat(1024), "]".repeat(1024));
        assert!(JumpTable::resolve(ok.as_bytes()).is_ok());

        let deep = format!("{}{}", "[".repeat(1025), "]".repeat(1025));
        assert!(matches!(
            JumpTable::resolve(deep.as_bytes()),
            Err(InterpreterError::StackOverflow { ip: 1024, capacity: 1024 })
        ));
    }

    #[test]
    fn sequential_loops_reuse_stack_depth() {
        // Depth never exceeds one even though there are many loops.
        let program = "[]".repeat(2000);
        let table = JumpTable::resolve_with_capacity(program.as_bytes(), 1).unwrap();
        assert_eq!(table.pairs(), 2000);
    }

    #[test]
    fn bracket_stack_tracks_depth() {
        let mut stack = BracketStack::with_capacity(2);
        assert_eq!(stack.capacity(), 2);
        stack.push(0).unwrap();
        stack.push(5).unwrap();
        assert_eq!(stack.depth(), 2);
        assert!(stack.push(9).is_err());
        assert_eq!(stack.pop(), Some(5));
        assert_eq!(stack.last(), Some(0));
    }
}
