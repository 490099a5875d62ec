use std::io::{self, Write};

use crate::InterpreterError;

/// Bytes shown on each side of the offending instruction.
const WINDOW_BYTES: usize = 32;

/// Pretty-print an [`InterpreterError`] with caret positioning.
/// If `program` is `Some("bfc")`, messages are prefixed with "bfc: ...".
pub fn print_interpreter_error(program: Option<&str>, code: &[u8], err: &InterpreterError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let msg = match err {
        InterpreterError::UnmatchedBrackets { kind, .. } => format!("Parse error: unmatched {kind}"),
        InterpreterError::StackOverflow { capacity, .. } => {
            format!("Parse error: stack depth exceeded (max {capacity} nested loops)")
        }
        InterpreterError::Io { source, .. } => format!("I/O error: {source}"),
    };
    let msg = prefix_program(&msg);

    // Only bracket errors point at a byte worth showing in context.
    if err.is_structural() {
        print_error_with_context(&msg, code, err.ip());
    } else {
        eprintln!("{msg} at instruction {}", err.ip());
        let _ = io::stderr().flush();
    }
}

/// Print a concise error with instruction index and a caret context window.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{prefix} at instruction {pos}");
    let (window, caret) = context_window(code, pos);
    eprintln!("  {window}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// Render the bytes around `pos` on one line plus a caret line under `pos`.
///
/// Bytes outside printable ASCII are shown as `.` so that every byte takes
/// exactly one column and the caret lines up.
fn context_window(code: &[u8], pos: usize) -> (String, String) {
    let start = pos.saturating_sub(WINDOW_BYTES).min(code.len());
    let end = (pos + WINDOW_BYTES + 1).min(code.len());

    let window: String = code[start..end]
        .iter()
        .map(|&b| if b == b' ' || b.is_ascii_graphic() { b as char } else { '.' })
        .collect();

    let mut caret = " ".repeat(pos.saturating_sub(start));
    caret.push('^');
    (window, caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_position() {
        let (window, caret) = context_window(b"++[-]]", 5);
        assert_eq!(window, "++[-]]");
        assert_eq!(caret, "     ^");
    }

    #[test]
    fn window_is_clipped_on_both_sides() {
        let code = vec![b'+'; 200];
        let (window, caret) = context_window(&code, 100);
        assert_eq!(window.len(), 2 * WINDOW_BYTES + 1);
        assert_eq!(caret.len(), WINDOW_BYTES + 1);
    }

    #[test]
    fn non_printable_bytes_keep_alignment() {
        let (window, caret) = context_window(b"\n\xff\t]", 3);
        assert_eq!(window, "...]");
        assert_eq!(caret, "   ^");
    }
}
