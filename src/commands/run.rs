use clap::Parser;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli_util::print_interpreter_error;
use crate::config::{Config, ConfigError, DEFAULT_TAPE_SIZE, EOF_ENV, MAX_TAPE_SIZE};
use crate::{Interpreter, InterpreterError};

#[derive(Parser, Debug)]
#[command(
    name = "bfc",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct RunArgs {
    /// Tape size in cells, written `-t<N>` (default 30000, max 60000)
    #[arg(short = 't', value_name = "N", allow_hyphen_values = true)]
    pub tape_size: Option<String>,

    /// Program file; a leading `~/` expands to $HOME. The last one given is run.
    #[arg(value_name = "PROGRAM")]
    pub programs: Vec<PathBuf>,
}

/// Failure to read the program file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not open file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every way a run can fail. Each one ends the process with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{source}")]
    Interpreter {
        code: Vec<u8>,
        #[source]
        source: InterpreterError,
    },
}

/// Parse `args` (including the program name), run the program and return
/// the process exit code.
pub fn run<I>(program: &str, args: I) -> i32
where
    I: IntoIterator<Item = OsString>,
{
    match execute(args) {
        Ok(()) => 0,
        Err(err) => {
            report(program, &err);
            1
        }
    }
}

fn execute<I>(args: I) -> Result<(), RunError>
where
    I: IntoIterator<Item = OsString>,
{
    let args = RunArgs::try_parse_from(normalize_args(args))?;
    let config = Config::from_env(args.tape_size.as_deref(), &args.programs)?;
    tracing::debug!(
        tape_size = config.tape_size.get(),
        path = %config.program_path.display(),
        eof = %config.eof_policy,
        "configuration resolved"
    );

    let code = load_program(&config.program_path)?;

    let mut bf = Interpreter::with_tape_size(code, config.tape_size);
    bf.set_eof_policy(config.eof_policy);
    if let Err(source) = bf.run() {
        return Err(RunError::Interpreter {
            code: bf.into_program(),
            source,
        });
    }
    Ok(())
}

/// Read the whole program file as raw bytes.
pub fn load_program(path: &Path) -> Result<Vec<u8>, LoadError> {
    let code = fs::read(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(bytes = code.len(), path = %path.display(), "program loaded");
    Ok(code)
}

/// Drop every `-` argument except `-t…` before clap sees the list.
///
/// `-t<rest>` is always split into `-t` and `<rest>`, so a bare `-t` reads as
/// a missing tape size instead of swallowing the next argument, and clap never
/// gets to strip a `=` from `-t=<N>`. Arguments are classified by their raw
/// bytes; only the tape size is converted to text.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut kept: Vec<OsString> = iter.next().into_iter().collect();

    for arg in iter {
        let bytes = arg.as_encoded_bytes();
        if let Some(rest) = bytes.strip_prefix(b"-t") {
            let value = String::from_utf8_lossy(rest).into_owned();
            kept.push(OsString::from("-t"));
            kept.push(OsString::from(value));
        } else if bytes.starts_with(b"-") {
            tracing::debug!(flag = %arg.to_string_lossy(), "ignoring unrecognized flag");
        } else {
            kept.push(arg);
        }
    }

    kept
}

fn report(program: &str, err: &RunError) {
    match err {
        RunError::Args(e) => {
            let _ = e.print();
        }
        RunError::Config(ConfigError::MissingProgram) => {
            eprintln!("{program}: {}", ConfigError::MissingProgram);
            usage(program);
        }
        RunError::Config(e) => eprintln!("{program}: {e}"),
        RunError::Load(e) => eprintln!("{program}: {e}"),
        RunError::Interpreter { code, source } => {
            print_interpreter_error(Some(program), code, source);
        }
    }
    let _ = io::stderr().flush();
}

fn usage(program: &str) {
    eprintln!(
        r#"Usage:
  {program} [-t<N>] <PROGRAM>

Options:
  -t<N>   Tape size in cells (default {DEFAULT_TAPE_SIZE}, max {MAX_TAPE_SIZE})

Notes:
- PROGRAM is read as raw bytes; anything outside ><+-.,[] is ignored.
- A leading `~/` in PROGRAM is replaced by $HOME.
- The tape wraps around at both ends and cells wrap modulo 256.
- Input (`,`) reads one byte from stdin; {EOF_ENV}=zero|unchanged|max picks what
  is stored at end of input (default zero).
- Unrecognized flags are ignored.
"#
    );
}
