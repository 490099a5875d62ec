use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr; stdout carries program output only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("BF_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let program = env::args_os()
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("bfc"));

    let code = bfc::commands::run::run(&program, env::args_os());
    std::process::exit(code);
}
