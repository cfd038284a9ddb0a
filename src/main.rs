//! cozeflow CLI binary
//!
//! Minimal entrypoint; cli::run() handles all output including errors and
//! main only maps the result to a process exit code.

fn main() {
    if let Err(code) = cozeflow::cli::run() {
        std::process::exit(code);
    }
}
