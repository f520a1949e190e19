//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = palate_cli::run() {
        eprintln!("palate: {err}");
        std::process::exit(1);
    }
}
