use codex_core::cli::{output, run_cli};

fn main() {
    codex_core::init();
    if let Err(err) = run_cli() {
        output::error(format!("fatal: {err}"));
        std::process::exit(1);
    }
}
