//! texref-check - Check a LaTeX project for undefined and duplicate labels.

fn main() -> std::process::ExitCode {
    texref::cmd::check::main()
}
